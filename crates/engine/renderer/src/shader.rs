//! Shader program wrapper with uniform-by-name upload

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3, Vec4};
use glow::HasContext;

/// A linked vertex+fragment program compiled from source files on disk.
///
/// Keeping the source paths around lets the renderer recompile in place when
/// shaders are edited at runtime.
pub struct ShaderProgram {
    program: glow::Program,
    vertex_path: PathBuf,
    fragment_path: PathBuf,
}

impl ShaderProgram {
    /// Compile and link a program from the given source files.
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn from_files(
        gl: &glow::Context,
        vertex_path: impl Into<PathBuf>,
        fragment_path: impl Into<PathBuf>,
    ) -> Result<Self, String> {
        let vertex_path = vertex_path.into();
        let fragment_path = fragment_path.into();

        let vertex_src = read_source(&vertex_path)?;
        let fragment_src = read_source(&fragment_path)?;

        let program = unsafe { create_program(gl, &vertex_src, &fragment_src)? };

        Ok(Self {
            program,
            vertex_path,
            fragment_path,
        })
    }

    /// Recompile from the same source files, returning a fresh program.
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn recompile(&self, gl: &glow::Context) -> Result<Self, String> {
        unsafe { Self::from_files(gl, &self.vertex_path, &self.fragment_path) }
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn bind(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) };
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn unbind(gl: &glow::Context) {
        unsafe { gl.use_program(None) };
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn set_f32(&self, gl: &glow::Context, name: &str, value: f32) {
        unsafe {
            let location = gl.get_uniform_location(self.program, name);
            gl.uniform_1_f32(location.as_ref(), value);
        }
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn set_vec2(&self, gl: &glow::Context, name: &str, value: Vec2) {
        unsafe {
            let location = gl.get_uniform_location(self.program, name);
            gl.uniform_2_f32(location.as_ref(), value.x, value.y);
        }
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn set_vec3(&self, gl: &glow::Context, name: &str, value: Vec3) {
        unsafe {
            let location = gl.get_uniform_location(self.program, name);
            gl.uniform_3_f32(location.as_ref(), value.x, value.y, value.z);
        }
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn set_vec4(&self, gl: &glow::Context, name: &str, value: Vec4) {
        unsafe {
            let location = gl.get_uniform_location(self.program, name);
            gl.uniform_4_f32(location.as_ref(), value.x, value.y, value.z, value.w);
        }
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn set_i32(&self, gl: &glow::Context, name: &str, value: i32) {
        unsafe {
            let location = gl.get_uniform_location(self.program, name);
            gl.uniform_1_i32(location.as_ref(), value);
        }
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn set_bool(&self, gl: &glow::Context, name: &str, value: bool) {
        unsafe { self.set_i32(gl, name, value as i32) };
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn destroy(&self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }
}

fn read_source(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path)
        .map_err(|e| format!("could not read shader source {}: {}", path.display(), e))
}

/// Compile a shader from source code
///
/// # Safety
/// Requires an active OpenGL context
unsafe fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
) -> Result<glow::Shader, String> {
    unsafe {
        let shader = gl.create_shader(shader_type).map_err(|e| e.to_string())?;

        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(format!("Shader compilation error: {}", log));
        }

        Ok(shader)
    }
}

/// Create and link a shader program from vertex and fragment shader sources
///
/// # Safety
/// Requires an active OpenGL context
unsafe fn create_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program().map_err(|e| e.to_string())?;

        let vertex_shader = compile_shader(gl, glow::VERTEX_SHADER, vertex_src)?;
        let fragment_shader = compile_shader(gl, glow::FRAGMENT_SHADER, fragment_src)?;

        gl.attach_shader(program, vertex_shader);
        gl.attach_shader(program, fragment_shader);
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.detach_shader(program, vertex_shader);
            gl.detach_shader(program, fragment_shader);
            gl.delete_shader(vertex_shader);
            gl.delete_shader(fragment_shader);
            gl.delete_program(program);
            return Err(format!("Program link error: {}", log));
        }

        gl.detach_shader(program, vertex_shader);
        gl.detach_shader(program, fragment_shader);
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);

        Ok(program)
    }
}
