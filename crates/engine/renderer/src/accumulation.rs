//! Double-buffered accumulation over the raytrace/tonemap program pair
//!
//! Each frame renders into one of two off-screen buffers while the other,
//! holding the running average so far, is bound as input. The GPU blends
//! `mix(history, sample, 1 / step)`, which is the online running-average
//! update; the host only advances the step counter and swaps buffer roles.
//! Any change to the camera or a renderer-visible parameter invalidates the
//! history, so the step counter drops back to 1.

use std::path::Path;

use glam::{Vec2, Vec3};
use glow::HasContext;
use prism_scene::{Material, Scene};
use tracing::{error, info, warn};

use crate::shader::ShaderProgram;
use crate::target::{FrameBuffer, PingPong};
use crate::texture::SceneTextures;

/// Capacity of the GLSL `boxes` uniform array.
pub const MAX_BLOCKS: usize = 64;
/// Capacity of the GLSL `spheres` uniform array.
pub const MAX_SPHERES: usize = 32;

/// Texture units the raytrace program samples from.
const HISTORY_UNIT: i32 = 0;
const SKYBOX_UNIT: i32 = 1;
const ALBEDO_UNIT: i32 = 2;
const NORMAL_UNIT: i32 = 3;

/// Camera pose for one frame, derived from the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub eye: Vec3,
    /// Pitch, yaw, roll in degrees.
    pub rotation: Vec3,
}

/// Renderer-visible parameters, snapshotted per frame.
///
/// The game diffs consecutive snapshots; any change resets accumulation, so
/// tweaking a slider never blends incompatible histories together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub sun_direction: Vec3,
    pub dof_focus_distance: f32,
    pub dof_blur_size: f32,
    pub fov: f32,
    pub eye_height: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sun_direction: Vec3::new(-1.0, 1.0, -0.175),
            dof_focus_distance: 12.0,
            dof_blur_size: 0.05,
            fov: 90.0,
            eye_height: 0.2,
        }
    }
}

pub struct AccumulationRenderer {
    raytrace: ShaderProgram,
    screen: ShaderProgram,
    vao: glow::VertexArray,
    targets: PingPong<FrameBuffer>,
    step: u32,
}

impl AccumulationRenderer {
    /// Build the program pair from `shader_dir` and allocate the two
    /// accumulation buffers.
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn new(
        gl: &glow::Context,
        shader_dir: &Path,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        unsafe {
            let raytrace = ShaderProgram::from_files(
                gl,
                shader_dir.join("raytrace.vert"),
                shader_dir.join("raytrace.frag"),
            )?;
            let screen = match ShaderProgram::from_files(
                gl,
                shader_dir.join("screen.vert"),
                shader_dir.join("screen.frag"),
            ) {
                Ok(screen) => screen,
                Err(e) => {
                    raytrace.destroy(gl);
                    return Err(e);
                }
            };

            let vao = gl.create_vertex_array().map_err(|e| e.to_string())?;

            let first = FrameBuffer::new(gl, width, height)?;
            let second = match FrameBuffer::new(gl, width, height) {
                Ok(second) => second,
                Err(e) => {
                    first.destroy(gl);
                    return Err(e);
                }
            };

            info!(width, height, "accumulation buffers allocated");

            Ok(Self {
                raytrace,
                screen,
                vao,
                targets: PingPong::new(first, second),
                step: 1,
            })
        }
    }

    /// Current accumulation step; 1 means the history is invalid.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Blend factor uploaded this frame.
    pub fn accumulation_weight(&self) -> f32 {
        accumulation_weight(self.step)
    }

    pub fn buffer_size(&self) -> (u32, u32) {
        self.targets.current().size()
    }

    /// Invalidate the accumulated history.
    pub fn reset_accumulation(&mut self) {
        self.step = 1;
        self.targets.reset_roles();
    }

    /// Replace both accumulation buffers with freshly sized ones.
    ///
    /// The old buffers are released first, in creation order; their contents
    /// are meaningless at the new size, so the step counter restarts too.
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn resize(
        &mut self,
        gl: &glow::Context,
        width: u32,
        height: u32,
    ) -> Result<(), String> {
        unsafe {
            for target in self.targets.slots() {
                target.destroy(gl);
            }

            let first = FrameBuffer::new(gl, width, height)?;
            let second = match FrameBuffer::new(gl, width, height) {
                Ok(second) => second,
                Err(e) => {
                    first.destroy(gl);
                    return Err(e);
                }
            };
            self.targets = PingPong::new(first, second);
            self.reset_accumulation();

            info!(width, height, "accumulation buffers resized");
            Ok(())
        }
    }

    /// Recompile both programs from their source files.
    ///
    /// A failed compile keeps the currently loaded program: rendering with a
    /// stale shader is an accepted degraded mode, never a crash.
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn reload_shaders(&mut self, gl: &glow::Context) {
        unsafe {
            match self.raytrace.recompile(gl) {
                Ok(fresh) => {
                    self.raytrace.destroy(gl);
                    self.raytrace = fresh;
                }
                Err(e) => error!("raytrace shader reload failed, keeping last good: {e}"),
            }
            match self.screen.recompile(gl) {
                Ok(fresh) => {
                    self.screen.destroy(gl);
                    self.screen = fresh;
                }
                Err(e) => error!("screen shader reload failed, keeping last good: {e}"),
            }
        }

        self.reset_accumulation();
    }

    /// Render one frame: trace into the current buffer while sampling the
    /// previous one, then tonemap the result to the visible framebuffer.
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn render_frame(
        &mut self,
        gl: &glow::Context,
        camera: &CameraState,
        settings: &RenderSettings,
        scene: &Scene,
        textures: &SceneTextures,
        window_size: (u32, u32),
    ) {
        let (buffer_width, buffer_height) = self.buffer_size();

        unsafe {
            gl.bind_vertex_array(Some(self.vao));

            self.targets.current().bind(gl);

            self.raytrace.bind(gl);
            self.raytrace.set_vec3(gl, "cameraPosition", camera.eye);
            self.raytrace.set_vec3(gl, "cameraRotation", camera.rotation);
            self.raytrace
                .set_vec3(gl, "sunDirection", settings.sun_direction);
            self.raytrace.set_vec2(
                gl,
                "screenResolution",
                Vec2::new(buffer_width as f32, buffer_height as f32),
            );
            self.raytrace
                .set_f32(gl, "accumulationWeight", self.accumulation_weight());
            self.raytrace.set_i32(gl, "historySampler", HISTORY_UNIT);
            self.raytrace.set_i32(gl, "skyboxSampler", SKYBOX_UNIT);
            self.raytrace.set_i32(gl, "albedoSampler", ALBEDO_UNIT);
            self.raytrace.set_i32(gl, "normalSampler", NORMAL_UNIT);
            self.raytrace
                .set_f32(gl, "dofFocusDistance", settings.dof_focus_distance);
            self.raytrace
                .set_f32(gl, "dofBlurSize", settings.dof_blur_size);
            self.raytrace.set_f32(gl, "fov", settings.fov);

            self.upload_scene(gl, scene);

            gl.active_texture(glow::TEXTURE0 + HISTORY_UNIT as u32);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.targets.previous().texture()));
            gl.active_texture(glow::TEXTURE0 + SKYBOX_UNIT as u32);
            gl.bind_texture(glow::TEXTURE_2D, Some(textures.skybox.raw()));
            gl.active_texture(glow::TEXTURE0 + ALBEDO_UNIT as u32);
            gl.bind_texture(glow::TEXTURE_2D, Some(textures.albedo.raw()));
            gl.active_texture(glow::TEXTURE0 + NORMAL_UNIT as u32);
            gl.bind_texture(glow::TEXTURE_2D, Some(textures.normal.raw()));

            gl.draw_arrays(glow::TRIANGLES, 0, 3);

            FrameBuffer::unbind(gl);

            // Second pass: sample the just-rendered buffer onto the screen.
            gl.viewport(0, 0, window_size.0 as i32, window_size.1 as i32);

            self.screen.bind(gl);
            self.screen.set_vec2(
                gl,
                "screenResolution",
                Vec2::new(window_size.0 as f32, window_size.1 as f32),
            );
            self.screen.set_bool(gl, "firstFrame", self.step == 1);
            self.screen.set_i32(gl, "frameSampler", 0);

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.targets.current().texture()));

            gl.draw_arrays(glow::TRIANGLES, 0, 3);

            ShaderProgram::unbind(gl);
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.bind_vertex_array(None);
        }

        self.step += 1;
        self.targets.swap_roles();
    }

    /// Upload the whole scene as flattened uniform arrays.
    unsafe fn upload_scene(&self, gl: &glow::Context, scene: &Scene) {
        let block_count = scene.blocks.len().min(MAX_BLOCKS);
        let sphere_count = scene.spheres.len().min(MAX_SPHERES);

        // One warning per accumulation run, not one per frame.
        if self.step == 1 {
            if scene.blocks.len() > MAX_BLOCKS {
                warn!(
                    total = scene.blocks.len(),
                    uploaded = MAX_BLOCKS,
                    "scene has more boxes than the shader array holds"
                );
            }
            if scene.spheres.len() > MAX_SPHERES {
                warn!(
                    total = scene.spheres.len(),
                    uploaded = MAX_SPHERES,
                    "scene has more spheres than the shader array holds"
                );
            }
        }

        unsafe {
            self.raytrace.set_i32(gl, "boxCount", block_count as i32);
            self.raytrace
                .set_i32(gl, "sphereCount", sphere_count as i32);

            for (i, block) in scene.blocks[..block_count].iter().enumerate() {
                let id = element_prefix("boxes", i);
                self.raytrace
                    .set_vec3(gl, &format!("{id}.position"), block.position);
                self.raytrace.set_vec3(gl, &format!("{id}.size"), block.size);
                self.upload_material(gl, &id, &scene.materials[block.material]);
            }

            for (i, sphere) in scene.spheres[..sphere_count].iter().enumerate() {
                let id = element_prefix("spheres", i);
                self.raytrace
                    .set_vec3(gl, &format!("{id}.position"), sphere.position);
                self.raytrace
                    .set_f32(gl, &format!("{id}.radius"), sphere.radius);
                self.upload_material(gl, &id, &scene.materials[sphere.material]);
            }
        }
    }

    unsafe fn upload_material(&self, gl: &glow::Context, id: &str, material: &Material) {
        unsafe {
            self.raytrace
                .set_vec3(gl, &format!("{id}.material.color"), material.color);
            self.raytrace
                .set_f32(gl, &format!("{id}.material.diffuse"), material.diffuse);
            self.raytrace
                .set_f32(gl, &format!("{id}.material.glass"), material.glass);
            self.raytrace.set_f32(
                gl,
                &format!("{id}.material.glassReflectivity"),
                material.glass_reflectivity,
            );
            self.raytrace
                .set_vec4(gl, &format!("{id}.material.uvInfo"), material.uv_rect);
            self.raytrace
                .set_bool(gl, &format!("{id}.material.emissive"), material.emissive);
        }
    }

    /// Release every GL resource, in reverse creation order.
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn destroy(&self, gl: &glow::Context) {
        unsafe {
            let [first, second] = self.targets.slots();
            second.destroy(gl);
            first.destroy(gl);
            gl.delete_vertex_array(self.vao);
            self.screen.destroy(gl);
            self.raytrace.destroy(gl);
        }
    }
}

/// Running-average blend factor for a given step.
pub fn accumulation_weight(step: u32) -> f32 {
    1.0 / step as f32
}

/// Name of an element of a uniform struct array, e.g. `boxes[3]`.
fn element_prefix(array: &str, index: usize) -> String {
    format!("{array}[{index}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_is_reciprocal_of_step() {
        assert_eq!(accumulation_weight(1), 1.0);
        assert_eq!(accumulation_weight(2), 0.5);
        assert_eq!(accumulation_weight(4), 0.25);
    }

    #[test]
    fn uniform_names_match_the_shader_structs() {
        assert_eq!(element_prefix("boxes", 0), "boxes[0]");
        assert_eq!(
            format!("{}.position", element_prefix("boxes", 12)),
            "boxes[12].position"
        );
        assert_eq!(
            format!("{}.material.color", element_prefix("spheres", 3)),
            "spheres[3].material.color"
        );
    }

    #[test]
    fn settings_snapshots_diff_by_value() {
        let a = RenderSettings::default();
        let mut b = a;
        assert_eq!(a, b);

        b.fov += 1.0;
        assert_ne!(a, b);

        b = a;
        b.sun_direction.y -= 0.25;
        assert_ne!(a, b);
    }
}
