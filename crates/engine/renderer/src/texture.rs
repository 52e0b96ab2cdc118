//! GL texture loading for scene assets

use std::path::Path;

use glow::HasContext;
use prism_scene::TextureRefs;
use tracing::info;

/// An immutable 2D texture decoded from an image file.
pub struct Texture {
    texture: glow::Texture,
}

impl Texture {
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn from_file(gl: &glow::Context, path: &Path) -> Result<Self, String> {
        let image = image::open(path)
            .map_err(|e| format!("could not load texture {}: {}", path.display(), e))?
            .to_rgba8();
        let (width, height) = image.dimensions();

        info!(path = %path.display(), width, height, "loaded texture");

        unsafe {
            let texture = gl.create_texture().map_err(|e| e.to_string())?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(image.as_raw().as_slice())),
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self { texture })
        }
    }

    pub fn raw(&self) -> glow::Texture {
        self.texture
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn destroy(&self, gl: &glow::Context) {
        unsafe { gl.delete_texture(self.texture) };
    }
}

/// The three textures a scene references, loaded together and released
/// together.
pub struct SceneTextures {
    pub albedo: Texture,
    pub normal: Texture,
    pub skybox: Texture,
}

impl SceneTextures {
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn load(gl: &glow::Context, refs: &TextureRefs) -> Result<Self, String> {
        unsafe {
            let albedo = Texture::from_file(gl, &refs.albedo)?;
            let normal = match Texture::from_file(gl, &refs.normal) {
                Ok(normal) => normal,
                Err(e) => {
                    albedo.destroy(gl);
                    return Err(e);
                }
            };
            let skybox = match Texture::from_file(gl, &refs.skybox) {
                Ok(skybox) => skybox,
                Err(e) => {
                    normal.destroy(gl);
                    albedo.destroy(gl);
                    return Err(e);
                }
            };

            Ok(Self {
                albedo,
                normal,
                skybox,
            })
        }
    }

    /// Dispose in reverse creation order.
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn destroy(&self, gl: &glow::Context) {
        unsafe {
            self.skybox.destroy(gl);
            self.normal.destroy(gl);
            self.albedo.destroy(gl);
        }
    }
}
