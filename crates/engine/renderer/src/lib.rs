//! Progressive accumulation renderer over OpenGL
//!
//! The host side of the path tracer: it owns the two ping-ponged
//! accumulation buffers, the raytrace and tonemap shader programs, and the
//! scene's GPU textures, and feeds the whole scene to the GPU as named
//! uniforms each frame. The tracing algorithm itself lives in the GLSL
//! sources under `res/shaders`.

mod accumulation;
mod shader;
mod target;
mod texture;

pub use accumulation::{
    AccumulationRenderer, CameraState, RenderSettings, MAX_BLOCKS, MAX_SPHERES,
};
pub use shader::ShaderProgram;
pub use target::{FrameBuffer, PingPong};
pub use texture::{SceneTextures, Texture};
