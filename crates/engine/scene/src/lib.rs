//! Scene description format and data model
//!
//! A scene is a flat list of materials plus the axis-aligned blocks and
//! spheres that reference them by index, together with the three texture
//! files (albedo atlas, normal atlas, skybox) the renderer samples.
//!
//! Scenes are loaded from a line-oriented text format (see [`Scene::parse`])
//! and are immutable for the lifetime of a play session.

mod parse;
mod scene;

pub use parse::{ParseError, SceneError, Section};
pub use scene::{Block, Material, Scene, Sphere, TextureRefs, Trigger};

/// Directory scene texture references are resolved against.
pub const TEXTURES_DIR: &str = "res/textures";
