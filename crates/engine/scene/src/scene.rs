use std::path::{Path, PathBuf};

use glam::{Vec3, Vec4};

/// Surface properties shared by blocks and spheres, referenced by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Base color, each channel in 0..=1.
    pub color: Vec3,
    /// Diffuse scattering weight.
    pub diffuse: f32,
    /// Glass transmission weight.
    pub glass: f32,
    /// Reflectivity of the glass component.
    pub glass_reflectivity: f32,
    /// Rectangle (x, y, width, height) into the shared albedo/normal atlas.
    pub uv_rect: Vec4,
    /// Emissive surfaces are light sources and receive no shading.
    pub emissive: bool,
}

/// Collision-response semantics of a primitive, resolved from its tag string
/// once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Plain solid geometry (empty tag).
    Solid,
    /// Launches the player upward instead of stopping them.
    JumpPad,
    /// Kills the player on contact; they respawn at the spawn point.
    Hazard,
    /// Unrecognized tag, kept verbatim. Collides like a solid.
    Custom(String),
}

impl Trigger {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "" => Trigger::Solid,
            "jump_pad" => Trigger::JumpPad,
            "laser" => Trigger::Hazard,
            other => Trigger::Custom(other.to_string()),
        }
    }

    /// The tag string this trigger was parsed from.
    pub fn tag(&self) -> &str {
        match self {
            Trigger::Solid => "",
            Trigger::JumpPad => "jump_pad",
            Trigger::Hazard => "laser",
            Trigger::Custom(tag) => tag,
        }
    }
}

/// Axis-aligned box primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Minimum corner.
    pub position: Vec3,
    /// Extent along each axis (width, height, length).
    pub size: Vec3,
    /// Index into [`Scene::materials`].
    pub material: usize,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    /// Center.
    pub position: Vec3,
    pub radius: f32,
    /// Index into [`Scene::materials`].
    pub material: usize,
    pub trigger: Trigger,
}

/// Resolved paths of the three textures a scene samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRefs {
    pub albedo: PathBuf,
    pub normal: PathBuf,
    pub skybox: PathBuf,
}

impl TextureRefs {
    pub(crate) fn resolve(dir: &Path, albedo: &str, normal: &str, skybox: &str) -> Self {
        Self {
            albedo: dir.join(albedo),
            normal: dir.join(normal),
            skybox: dir.join(skybox),
        }
    }
}

/// An immutable scene: materials plus the primitives that reference them.
///
/// Invariant: every `material` index in `blocks` and `spheres` is a valid
/// index into `materials` (checked at parse time).
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub materials: Vec<Material>,
    pub blocks: Vec<Block>,
    pub spheres: Vec<Sphere>,
    pub textures: TextureRefs,
}
