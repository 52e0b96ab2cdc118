//! Kinematic player movement and collision queries
//!
//! Collision queries are stateless functions over the scene's primitive
//! lists; the player controller integrates movement one axis at a time and
//! interprets trigger tags (jump pads, hazards) during resolution.

mod collision;
mod player;

pub use collision::{aabb_overlaps_block, aabb_overlaps_sphere, query, Aabb};
pub use player::{Player, PlayerInput, PlayerTuning, TickEvents};
