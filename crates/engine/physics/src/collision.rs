//! Stateless overlap queries against a scene's primitive lists

use glam::Vec3;
use prism_scene::{Block, Sphere, Trigger};

/// Axis-aligned bounding box described by its minimum corner and extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub size: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, size: Vec3) -> Self {
        Self { min, size }
    }

    pub fn max(&self) -> Vec3 {
        self.min + self.size
    }
}

/// Two axis-aligned boxes overlap iff all three axis intervals overlap
/// inclusively, so boxes that merely touch still count.
pub fn aabb_overlaps_block(aabb: &Aabb, block: &Block) -> bool {
    let a_max = aabb.max();
    let b_max = block.position + block.size;

    a_max.x >= block.position.x
        && aabb.min.x <= b_max.x
        && a_max.y >= block.position.y
        && aabb.min.y <= b_max.y
        && a_max.z >= block.position.z
        && aabb.min.z <= b_max.z
}

/// Closest-point test: clamp the center into the box and compare squared
/// distance against squared radius (strict, so tangent spheres do not count).
pub fn aabb_overlaps_sphere(aabb: &Aabb, sphere: &Sphere) -> bool {
    let nearest = sphere.position.clamp(aabb.min, aabb.max());
    nearest.distance_squared(sphere.position) < sphere.radius * sphere.radius
}

/// Return the trigger of the first primitive overlapping `aabb`, or `None`
/// when nothing overlaps.
///
/// Blocks are scanned in list order before spheres, first match wins. This is
/// deterministic but not distance-prioritized: of two overlapping triggers,
/// whichever appears earlier in the scene's lists is reported.
pub fn query<'a>(aabb: &Aabb, blocks: &'a [Block], spheres: &'a [Sphere]) -> Option<&'a Trigger> {
    blocks
        .iter()
        .find(|block| aabb_overlaps_block(aabb, block))
        .map(|block| &block.trigger)
        .or_else(|| {
            spheres
                .iter()
                .find(|sphere| aabb_overlaps_sphere(aabb, sphere))
                .map(|sphere| &sphere.trigger)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(position: Vec3, size: Vec3, tag: &str) -> Block {
        Block {
            position,
            size,
            material: 0,
            trigger: Trigger::from_tag(tag),
        }
    }

    fn sphere(position: Vec3, radius: f32, tag: &str) -> Sphere {
        Sphere {
            position,
            radius,
            material: 0,
            trigger: Trigger::from_tag(tag),
        }
    }

    #[test]
    fn block_overlap_is_inclusive() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);

        // Exactly touching faces still overlap.
        assert!(aabb_overlaps_block(
            &aabb,
            &block(Vec3::new(1.0, 0.0, 0.0), Vec3::ONE, "")
        ));
        assert!(!aabb_overlaps_block(
            &aabb,
            &block(Vec3::new(1.001, 0.0, 0.0), Vec3::ONE, "")
        ));
        // Separation on a single axis is enough to miss.
        assert!(!aabb_overlaps_block(
            &aabb,
            &block(Vec3::new(0.0, 2.5, 0.0), Vec3::ONE, "")
        ));
    }

    #[test]
    fn sphere_overlap_is_strict() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);

        // Tangent sphere: distance == radius, no overlap.
        assert!(!aabb_overlaps_sphere(
            &aabb,
            &sphere(Vec3::new(2.0, 0.5, 0.5), 1.0, "")
        ));
        assert!(aabb_overlaps_sphere(
            &aabb,
            &sphere(Vec3::new(2.0, 0.5, 0.5), 1.01, "")
        ));
        // Center inside the box.
        assert!(aabb_overlaps_sphere(
            &aabb,
            &sphere(Vec3::splat(0.5), 0.1, "")
        ));
    }

    #[test]
    fn query_returns_first_match_in_list_order() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let blocks = vec![
            block(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE, "far"),
            block(Vec3::ZERO, Vec3::ONE, "first"),
            block(Vec3::ZERO, Vec3::ONE, "second"),
        ];
        let spheres = vec![sphere(Vec3::splat(0.5), 1.0, "ball")];

        assert_eq!(
            query(&aabb, &blocks, &spheres),
            Some(&Trigger::Custom("first".to_string()))
        );
    }

    #[test]
    fn query_checks_spheres_after_blocks() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let blocks = vec![block(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE, "far")];
        let spheres = vec![sphere(Vec3::splat(0.5), 1.0, "ball")];

        assert_eq!(
            query(&aabb, &blocks, &spheres),
            Some(&Trigger::Custom("ball".to_string()))
        );
        assert_eq!(query(&aabb, &[], &[]), None);
    }
}
