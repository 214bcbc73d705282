//! Bounds contract between the transform component and bounds providers
//!
//! A component that knows the extent of its node (a collider, a sprite, a
//! text box) exposes it through [`BoundsProvider`]; the transform component
//! derives anchored origins and relative alignment from it.

use crate::foundation::math::{transform_point_2d, Mat4, Vec2};

/// Axis-aligned box in the xy plane. `min.y` is the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec2,
    /// Maximum corner of the bounding box
    pub max: Vec2,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box with its top-left corner at `position`
    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self {
            min: position,
            max: position + size,
        }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec2, extents: Vec2) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Width and height
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Check if this AABB contains a point (edges inclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Smallest box enclosing the four corners mapped through `m`
    pub fn transformed(&self, m: &Mat4) -> Self {
        let corners = [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ];

        let first = transform_point_2d(m, corners[0]);
        corners[1..]
            .iter()
            .map(|c| transform_point_2d(m, *c))
            .fold(Self::new(first, first), |acc, p| Self {
                min: acc.min.inf(&p),
                max: acc.max.sup(&p),
            })
    }
}

/// Capability of a component that knows its node's extent
pub trait BoundsProvider {
    /// Bounds in the node's own local space
    fn model_bounds(&self) -> AABB;

    /// Bounds in world space, as of the last update of the owning node
    fn global_bounds(&self) -> AABB;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{constants::HALF_PI, rotation_2d, translation_2d};
    use approx::assert_relative_eq;

    #[test]
    fn test_center_and_size() {
        let b = AABB::from_position_size(Vec2::new(10.0, 20.0), Vec2::new(100.0, 60.0));
        assert_eq!(b.center(), Vec2::new(60.0, 50.0));
        assert_eq!(b.size(), Vec2::new(100.0, 60.0));
        assert!(b.contains_point(Vec2::new(110.0, 80.0)));
        assert!(!b.contains_point(Vec2::new(111.0, 80.0)));
    }

    #[test]
    fn test_transformed_by_rotation() {
        let b = AABB::new(Vec2::zeros(), Vec2::new(100.0, 60.0));
        let rotated = b.transformed(&rotation_2d(HALF_PI));

        assert_relative_eq!(rotated.min, Vec2::new(-60.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(rotated.max, Vec2::new(0.0, 100.0), epsilon = 1e-4);
    }

    #[test]
    fn test_transformed_by_translation() {
        let b = AABB::new(Vec2::zeros(), Vec2::new(2.0, 2.0));
        let moved = b.transformed(&translation_2d(Vec2::new(5.0, -1.0)));
        assert_eq!(moved, AABB::new(Vec2::new(5.0, -1.0), Vec2::new(7.0, 1.0)));
        assert!(moved.intersects(&AABB::new(Vec2::new(6.0, 0.0), Vec2::new(9.0, 9.0))));
    }
}
