//! Collider component
//!
//! A rectangular extent attached to a node. It is the bounds provider the
//! transform component consults for anchored origins and for the relative
//! alignment of descendants, and it keeps a world-space copy of its bounds
//! that is refreshed during the owner's update.

use crate::ecs::Component;
use crate::foundation::math::{Mat4, Vec2};
use crate::scene::{BoundsProvider, NodeId, AABB};

/// Rectangular extent of a node, in local and world space
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderComponent {
    model_bounds: AABB,
    global_bounds: AABB,
    owner: Option<NodeId>,
    /// Whether pointer hit tests should consider this collider
    pub pickable: bool,
}

impl ColliderComponent {
    /// Collider covering `bounds` in local space
    pub fn new(bounds: AABB) -> Self {
        Self {
            model_bounds: bounds,
            global_bounds: bounds,
            owner: None,
            pickable: true,
        }
    }

    /// Collider covering `(0,0)..size`
    pub fn from_size(size: Vec2) -> Self {
        Self::new(AABB::from_position_size(Vec2::zeros(), size))
    }

    /// Builder pattern: exclude from pointer hit tests
    pub fn non_pickable(mut self) -> Self {
        self.pickable = false;
        self
    }

    /// Replace the local bounds; world bounds follow on the next update
    pub fn set_bounds(&mut self, bounds: AABB) {
        self.model_bounds = bounds;
    }

    /// Resize keeping the top-left corner
    pub fn set_size(&mut self, size: Vec2) {
        self.model_bounds = AABB::from_position_size(self.model_bounds.min, size);
    }

    /// Node this collider is attached to
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Whether a world-space point hits this collider
    pub fn hit(&self, point: Vec2) -> bool {
        self.pickable && self.global_bounds.contains_point(point)
    }
}

impl BoundsProvider for ColliderComponent {
    fn model_bounds(&self) -> AABB {
        self.model_bounds
    }

    fn global_bounds(&self) -> AABB {
        self.global_bounds
    }
}

impl Component for ColliderComponent {
    fn on_attach(&mut self, owner: NodeId) {
        self.owner = Some(owner);
    }

    fn as_bounds(&self) -> Option<&dyn BoundsProvider> {
        Some(self)
    }

    fn on_transform_changed(&mut self, global: &Mat4) {
        self.global_bounds = self.model_bounds.transformed(global);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::translation_2d;

    #[test]
    fn test_global_bounds_follow_transform() {
        let mut collider = ColliderComponent::from_size(Vec2::new(10.0, 10.0));
        assert_eq!(collider.global_bounds(), collider.model_bounds());

        collider.on_transform_changed(&translation_2d(Vec2::new(100.0, 0.0)));
        assert_eq!(
            collider.global_bounds(),
            AABB::new(Vec2::new(100.0, 0.0), Vec2::new(110.0, 10.0))
        );
        assert!(collider.hit(Vec2::new(105.0, 5.0)));
        assert!(!collider.hit(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_resize_keeps_corner() {
        let mut collider = ColliderComponent::new(AABB::new(Vec2::new(2.0, 2.0), Vec2::new(4.0, 4.0)));
        collider.set_size(Vec2::new(10.0, 1.0));
        assert_eq!(
            collider.model_bounds(),
            AABB::new(Vec2::new(2.0, 2.0), Vec2::new(12.0, 3.0))
        );
    }

    #[test]
    fn test_non_pickable_never_hits() {
        let collider = ColliderComponent::from_size(Vec2::new(10.0, 10.0)).non_pickable();
        assert!(!collider.hit(Vec2::new(1.0, 1.0)));
    }
}
