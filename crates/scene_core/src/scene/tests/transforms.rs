//! Global composition, bounds-driven origins and relative alignment

use crate::ecs::components::{Anchor, ColliderComponent, OriginType, TransformComponent};
use crate::foundation::logging;
use crate::foundation::math::{constants::{HALF_PI, PI}, transform_point_2d, Mat4, Vec2};
use crate::scene::{BoundsProvider, GlobalTransformResolver, NodeId, Scene, AABB};
use approx::assert_relative_eq;
use std::time::Duration;

const EPSILON: f32 = 1e-4;

/// root -> a -> b, with a rotated, scaled and moved, and b moved and stretched
fn chain() -> (Scene, NodeId, NodeId) {
    logging::init_for_tests();
    let mut scene = Scene::new();
    let a = scene.create_node();
    let b = scene.create_node();
    scene.attach_child(scene.root(), a).unwrap();
    scene.attach_child(a, b).unwrap();

    scene.add_component(
        a,
        TransformComponent::new()
            .with_position(Vec2::new(100.0, 40.0))
            .with_rotation(HALF_PI)
            .with_scale(2.0, 2.0),
    );
    scene.add_component(
        b,
        TransformComponent::new()
            .with_position(Vec2::new(10.0, 0.0))
            .with_scale(1.0, 3.0),
    );
    (scene, a, b)
}

#[test]
fn test_global_is_product_of_locals() {
    let (mut scene, a, b) = chain();
    scene.add_component(
        scene.root(),
        TransformComponent::new()
            .with_position(Vec2::new(5.0, -10.0))
            .with_rotation(PI)
            .with_scale(0.5, 0.5),
    );
    scene
        .get_component_mut::<TransformComponent>(b)
        .unwrap()
        .set_rotation(HALF_PI);

    let global = scene.global_transform(b).unwrap();

    // b: stretch (1, 3) -> quarter turn (-3, 1) -> move (7, 1)
    // a: scale (14, 2) -> quarter turn (-2, 14) -> move (98, 54)
    // root: halve (49, 27) -> half turn (-49, -27) -> move (-44, -37)
    let p = transform_point_2d(&global, Vec2::new(1.0, 1.0));
    assert_relative_eq!(p, Vec2::new(-44.0, -37.0), epsilon = EPSILON);

    // b's origin: (10, 0) -> (20, 0) -> (0, 20) -> (100, 60)
    // -> (50, 30) -> (-50, -30) -> (-45, -40)
    let origin = transform_point_2d(&global, Vec2::zeros());
    assert_relative_eq!(origin, Vec2::new(-45.0, -40.0), epsilon = EPSILON);

    let a_origin = transform_point_2d(&scene.global_transform(a).unwrap(), Vec2::zeros());
    assert_relative_eq!(a_origin, Vec2::new(-45.0, -30.0), epsilon = EPSILON);
}

#[test]
fn test_global_of_bare_root_is_identity() {
    let (scene, _, _) = chain();
    assert_relative_eq!(
        scene.global_transform(scene.root()).unwrap(),
        Mat4::identity()
    );
}

#[test]
fn test_global_follows_ancestor_mutation() {
    let (mut scene, a, b) = chain();
    scene
        .get_component_mut::<TransformComponent>(a)
        .unwrap()
        .set_rotation(0.0);

    let p = transform_point_2d(&scene.global_transform(b).unwrap(), Vec2::new(1.0, 1.0));
    assert_relative_eq!(p, Vec2::new(122.0, 46.0), epsilon = EPSILON);
}

#[test]
fn test_resolver_reuses_until_chain_changes() {
    let (mut scene, a, b) = chain();
    let mut resolver = GlobalTransformResolver::new();

    let first = resolver.resolve(&scene, b).unwrap();
    assert_eq!(resolver.stats(), (0, 3));
    assert_eq!(resolver.resolve(&scene, b), Some(first));
    assert_eq!(resolver.stats(), (1, 3));

    scene
        .get_component_mut::<TransformComponent>(a)
        .unwrap()
        .move_by(Vec2::new(5.0, 0.0));
    let moved = resolver.resolve(&scene, b).unwrap();
    assert_relative_eq!(moved, scene.global_transform(b).unwrap(), epsilon = EPSILON);
    assert_ne!(moved, first);

    // re-parenting breaks the chain signature too
    let root = scene.root();
    scene.detach_child(a, b).unwrap();
    scene.attach_child(root, b).unwrap();
    assert_relative_eq!(
        resolver.resolve(&scene, b).unwrap(),
        scene.local_transform(b),
        epsilon = EPSILON
    );

    scene.destroy_node(b).unwrap();
    assert_eq!(resolver.resolve(&scene, b), None);

    resolver.clear();
    assert!(resolver.is_empty());
}

#[test]
fn test_resolver_prunes_destroyed_nodes() {
    let (mut scene, a, b) = chain();
    let mut resolver = GlobalTransformResolver::new();
    resolver.resolve(&scene, b).unwrap();
    assert_eq!(resolver.len(), 3);

    // destroying a takes b with it; neither id is resolved again
    assert_eq!(scene.destroy_node(a).unwrap(), 2);
    assert_eq!(resolver.len(), 3);
    assert_eq!(resolver.prune(&scene), 2);
    assert_eq!(resolver.len(), 1);
    assert_eq!(resolver.prune(&scene), 0);
}

#[test]
fn test_centered_origin_tracks_resized_bounds() {
    logging::init_for_tests();
    let mut scene = Scene::new();
    let n = scene.create_node();
    scene.attach_child(scene.root(), n).unwrap();
    scene.add_component(n, ColliderComponent::from_size(Vec2::new(100.0, 60.0)));
    scene
        .add_component(n, TransformComponent::new())
        .unwrap()
        .set_origin_flags(OriginType::ALL, Anchor::CENTER);

    scene.update(scene.root(), Duration::ZERO);
    let t = scene.get_component::<TransformComponent>(n).unwrap();
    assert_eq!(t.origin(OriginType::TRANSLATION).point, Vec2::new(50.0, 30.0));
    assert_eq!(t.origin(OriginType::SCALE).point, Vec2::new(50.0, 30.0));

    scene
        .get_component_mut::<ColliderComponent>(n)
        .unwrap()
        .set_size(Vec2::new(200.0, 100.0));
    scene.update(scene.root(), Duration::ZERO);

    let t = scene.get_component::<TransformComponent>(n).unwrap();
    assert_eq!(t.origin(OriginType::ROTATION).point, Vec2::new(100.0, 50.0));

    // the translation origin sits on the position
    let centre = transform_point_2d(&t.get_transform(), Vec2::new(100.0, 50.0));
    assert_relative_eq!(centre, Vec2::zeros(), epsilon = EPSILON);
}

#[test]
fn test_alignment_to_parent_bounds() {
    logging::init_for_tests();
    let mut scene = Scene::new();
    let panel = scene.create_node();
    let label = scene.create_node();
    scene.attach_child(scene.root(), panel).unwrap();
    scene.attach_child(panel, label).unwrap();

    scene.add_component(panel, ColliderComponent::from_size(Vec2::new(200.0, 50.0)));
    scene
        .add_component(label, TransformComponent::new())
        .unwrap()
        .set_relative_alignment(Anchor::LEFT | Anchor::CENTER_Y, 5.0);

    assert!(scene.refresh_transform_properties(label));
    let position = scene
        .get_component::<TransformComponent>(label)
        .unwrap()
        .position();
    assert_eq!(position.xy(), Vec2::new(5.0, 25.0));

    // nothing left to change on a second pass
    assert!(!scene.refresh_transform_properties(label));
}

#[test]
fn test_alignment_uses_nearest_provider_above() {
    logging::init_for_tests();
    let mut scene = Scene::new();
    let panel = scene.create_node();
    let group = scene.create_node();
    let badge = scene.create_node();
    scene.attach_child(scene.root(), panel).unwrap();
    scene.attach_child(panel, group).unwrap();
    scene.attach_child(group, badge).unwrap();

    scene.add_component(
        panel,
        ColliderComponent::new(AABB::new(Vec2::zeros(), Vec2::new(200.0, 50.0))),
    );
    scene.add_component(
        group,
        TransformComponent::new().with_position(Vec2::new(20.0, 10.0)),
    );
    scene
        .add_component(badge, TransformComponent::new())
        .unwrap()
        .set_relative_alignment(Anchor::RIGHT | Anchor::BOTTOM, 0.0);

    scene.update(scene.root(), Duration::ZERO);

    // panel bounds seen from the group's space: (-20, -10) .. (180, 40)
    let position = scene
        .get_component::<TransformComponent>(badge)
        .unwrap()
        .position();
    assert_relative_eq!(position.xy(), Vec2::new(180.0, 40.0), epsilon = EPSILON);

    let global = scene.global_transform(badge).unwrap();
    assert_relative_eq!(
        transform_point_2d(&global, Vec2::zeros()),
        Vec2::new(200.0, 50.0),
        epsilon = EPSILON
    );
}

#[test]
fn test_collider_global_bounds_follow_update() {
    let (mut scene, a, _) = chain();
    scene.add_component(a, ColliderComponent::from_size(Vec2::new(10.0, 10.0)));
    scene.update(scene.root(), Duration::ZERO);

    let collider = scene.get_component::<ColliderComponent>(a).unwrap();
    // scale 2, quarter turn, then moved to (100, 40)
    let bounds = collider.global_bounds();
    assert_relative_eq!(bounds.min, Vec2::new(80.0, 40.0), epsilon = EPSILON);
    assert_relative_eq!(bounds.max, Vec2::new(100.0, 60.0), epsilon = EPSILON);
    assert!(collider.hit(Vec2::new(90.0, 50.0)));
}
