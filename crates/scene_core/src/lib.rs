//! # Scene Core
//!
//! Scene-graph core of a real-time 2D engine: a tree of nodes that own their
//! children, carry optional components, and are walked once per frame to
//! dispatch input events, advance simulation state and submit draw commands.
//!
//! ## Features
//!
//! - **Node arena**: generational ids, safe attach/detach, subtree destruction
//! - **Components**: type-keyed, single instance per type and node
//! - **Transforms**: lazily cached local matrices with bounds-anchored origins
//!   and relative alignment
//! - **Gating**: per-node self/children switches for events, updates and drawing
//! - **Z-ordering**: pre-order z assignment with pinned nodes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_core::prelude::*;
//! use std::time::Duration;
//!
//! let mut scene = Scene::new();
//! let panel = scene.create_node();
//! scene.attach_child(scene.root(), panel)?;
//! scene.add_component(panel, ColliderComponent::from_size(Vec2::new(200.0, 50.0)));
//!
//! let label = scene.create_node();
//! scene.attach_child(panel, label)?;
//! if let Some(t) = scene.add_component(label, TransformComponent::new()) {
//!     t.set_relative_alignment(Anchor::LEFT | Anchor::CENTER_Y, 5.0);
//! }
//!
//! scene.update_z_ordering_from_root();
//! let mut queue = RenderQueue::new();
//! scene.run_frame(None, Duration::from_millis(16), &mut queue);
//! # Ok::<(), SceneError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod error;
pub mod events;
pub mod foundation;
pub mod scene;

pub use error::SceneError;

/// Common imports for scene users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SceneConfig},
        ecs::{
            components::{Anchor, ColliderComponent, OriginType, TransformComponent},
            Component, ComponentTable,
        },
        events::{Event, EventType, KeyCode, MouseButton},
        foundation::{
            math::{Mat4, Vec2, Vec3},
            time::Timer,
        },
        scene::{
            BlendMode, BoundsProvider, DrawCommand, Functionality, GlobalTransformResolver,
            NodeBehavior, NodeContext, NodeId, RenderOverrides, RenderQueue, RenderStates,
            Renderer, Scene, Target, AABB,
        },
        SceneError,
    };
}
