//! Scene graph
//!
//! [`Scene`] owns every node in a slotmap arena. Ownership of a subtree is
//! expressed by the ordered child lists; parent links are plain ids. The
//! three frame phases walk the tree from any node:
//!
//! ```text
//! handle_event: children (last attached first) -> self
//! update:       self -> children (in order)
//! render:       self -> children (in order), states flow downward
//! ```
//!
//! Each phase is gated per node by its [`FunctionalityMask`].

use super::bounds::AABB;
use super::node::{
    EmptyBehavior, Functionality, FunctionalityMask, Node, NodeBehavior, NodeContext, NodeId,
    RenderOverrides, Target,
};
use super::render_queue::{RenderStates, Renderer};
use crate::config::{ConfigError, SceneConfig};
use crate::ecs::components::{ColliderComponent, TransformComponent};
use crate::ecs::Component;
use crate::error::SceneError;
use crate::events::Event;
use crate::foundation::collections::SlotMap;
use crate::foundation::math::{invert_or_identity, Mat4, Vec2};
use std::time::Duration;

/// Node arena plus the tree operations over it
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    config: SceneConfig,
    default_functionality: FunctionalityMask,
}

impl Default for Scene {
    fn default() -> Self {
        Self::build(SceneConfig::default())
    }
}

impl Scene {
    /// Scene with the default configuration and an empty root
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene using `config`, which is validated first
    pub fn with_config(config: SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SceneConfig) -> Self {
        let default_functionality = FunctionalityMask::from(&config.default_functionality);
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert_with_key(|id| {
            let mut node = Node::new(id, default_functionality, Box::new(EmptyBehavior));
            node.name = Some("root".to_string());
            node
        });
        log::debug!("created scene with root {root:?}");

        Self {
            nodes,
            root,
            config,
            default_functionality,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Root node; it exists for the lifetime of the scene
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Detached node with no behavior
    pub fn create_node(&mut self) -> NodeId {
        self.create_node_with(EmptyBehavior)
    }

    /// Detached node driven by `behavior`
    pub fn create_node_with<B: NodeBehavior>(&mut self, behavior: B) -> NodeId {
        let functionality = self.default_functionality;
        self.nodes
            .insert_with_key(|id| Node::new(id, functionality, Box::new(behavior)))
    }

    /// Whether `id` names a live node of this scene
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is never removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Read-only view of a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Make `child` the last child of `parent`.
    ///
    /// The child must be detached, must not be the root, and must not be
    /// `parent` or one of its ancestors.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let result = self.check_attach(parent, child);
        if let Err(err) = &result {
            log::warn!("attach rejected: {err}");
            return result;
        }

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        log::debug!("attached {child:?} under {parent:?}");
        Ok(())
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::InvalidNode(parent));
        }
        let child_node = self.nodes.get(child).ok_or(SceneError::InvalidNode(child))?;
        if parent == child {
            return Err(SceneError::SelfAttach(child));
        }
        if child == self.root {
            return Err(SceneError::RootNotAttachable(parent));
        }
        if let Some(owner) = child_node.parent {
            return Err(SceneError::AlreadyAttached {
                child,
                parent: owner,
            });
        }
        if self.is_ancestor(parent, child) {
            return Err(SceneError::WouldCycle { child, parent });
        }
        Ok(())
    }

    /// Remove `child` from `parent`'s children and hand it back detached.
    ///
    /// Returns `None` and changes nothing if `child` is not a direct child
    /// of `parent`. The detached subtree stays in the arena.
    pub fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Option<NodeId> {
        let node = self.nodes.get_mut(parent)?;
        let Some(index) = node.children.iter().position(|c| *c == child) else {
            log::trace!("detach miss: {child:?} is not a child of {parent:?}");
            return None;
        };

        node.children.remove(index);
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
        log::debug!("detached {child:?} from {parent:?}");
        Some(child)
    }

    /// Remove `id` and its whole subtree from the arena, dropping their
    /// components and behaviors. Returns how many nodes were removed.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if id == self.root {
            log::warn!("refusing to destroy the scene root");
            return Err(SceneError::RootNotRemovable);
        }
        let parent = self.nodes.get(id).ok_or(SceneError::InvalidNode(id))?.parent;
        if let Some(parent) = parent {
            self.detach_child(parent, id);
        }

        let doomed: Vec<NodeId> = self.descendants(id).collect();
        for node in &doomed {
            self.nodes.remove(*node);
        }
        log::debug!("destroyed {id:?} ({} nodes)", doomed.len());
        Ok(doomed.len())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Owner of `id`
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Children of `id` in insertion order; empty for stale ids
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    /// Parent, grandparent, ... up to the top of the tree
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            cursor: self.parent(id),
        }
    }

    /// `id` and its subtree in depth-first pre-order
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = if self.contains(id) { vec![id] } else { Vec::new() };
        Descendants { scene: self, stack }
    }

    /// Whether `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, id: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Z-index from the last z-ordering pass
    pub fn z_index(&self, id: NodeId) -> Option<i32> {
        self.nodes.get(id).map(|n| n.z_index)
    }

    /// Attach a debug name
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.name = Some(name.into());
        }
    }

    /// Debug name of `id`
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id)?.name.as_deref()
    }

    /// First node in the root's subtree, pre-order, carrying `name`
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|id| self.name(*id) == Some(name))
    }

    /// Render states `id` imposes on its subtree
    pub fn set_render_overrides(&mut self, id: NodeId, overrides: RenderOverrides) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.render_overrides = overrides;
        }
    }

    /// Replace the behavior of `id`; false for stale ids
    pub fn set_behavior<B: NodeBehavior>(&mut self, id: NodeId, behavior: B) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.behavior = Box::new(behavior);
                true
            }
            None => false,
        }
    }

    /// Behavior of `id` downcast to `B`
    pub fn behavior<B: NodeBehavior>(&self, id: NodeId) -> Option<&B> {
        (*self.nodes.get(id)?.behavior).as_any().downcast_ref::<B>()
    }

    /// Behavior of `id` downcast to `B`, mutably
    pub fn behavior_mut<B: NodeBehavior>(&mut self, id: NodeId) -> Option<&mut B> {
        (*self.nodes.get_mut(id)?.behavior)
            .as_any_mut()
            .downcast_mut::<B>()
    }

    // ------------------------------------------------------------------
    // Functionality gating
    // ------------------------------------------------------------------

    /// Enable or disable the selected (functionality, target) pairs of `id`
    pub fn activate_functionality(
        &mut self,
        id: NodeId,
        functions: Functionality,
        targets: Target,
        enable: bool,
    ) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.functionality.set(functions, targets, enable);
        }
    }

    /// Whether every selected pair is enabled on `id`
    pub fn is_functionality_active(
        &self,
        id: NodeId,
        functions: Functionality,
        targets: Target,
    ) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.functionality.is_active(functions, targets))
    }

    fn gate(&self, id: NodeId, function: Functionality, target: Target) -> bool {
        self.is_functionality_active(id, function, target)
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    /// Store `component` on `id`; `None` on stale ids and duplicates
    pub fn add_component<T: Component>(&mut self, id: NodeId, component: T) -> Option<&mut T> {
        self.nodes.get_mut(id)?.components.add(component)
    }

    /// Component `T` of `id`
    pub fn get_component<T: Component>(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id)?.components.get::<T>()
    }

    /// Component `T` of `id`, mutably
    pub fn get_component_mut<T: Component>(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id)?.components.get_mut::<T>()
    }

    /// Whether `id` carries a `T`
    pub fn has_component<T: Component>(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.components.has::<T>())
    }

    /// Take component `T` off `id`
    pub fn remove_component<T: Component>(&mut self, id: NodeId) -> Option<T> {
        self.nodes.get_mut(id)?.components.remove::<T>()
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    /// Local transform of `id`; identity without a transform component
    pub fn local_transform(&self, id: NodeId) -> Mat4 {
        self.get_component::<TransformComponent>(id)
            .map_or_else(Mat4::identity, TransformComponent::get_transform)
    }

    /// Revision of the transform of `id`, if it has one
    pub fn transform_revision(&self, id: NodeId) -> Option<u64> {
        self.get_component::<TransformComponent>(id)
            .map(TransformComponent::revision)
    }

    /// Product of the local transforms from the top of the tree down to `id`
    pub fn global_transform(&self, id: NodeId) -> Option<Mat4> {
        if !self.contains(id) {
            return None;
        }
        Some(
            self.ancestors(id)
                .fold(self.local_transform(id), |acc, a| self.local_transform(a) * acc),
        )
    }

    /// Maps points in `id`'s local space into `ancestor`'s local space.
    /// `ancestor` must be `id` or one of its ancestors.
    fn relative_transform(&self, id: NodeId, ancestor: NodeId) -> Mat4 {
        let mut acc = Mat4::identity();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                break;
            }
            acc = self.local_transform(current) * acc;
            cursor = self.parent(current);
        }
        acc
    }

    /// Nearest node, starting at `start` and walking up, with a bounds
    /// provider, together with its model bounds
    fn nearest_bounds(&self, start: NodeId) -> Option<(NodeId, AABB)> {
        std::iter::once(start)
            .chain(self.ancestors(start))
            .find_map(|id| {
                let provider = self.nodes.get(id)?.components.bounds_provider()?;
                Some((id, provider.model_bounds()))
            })
    }

    /// Bounds of the nearest provider at or above `space`, expressed in
    /// `space`'s local coordinates
    fn bounds_in_space_of(&self, space: NodeId) -> Option<AABB> {
        let (provider, bounds) = self.nearest_bounds(space)?;
        if provider == space {
            return Some(bounds);
        }
        let to_provider = self.relative_transform(space, provider);
        Some(bounds.transformed(&invert_or_identity(&to_provider)))
    }

    /// Re-derive anchored origins and relative alignment of `id` from the
    /// bounds currently in the tree. Returns whether the transform changed.
    pub fn refresh_transform_properties(&mut self, id: NodeId) -> bool {
        let Some(transform) = self.get_component::<TransformComponent>(id) else {
            return false;
        };
        let own = if transform.needs_own_bounds() {
            self.bounds_in_space_of(id)
        } else {
            None
        };
        let aligned = if transform.needs_alignment_bounds() {
            self.parent(id).and_then(|p| self.bounds_in_space_of(p))
        } else {
            None
        };

        self.get_component_mut::<TransformComponent>(id)
            .is_some_and(|t| t.update_properties(own.as_ref(), aligned.as_ref()))
    }

    // ------------------------------------------------------------------
    // Frame phases
    // ------------------------------------------------------------------

    /// Offer `event` to the subtree of `id`: children first, last attached
    /// first, then `id` itself. Every enabled handler runs; `handled` is
    /// advisory.
    pub fn handle_event(&mut self, id: NodeId, event: &mut Event) {
        if !self.contains(id) {
            return;
        }

        if self.gate(id, Functionality::EVENT_HANDLING, Target::CHILDREN) {
            for index in (0..self.children(id).len()).rev() {
                if let Some(child) = self.child_at(id, index) {
                    self.handle_event(child, event);
                }
            }
        }

        if self.gate(id, Functionality::EVENT_HANDLING, Target::SELF) {
            if let Some(node) = self.nodes.get_mut(id) {
                let Node {
                    behavior,
                    components,
                    z_index,
                    ..
                } = node;
                let mut ctx = NodeContext::new(id, *z_index, components);
                behavior.handle_event(&mut ctx, event);
            }
        }
    }

    /// Advance the subtree of `id` by `dt`: the node refreshes its transform
    /// properties, runs its update hook and notifies its components of its
    /// new global transform, then its children update in order.
    pub fn update(&mut self, id: NodeId, dt: Duration) {
        let parent_global = self
            .parent(id)
            .and_then(|p| self.global_transform(p))
            .unwrap_or_else(Mat4::identity);
        log::trace!("update pass from {id:?}, dt = {dt:?}");
        self.update_node(id, dt, &parent_global);
    }

    fn update_node(&mut self, id: NodeId, dt: Duration, parent_global: &Mat4) {
        if !self.contains(id) {
            return;
        }

        if self.gate(id, Functionality::UPDATING, Target::SELF) {
            self.refresh_transform_properties(id);
            if let Some(node) = self.nodes.get_mut(id) {
                let Node {
                    behavior,
                    components,
                    z_index,
                    ..
                } = node;
                let mut ctx = NodeContext::new(id, *z_index, components);
                behavior.update(&mut ctx, dt);
            }
        }

        // derived globals are kept current even when the node's own update is off
        let global = parent_global * self.local_transform(id);
        if let Some(node) = self.nodes.get_mut(id) {
            for component in node.components.iter_mut() {
                component.on_transform_changed(&global);
            }
        }

        if self.gate(id, Functionality::UPDATING, Target::CHILDREN) {
            for index in 0..self.children(id).len() {
                if let Some(child) = self.child_at(id, index) {
                    self.update_node(child, dt, &global);
                }
            }
        }
    }

    /// Draw the subtree of `id` with `states` inherited from above. The
    /// node's local transform and overrides are composed in even when its
    /// own drawing is disabled, so children stay in place.
    pub fn render(&mut self, id: NodeId, states: RenderStates, renderer: &mut dyn Renderer) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let overrides = node.render_overrides;

        let mut states = states;
        states.transform = states.transform * self.local_transform(id);
        overrides.apply(&mut states);

        if self.gate(id, Functionality::RENDERING, Target::SELF) {
            if let Some(node) = self.nodes.get_mut(id) {
                let Node {
                    behavior,
                    components,
                    z_index,
                    ..
                } = node;
                let mut ctx = NodeContext::new(id, *z_index, components);
                behavior.draw(&mut ctx, &mut states, renderer);
            }
        }

        if self.gate(id, Functionality::RENDERING, Target::CHILDREN) {
            for index in 0..self.children(id).len() {
                if let Some(child) = self.child_at(id, index) {
                    self.render(child, states, renderer);
                }
            }
        }
    }

    /// One frame from the root: the optional event, then update, then render
    pub fn run_frame(
        &mut self,
        event: Option<&mut Event>,
        dt: Duration,
        renderer: &mut dyn Renderer,
    ) {
        let root = self.root;
        if let Some(event) = event {
            self.handle_event(root, event);
        }
        self.update(root, dt);
        self.render(root, RenderStates::default(), renderer);
    }

    fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.nodes.get(id)?.children.get(index).copied()
    }

    // ------------------------------------------------------------------
    // Z-ordering
    // ------------------------------------------------------------------

    /// Assign z-indices to the subtree of `id` in pre-order, starting at `z`
    /// and stepping by the configured `z_step`. A node whose transform is
    /// z-fixed keeps its seeded z, and its subtree continues above
    /// whichever is larger of the counter and that value. The counter
    /// saturates at `i32::MAX`, so descendants of a node pinned near the top
    /// share its z instead of wrapping below it.
    ///
    /// Returns the last z-index assigned.
    pub fn update_z_ordering(&mut self, id: NodeId, z: i32) -> i32 {
        let Some(node) = self.nodes.get_mut(id) else {
            return z;
        };

        let fixed = node
            .components
            .get::<TransformComponent>()
            .filter(|t| t.is_z_fixed())
            .map(|t| t.z_seed().map_or(node.z_index, seed_to_index));
        node.z_index = fixed.unwrap_or(z);

        let mut last = node.z_index.max(z);
        let step = self.config.z_step;
        for index in 0..self.children(id).len() {
            if let Some(child) = self.child_at(id, index) {
                last = self.update_z_ordering(child, last.saturating_add(step));
            }
        }
        last
    }

    /// Full pass from the root starting at the configured `z_origin`
    pub fn update_z_ordering_from_root(&mut self) -> i32 {
        let last = self.update_z_ordering(self.root, self.config.z_origin);
        log::trace!("z-ordering pass assigned up to {last}");
        last
    }

    // ------------------------------------------------------------------
    // Picking
    // ------------------------------------------------------------------

    /// Top-most pickable collider in the root's subtree whose global bounds
    /// contain `point`. Ties in z go to the later node in pre-order.
    ///
    /// Global bounds are those of the last `update` that reached the node;
    /// nodes below a parent with `Updating x Children` off keep stale bounds.
    pub fn pick(&self, point: Vec2) -> Option<NodeId> {
        self.descendants(self.root)
            .filter(|id| {
                self.get_component::<ColliderComponent>(*id)
                    .is_some_and(|c| c.hit(point))
            })
            .max_by_key(|id| self.z_index(*id).unwrap_or(i32::MIN))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn seed_to_index(seed: f32) -> i32 {
    seed.round() as i32
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Iterator over the ancestors of a node, nearest first
pub struct Ancestors<'a> {
    scene: &'a Scene,
    cursor: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = self.scene.parent(current);
        Some(current)
    }
}

/// Depth-first pre-order iterator over a subtree
pub struct Descendants<'a> {
    scene: &'a Scene,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.scene.children(current).iter().rev().copied());
        Some(current)
    }
}
