//! Scene nodes
//!
//! A [`Node`] lives in the [`Scene`](super::Scene) arena and is addressed by
//! a generational [`NodeId`]. The parent link is an id, never an owner, and
//! it is cleared when the node is detached.
//!
//! Per-node behavior (event, update and draw hooks) is supplied through
//! [`NodeBehavior`]; the generic walk in the scene decides when the hooks run.

use super::render_queue::{BlendMode, RenderStates, Renderer, ShaderHandle, TextureHandle};
use crate::config::{FunctionalityConfig, TargetConfig};
use crate::ecs::components::TransformComponent;
use crate::ecs::{AsAny, ComponentTable};
use crate::events::Event;
use crate::foundation::collections::new_key_type;
use bitflags::bitflags;
use std::time::Duration;

new_key_type! {
    /// Generational handle of a node in a [`Scene`](super::Scene)
    pub struct NodeId;
}

bitflags! {
    /// Frame phases that can be gated per node
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Functionality: u8 {
        /// `handle_event` walk
        const EVENT_HANDLING = 1;
        /// `update` walk
        const UPDATING = 1 << 1;
        /// `render` walk
        const RENDERING = 1 << 2;
        /// All three phases
        const ALL = Self::EVENT_HANDLING.bits() | Self::UPDATING.bits() | Self::RENDERING.bits();
    }
}

bitflags! {
    /// Whom a functionality gate applies to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Target: u8 {
        /// The node's own hook
        const SELF = 1;
        /// Recursion into the node's children
        const CHILDREN = 1 << 1;
        /// Both
        const ALL = Self::SELF.bits() | Self::CHILDREN.bits();
    }
}

/// Three independent self/children gates, one per frame phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionalityMask {
    event_handling: Target,
    updating: Target,
    rendering: Target,
}

impl Default for FunctionalityMask {
    fn default() -> Self {
        Self::all()
    }
}

impl FunctionalityMask {
    /// Everything enabled
    pub fn all() -> Self {
        Self {
            event_handling: Target::ALL,
            updating: Target::ALL,
            rendering: Target::ALL,
        }
    }

    /// Everything disabled
    pub fn none() -> Self {
        Self {
            event_handling: Target::empty(),
            updating: Target::empty(),
            rendering: Target::empty(),
        }
    }

    fn gates(&self) -> [(Functionality, Target); 3] {
        [
            (Functionality::EVENT_HANDLING, self.event_handling),
            (Functionality::UPDATING, self.updating),
            (Functionality::RENDERING, self.rendering),
        ]
    }

    fn gate_mut(&mut self, function: Functionality) -> Option<&mut Target> {
        if function == Functionality::EVENT_HANDLING {
            Some(&mut self.event_handling)
        } else if function == Functionality::UPDATING {
            Some(&mut self.updating)
        } else if function == Functionality::RENDERING {
            Some(&mut self.rendering)
        } else {
            None
        }
    }

    /// Enable or disable every (function, target) pair selected by the masks
    pub fn set(&mut self, functions: Functionality, targets: Target, enable: bool) {
        for function in functions.iter() {
            if let Some(gate) = self.gate_mut(function) {
                gate.set(targets, enable);
            }
        }
    }

    /// Whether every selected pair is enabled. Empty masks select nothing
    /// and report `false`.
    pub fn is_active(&self, functions: Functionality, targets: Target) -> bool {
        if functions.is_empty() || targets.is_empty() {
            return false;
        }
        self.gates()
            .iter()
            .filter(|(f, _)| functions.contains(*f))
            .all(|(_, gate)| gate.contains(targets))
    }
}

fn target_from(config: TargetConfig) -> Target {
    let mut target = Target::empty();
    target.set(Target::SELF, config.self_);
    target.set(Target::CHILDREN, config.children);
    target
}

impl From<&FunctionalityConfig> for FunctionalityMask {
    fn from(config: &FunctionalityConfig) -> Self {
        Self {
            event_handling: target_from(config.event_handling),
            updating: target_from(config.updating),
            rendering: target_from(config.rendering),
        }
    }
}

/// Render state a node imposes on itself and its subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOverrides {
    /// Replaces the inherited texture
    pub texture: Option<TextureHandle>,
    /// Replaces the inherited blend mode
    pub blend: Option<BlendMode>,
    /// Replaces the inherited shader
    pub shader: Option<ShaderHandle>,
}

impl RenderOverrides {
    /// Overwrite the fields of `states` this node specifies
    pub fn apply(&self, states: &mut RenderStates) {
        if let Some(texture) = self.texture {
            states.texture = Some(texture);
        }
        if let Some(blend) = self.blend {
            states.blend = blend;
        }
        if let Some(shader) = self.shader {
            states.shader = Some(shader);
        }
    }
}

/// What a behavior hook may see and touch: its own node's components
pub struct NodeContext<'a> {
    id: NodeId,
    z_index: i32,
    components: &'a mut ComponentTable,
}

impl<'a> NodeContext<'a> {
    pub(crate) fn new(id: NodeId, z_index: i32, components: &'a mut ComponentTable) -> Self {
        Self {
            id,
            z_index,
            components,
        }
    }

    /// Node the hook runs for
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node's current z-index
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Node's components
    pub fn components(&self) -> &ComponentTable {
        self.components
    }

    /// Node's components, mutably
    pub fn components_mut(&mut self) -> &mut ComponentTable {
        self.components
    }

    /// Shortcut for the node's transform
    pub fn transform(&self) -> Option<&TransformComponent> {
        self.components.get::<TransformComponent>()
    }

    /// Shortcut for the node's transform, mutably
    pub fn transform_mut(&mut self) -> Option<&mut TransformComponent> {
        self.components.get_mut::<TransformComponent>()
    }
}

/// Per-node hooks invoked by the scene walks; all default to no-ops
pub trait NodeBehavior: AsAny {
    /// Called after the node's children had their chance at `event`
    fn handle_event(&mut self, _ctx: &mut NodeContext<'_>, _event: &mut Event) {}

    /// Called after the node's transform properties were refreshed and
    /// before its children update
    fn update(&mut self, _ctx: &mut NodeContext<'_>, _dt: Duration) {}

    /// Called with the inherited states already composed with this node's
    /// transform and overrides. Changes to `states` are seen by the children.
    fn draw(
        &mut self,
        _ctx: &mut NodeContext<'_>,
        _states: &mut RenderStates,
        _renderer: &mut dyn Renderer,
    ) {
    }
}

/// Behavior of plain grouping nodes
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyBehavior;

impl NodeBehavior for EmptyBehavior {}

/// Arena entry of the scene tree
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) components: ComponentTable,
    pub(crate) functionality: FunctionalityMask,
    pub(crate) z_index: i32,
    pub(crate) behavior: Box<dyn NodeBehavior>,
    pub(crate) render_overrides: RenderOverrides,
    pub(crate) name: Option<String>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        functionality: FunctionalityMask,
        behavior: Box<dyn NodeBehavior>,
    ) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            components: ComponentTable::new(id),
            functionality,
            z_index: 0,
            behavior,
            render_overrides: RenderOverrides::default(),
            name: None,
        }
    }

    /// Owning node, `None` for roots and detached nodes
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Owned children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Component table
    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    /// Functionality gates
    pub fn functionality(&self) -> FunctionalityMask {
        self.functionality
    }

    /// Z-index from the last z-ordering pass
    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Debug name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Render overrides
    pub fn render_overrides(&self) -> RenderOverrides {
        self.render_overrides
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("z_index", &self.z_index)
            .field("functionality", &self.functionality)
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}
