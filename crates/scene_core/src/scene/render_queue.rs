//! Render queue for z-ordered 2D drawing
//!
//! The render walk hands every node's draw hook the [`RenderStates`] it
//! inherited, already composed with the node's own transform. Hooks submit
//! [`DrawCommand`]s to a [`Renderer`]; the backend is whatever implements
//! that trait. [`RenderQueue`] is the in-memory implementation that records
//! commands and sorts them by z-index for painter's-order playback.

use super::bounds::AABB;
use super::NodeId;
use crate::foundation::math::Mat4;

/// Opaque texture identifier owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque shader identifier owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u32);

/// Color blending applied when drawing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Source-over alpha blending
    #[default]
    Alpha,
    /// Additive blending
    Add,
    /// Multiplicative blending
    Multiply,
    /// Overwrite destination
    None,
}

/// Accumulated drawing state passed down the render walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStates {
    /// Local-to-world transform of the node being drawn
    pub transform: Mat4,
    /// Bound texture, if any
    pub texture: Option<TextureHandle>,
    /// Blend mode
    pub blend: BlendMode,
    /// Bound shader, if any
    pub shader: Option<ShaderHandle>,
}

impl Default for RenderStates {
    fn default() -> Self {
        Self {
            transform: Mat4::identity(),
            texture: None,
            blend: BlendMode::default(),
            shader: None,
        }
    }
}

impl RenderStates {
    /// Default states with `transform` as the starting matrix
    pub fn with_transform(transform: Mat4) -> Self {
        Self {
            transform,
            ..Self::default()
        }
    }
}

/// A single draw submitted by a node
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Submitting node
    pub node: NodeId,
    /// Node's z-index at submission
    pub z_index: i32,
    /// States the geometry is drawn with
    pub states: RenderStates,
    /// Quad in the node's local space, for backends that draw rectangles
    pub local_bounds: Option<AABB>,
}

impl DrawCommand {
    /// Quad mapped through the command's transform
    pub fn world_bounds(&self) -> Option<AABB> {
        self.local_bounds
            .map(|b| b.transformed(&self.states.transform))
    }
}

/// Receiver of draw commands
pub trait Renderer {
    /// Accept one draw
    fn submit(&mut self, command: DrawCommand);
}

/// Records draw commands for later, z-sorted playback
#[derive(Debug, Default)]
pub struct RenderQueue {
    commands: Vec<DrawCommand>,
}

impl RenderQueue {
    /// Create an empty render queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands in submission order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands ordered by ascending z-index. Ties keep submission order.
    pub fn sorted(&self) -> Vec<&DrawCommand> {
        let mut sorted: Vec<&DrawCommand> = self.commands.iter().collect();
        sorted.sort_by_key(|c| c.z_index);
        sorted
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Clear the queue for the next frame
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Renderer for RenderQueue {
    fn submit(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::collections::SlotMap;
    use crate::foundation::math::{translation_2d, Vec2};

    fn command(node: NodeId, z_index: i32) -> DrawCommand {
        DrawCommand {
            node,
            z_index,
            states: RenderStates::default(),
            local_bounds: None,
        }
    }

    #[test]
    fn test_sorted_is_stable_by_z() {
        let mut ids = SlotMap::<NodeId, ()>::with_key();
        let (a, b, c) = (ids.insert(()), ids.insert(()), ids.insert(()));

        let mut queue = RenderQueue::new();
        queue.submit(command(a, 5));
        queue.submit(command(b, 1));
        queue.submit(command(c, 5));

        let order: Vec<NodeId> = queue.sorted().iter().map(|c| c.node).collect();
        assert_eq!(order, vec![b, a, c]);
        assert_eq!(queue.commands()[0].node, a);

        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_world_bounds_follow_transform() {
        let mut ids = SlotMap::<NodeId, ()>::with_key();
        let mut cmd = command(ids.insert(()), 0);
        cmd.states = RenderStates::with_transform(translation_2d(Vec2::new(10.0, 20.0)));
        cmd.local_bounds = Some(AABB::new(Vec2::zeros(), Vec2::new(4.0, 4.0)));

        assert_eq!(
            cmd.world_bounds(),
            Some(AABB::new(Vec2::new(10.0, 20.0), Vec2::new(14.0, 24.0)))
        );
    }
}
