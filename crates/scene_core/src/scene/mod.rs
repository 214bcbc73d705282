//! Scene graph
//!
//! A tree of nodes walked once per frame to dispatch input events, advance
//! simulation state and submit draw commands.
//!
//! ## Architecture
//!
//! ```text
//! Host loop
//!      ↓  handle_event / update / render
//! Scene (node arena, tree walks, z-ordering)
//!      ↓  per node
//! ComponentTable + NodeBehavior hooks
//!      ↓  draw commands
//! Renderer (RenderQueue or a backend)
//! ```

mod bounds;
mod node;
mod render_queue;
mod resolver;
mod scene_graph;

#[cfg(test)]
mod tests;

pub use bounds::{BoundsProvider, AABB};
pub use node::{
    EmptyBehavior, Functionality, FunctionalityMask, Node, NodeBehavior, NodeContext, NodeId,
    RenderOverrides, Target,
};
pub use render_queue::{
    BlendMode, DrawCommand, RenderQueue, RenderStates, Renderer, ShaderHandle, TextureHandle,
};
pub use resolver::GlobalTransformResolver;
pub use scene_graph::{Ancestors, Descendants, Scene};
