//! Built-in components
//!
//! - [`TransformComponent`]: local transform with anchored origins and
//!   relative alignment
//! - [`ColliderComponent`]: rectangular bounds provider

pub mod collision;
pub mod transform;

pub use collision::ColliderComponent;
pub use transform::{Alignment, Anchor, Origin, OriginType, TransformComponent};
