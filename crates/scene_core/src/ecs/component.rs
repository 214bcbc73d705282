//! Component trait
//!
//! A component is a capability attached to exactly one node. The tree never
//! looks inside one except through the hooks below; everything else goes
//! through typed lookups on the node's [`ComponentTable`](super::ComponentTable).

use crate::foundation::math::Mat4;
use crate::scene::{BoundsProvider, NodeId};
use std::any::Any;

/// Upcast helper so component tables can downcast to concrete types
pub trait AsAny: Any {
    /// `&self` as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// `&mut self` as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Boxed `self` as `Box<dyn Any>`
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Capability attached to a node; at most one instance per concrete type
pub trait Component: AsAny {
    /// Called once when the component is stored in `owner`'s table
    fn on_attach(&mut self, _owner: NodeId) {}

    /// Bounds capability, for components that know their node's extent
    fn as_bounds(&self) -> Option<&dyn BoundsProvider> {
        None
    }

    /// Called during the update walk once the owner's transform properties
    /// are refreshed, with the owner's current global transform
    fn on_transform_changed(&mut self, _global: &Mat4) {}
}
