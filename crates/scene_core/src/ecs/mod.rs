//! Components and the per-node component table
//!
//! Nodes are extended by attaching components rather than by subclassing.
//! Each node owns one [`ComponentTable`] holding at most one component per
//! concrete type.

pub mod component;
pub mod components;
pub mod table;

pub use component::{AsAny, Component};
pub use table::ComponentTable;
