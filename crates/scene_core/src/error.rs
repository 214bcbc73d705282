//! Scene errors
//!
//! Only structural operations report errors. The per-frame walks and the
//! component lookups signal absence through `Option`/`bool` instead.

use crate::scene::NodeId;
use thiserror::Error;

/// Errors raised by structural scene operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The id is stale or was never issued by this scene
    #[error("node {0:?} does not exist in this scene")]
    InvalidNode(NodeId),

    /// A node cannot become its own child
    #[error("node {0:?} cannot be attached to itself")]
    SelfAttach(NodeId),

    /// Ownership is transfer-only: detach before attaching elsewhere
    #[error("node {child:?} is already attached to {parent:?}")]
    AlreadyAttached {
        /// Node that was being attached
        child: NodeId,
        /// Its current owner
        parent: NodeId,
    },

    /// The child is an ancestor of the requested parent
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle {
        /// Node that was being attached
        child: NodeId,
        /// Requested parent
        parent: NodeId,
    },

    /// The scene root is owned by the scene itself
    #[error("the scene root cannot be destroyed")]
    RootNotRemovable,

    /// The scene root never gets a parent
    #[error("the scene root cannot be attached under {0:?}")]
    RootNotAttachable(NodeId),
}
