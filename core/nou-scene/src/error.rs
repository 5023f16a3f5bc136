use thiserror::Error;

use crate::hierarchy::NodeId;

/// Error types for hierarchy operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The handle refers to a node that has been destroyed
    #[error("Stale handle: {0} no longer exists")]
    StaleHandle(NodeId),

    /// Re-parenting would make a node its own ancestor
    #[error("Cannot parent {child} under {parent}: it would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
}

/// Result type using SceneError
pub type Result<T> = std::result::Result<T, SceneError>;
