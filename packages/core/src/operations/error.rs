//! Error types for structural tree operations
//!
//! These errors are raised by the pure primitives in `operations` before anything is
//! persisted. The service layer converts them into `TreeServiceError`.

use crate::models::NodeId;
use thiserror::Error;

/// Errors that can occur while editing a forest in memory
///
/// # Examples
///
/// ```rust
/// use navtree_core::operations::TreeOperationError;
///
/// let err = TreeOperationError::invalid_move("7", "7", "a node cannot be its own parent");
/// assert!(err.to_string().contains("own parent"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeOperationError {
    /// Referenced node does not exist
    #[error("Node '{id}' does not exist")]
    NodeNotFound { id: NodeId },

    /// Requested parent does not exist
    #[error("Parent node '{parent_id}' does not exist")]
    ParentNotFound { parent_id: NodeId },

    /// Move rejected because it would create a cycle
    ///
    /// The forest is restored to its previous shape before this is returned.
    #[error("Cannot move node '{id}' under '{target}': {reason}")]
    InvalidMove {
        id: NodeId,
        target: NodeId,
        reason: String,
    },
}

impl TreeOperationError {
    pub fn node_not_found(id: impl Into<NodeId>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    pub fn parent_not_found(parent_id: impl Into<NodeId>) -> Self {
        Self::ParentNotFound {
            parent_id: parent_id.into(),
        }
    }

    pub fn invalid_move(
        id: impl Into<NodeId>,
        target: impl Into<NodeId>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidMove {
            id: id.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }
}
