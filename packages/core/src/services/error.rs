//! Service Layer Error Types
//!
//! This module defines error types for tree service operations, providing
//! detailed error handling for business logic failures.

use crate::config::MAX_TREE_DEPTH;
use crate::db::StoreError;
use crate::models::NodeId;
use crate::operations::TreeOperationError;
use std::time::Duration;
use thiserror::Error;

/// Tree service errors
///
/// Every structural error is detected before anything is written. `Persistence`
/// comes from the final load or store and leaves the stored snapshot untouched.
#[derive(Error, Debug)]
pub enum TreeServiceError {
    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// Requested parent does not exist
    #[error("Parent node not found: {parent_id}")]
    ParentNotFound { parent_id: NodeId },

    /// Move would put a node under itself or one of its descendants
    #[error("Invalid move of node {id} under {target}: {reason}")]
    InvalidMove {
        id: NodeId,
        target: NodeId,
        reason: String,
    },

    /// Another node already uses this ID
    #[error("Node ID already in use: {id}")]
    DuplicateId { id: NodeId },

    /// Insert or move would nest the tree deeper than the snapshot format allows
    #[error("Placing node {id} would nest it {depth} levels deep (limit {limit})")]
    DepthLimitExceeded {
        id: NodeId,
        depth: usize,
        limit: usize,
    },

    /// Delete did not finish within its time budget
    ///
    /// Nothing has been written when this is returned.
    #[error("Deleting node {id} timed out after {budget:?}")]
    OperationTimeout { id: NodeId, budget: Duration },

    /// Payload rejected
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Snapshot load or store failed
    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl TreeServiceError {
    /// Create a node not found error
    pub fn node_not_found(id: impl Into<NodeId>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create a parent not found error
    pub fn parent_not_found(parent_id: impl Into<NodeId>) -> Self {
        Self::ParentNotFound {
            parent_id: parent_id.into(),
        }
    }

    /// Create a duplicate ID error
    pub fn duplicate_id(id: impl Into<NodeId>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Create a timeout error
    pub fn operation_timeout(id: impl Into<NodeId>, budget: Duration) -> Self {
        Self::OperationTimeout {
            id: id.into(),
            budget,
        }
    }

    /// Create a depth limit error
    pub fn depth_limit_exceeded(id: impl Into<NodeId>, depth: usize) -> Self {
        Self::DepthLimitExceeded {
            id: id.into(),
            depth,
            limit: MAX_TREE_DEPTH,
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the error means the target (or its parent) does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound { .. } | Self::ParentNotFound { .. }
        )
    }
}

impl From<TreeOperationError> for TreeServiceError {
    fn from(err: TreeOperationError) -> Self {
        match err {
            TreeOperationError::NodeNotFound { id } => Self::NodeNotFound { id },
            TreeOperationError::ParentNotFound { parent_id } => Self::ParentNotFound { parent_id },
            TreeOperationError::InvalidMove { id, target, reason } => {
                Self::InvalidMove { id, target, reason }
            }
        }
    }
}
