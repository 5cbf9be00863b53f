//! Domain Events for TreeService
//!
//! Events are emitted through a tokio broadcast channel after a mutation has been
//! stored, so subscribers only ever hear about committed changes.

use crate::models::{Node, NodeId};

/// Committed changes to the tree
#[derive(Debug, Clone)]
pub enum TreeEvent {
    /// A node was inserted (final weight included)
    NodeAdded(Node),

    /// A node's fields changed
    NodeUpdated(Node),

    /// A node was moved to a different parent
    NodeMoved {
        id: NodeId,
        from: NodeId,
        to: NodeId,
    },

    /// A node and its subtree were removed
    NodeDeleted {
        id: NodeId,
        /// Number of nodes removed, the node itself included
        removed: usize,
    },
}

impl TreeEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            TreeEvent::NodeAdded(_) => "node:added",
            TreeEvent::NodeUpdated(_) => "node:updated",
            TreeEvent::NodeMoved { .. } => "node:moved",
            TreeEvent::NodeDeleted { .. } => "node:deleted",
        }
    }
}
