//! Data Models
//!
//! This module contains the data structures stored in and exchanged with the tree:
//!
//! - `Node` - A node of the navigation tree, owning its children
//! - `NewNode` / `NodePatch` - Payloads for creating and updating nodes
//! - `TreeStats` - Content statistics over a forest

mod node;
mod stats;

pub use node::{NewNode, Node, NodeId, NodeKind, NodePatch, ShowType};
pub use stats::TreeStats;
