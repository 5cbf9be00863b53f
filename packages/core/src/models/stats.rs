//! Content statistics over a tree

use super::Node;
use serde::{Deserialize, Serialize};

/// Summary of how much of the tree carries content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    pub total_nodes: usize,
    /// Nodes with non-empty `content`
    pub content_nodes: usize,
    /// Sum of content lengths in characters
    pub total_content_length: usize,
    /// Share of nodes with content, as a rounded percentage
    pub content_coverage: u32,
}

impl TreeStats {
    /// Collect statistics from any sequence of nodes (children are not followed)
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        let mut stats = TreeStats::default();
        for node in nodes {
            stats.total_nodes += 1;
            if !node.content.is_empty() {
                stats.content_nodes += 1;
                stats.total_content_length += node.content.chars().count();
            }
        }
        if stats.total_nodes > 0 {
            let ratio = stats.content_nodes as f64 / stats.total_nodes as f64;
            stats.content_coverage = (ratio * 100.0).round() as u32;
        }
        stats
    }
}
