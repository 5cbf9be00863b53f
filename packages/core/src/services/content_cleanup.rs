//! Content cleanup hook for deletes
//!
//! A node's `content` lives inside the snapshot and disappears with it. Some
//! deployments keep extra per-node data elsewhere (rendered pages, attachments);
//! a `ContentCleaner` releases that data before the subtree is spliced out.

use crate::models::Node;
use async_trait::async_trait;

/// Releases externally stored data for one node
///
/// Called once per node of a subtree being deleted, concurrently and in no particular
/// order. Errors are logged by the caller and never abort the delete.
#[async_trait]
pub trait ContentCleaner: Send + Sync {
    async fn cleanup(&self, node: &Node) -> anyhow::Result<()>;
}

/// Cleaner for deployments without external content
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopContentCleaner;

#[async_trait]
impl ContentCleaner for NoopContentCleaner {
    async fn cleanup(&self, _node: &Node) -> anyhow::Result<()> {
        Ok(())
    }
}
