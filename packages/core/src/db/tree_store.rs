//! TreeStore Trait - Snapshot Persistence Abstraction
//!
//! The tree is persisted as one snapshot: the ordered list of top-level nodes with
//! their nested children. `TreeService` loads the whole snapshot, edits it in memory
//! and stores the whole snapshot back on every mutation.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: File and network backends share one interface
//! 2. **Whole-Snapshot Granularity**: No partial updates; the last `store` wins
//! 3. **No Locking**: Callers that need multi-writer safety serialize calls themselves
//!
//! # Examples
//!
//! ```rust
//! use navtree_core::db::{MemoryStore, TreeStore};
//! use navtree_core::models::Node;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! assert!(store.load().await?.is_empty());
//!
//! store.store(&[Node::new("1", "Home")]).await?;
//! assert_eq!(store.load().await?.len(), 1);
//! # Ok(())
//! # }
//! ```

use super::StoreError;
use crate::models::Node;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Persistence for the tree snapshot
///
/// Implementations must be `Send + Sync` so a store can be shared behind an `Arc`
/// across tasks.
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Load the current forest
    ///
    /// Returns an empty forest when nothing has been stored yet.
    async fn load(&self) -> Result<Vec<Node>, StoreError>;

    /// Replace the stored forest
    ///
    /// Either the whole snapshot is written or nothing is.
    async fn store(&self, forest: &[Node]) -> Result<(), StoreError>;

    /// Name of the resource this store reads and writes, for diagnostics
    fn resource_key(&self) -> &str;
}

/// In-memory snapshot store
///
/// Useful for tests and for embedding the tree without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    forest: RwLock<Vec<Node>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `forest`
    pub fn with_forest(forest: Vec<Node>) -> Self {
        Self {
            forest: RwLock::new(forest),
        }
    }

    /// Copy of the stored forest, exactly as last written
    pub async fn snapshot(&self) -> Vec<Node> {
        self.forest.read().await.clone()
    }
}

#[async_trait]
impl TreeStore for MemoryStore {
    async fn load(&self) -> Result<Vec<Node>, StoreError> {
        Ok(self.forest.read().await.clone())
    }

    async fn store(&self, forest: &[Node]) -> Result<(), StoreError> {
        *self.forest.write().await = forest.to_vec();
        Ok(())
    }

    fn resource_key(&self) -> &str {
        "memory"
    }
}
