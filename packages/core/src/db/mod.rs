//! Storage Layer
//!
//! This module handles persistence of the tree snapshot:
//!
//! - `TreeStore` - async load/store abstraction over one named resource
//! - `JsonFileStore` - pretty-printed JSON file, replaced atomically on every write
//! - `MemoryStore` - in-process snapshot for tests and embedding
//! - `TreeEvent` - committed-change notifications

mod error;
pub mod events;
mod json_store;
mod tree_store;

pub use error::StoreError;
pub use events::TreeEvent;
pub use json_store::JsonFileStore;
pub use tree_store::{MemoryStore, TreeStore};
