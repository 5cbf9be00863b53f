//! NavTree Core Business Logic Layer
//!
//! This crate provides storage and editing for a weighted hierarchy of navigation
//! nodes (menus and pages with optional document content), persisted as one JSON
//! snapshot.
//!
//! # Architecture
//!
//! - **Whole-Snapshot Persistence**: Every mutation loads the forest, edits it in
//!   memory and stores it back
//! - **Dense Weights**: Siblings are always numbered `1..=N` in display order
//! - **Check Before Write**: Moves, renames and inserts are validated on a private
//!   copy; a rejected call never touches storage
//! - **Iterative Traversal**: Depth is bounded by memory, not by the call stack
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, NodeId, NewNode, NodePatch, TreeStats)
//! - [`operations`] - Pure tree primitives (ordering, lookup, reparent, rename)
//! - [`services`] - Business services (TreeService, ContentCleaner)
//! - [`db`] - Snapshot stores (JSON file, in-memory) and tree events
//! - [`config`] - Environment-driven store configuration

pub mod config;
pub mod db;
pub mod models;
pub mod operations;
pub mod services;

// Re-export commonly used types
pub use config::StoreConfig;
pub use db::{JsonFileStore, MemoryStore, StoreError, TreeEvent, TreeStore};
pub use models::*;
pub use services::*;
