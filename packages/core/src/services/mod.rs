//! Business Services
//!
//! This module contains the tree editing services:
//!
//! - `TreeService` - Reads, insert, update (move/rename/reposition) and subtree delete
//! - `ContentCleaner` - Hook releasing external per-node content during deletes
//!
//! Services coordinate between the storage layer and the pure tree primitives in
//! `operations`, enforcing the structural rules before anything is written.

pub mod content_cleanup;
pub mod error;
pub mod tree_service;

pub use content_cleanup::{ContentCleaner, NoopContentCleaner};
pub use error::TreeServiceError;
pub use tree_service::TreeService;
