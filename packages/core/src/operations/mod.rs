//! Tree Operations
//!
//! Pure, in-memory primitives over a forest of owned nodes:
//!
//! - `ordering` - Weight normalization and slot opening among siblings
//! - `navigator` - Lookup, patch, detach and insert by id
//! - `reparent` - Cycle checks and atomic moves
//! - `rename` - Identifier rename with child relinking
//!
//! Nothing here touches storage; `TreeService` composes these and persists the result.

pub mod error;
pub mod navigator;
pub mod ordering;
pub mod rename;
pub mod reparent;

pub use error::TreeOperationError;
pub use navigator::SiblingSlot;
