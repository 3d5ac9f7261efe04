//! Redb storage backend.
//!
//! All logical tables share one physical redb table. Each key is prefixed
//! with its logical table name so a logical table is a contiguous key range.

mod engine;
pub mod tables;
mod transaction;

pub use engine::{RedbConfig, RedbEngine};
pub use transaction::{RedbCursor, RedbTransaction};
