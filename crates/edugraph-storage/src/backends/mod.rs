//! Storage backend implementations.
//!
//! - [`redb`] - Pure-Rust embedded database with ACID transactions, file-backed
//!   or in-memory

pub mod redb;

pub use self::redb::{RedbConfig, RedbCursor, RedbEngine, RedbTransaction};
