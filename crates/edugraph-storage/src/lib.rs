//! `EduGraph` Storage
//!
//! This crate provides the storage engine abstraction and the redb backend
//! that hold the education graph.
//!
//! # Overview
//!
//! The storage layer provides a transactional key-value interface with
//! snapshot reads and atomic commit. The graph layer builds nodes, edges and
//! indexes on top of it without knowing which backend is in use.
//!
//! # Core Traits
//!
//! - [`StorageEngine`] - The main entry point for storage operations
//! - [`Transaction`] - ACID transaction support with read/write operations
//! - [`Cursor`] - Ordered iteration over key-value pairs
//!
//! # Error Handling
//!
//! All storage operations return [`StorageResult<T>`], which is an alias for
//! `Result<T, StorageError>`.
//!
//! # Example
//!
//! ```
//! use edugraph_storage::backends::RedbEngine;
//! use edugraph_storage::{StorageEngine, Transaction};
//!
//! let engine = RedbEngine::in_memory()?;
//!
//! let mut tx = engine.begin_write()?;
//! tx.put("courses", b"c1", b"Graph Theory")?;
//! tx.commit()?;
//!
//! let tx = engine.begin_read()?;
//! assert_eq!(tx.get("courses", b"c1")?, Some(b"Graph Theory".to_vec()));
//! # Ok::<(), edugraph_storage::StorageError>(())
//! ```
//!
//! # Modules
//!
//! - [`engine`] - Storage engine traits and abstractions
//! - [`backends`] - Concrete storage backend implementations

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod backends;
pub mod engine;

pub use engine::{
    Cursor, CursorResult, KeyValue, StorageEngine, StorageError, StorageResult, Transaction,
};
