//! `EduGraph` Graph
//!
//! This crate turns the key-value storage layer into a typed graph: node and
//! edge storage, the unique identity index, adjacency indexes, the persisted
//! schema catalog, and hop-by-hop traversal.
//!
//! Every operation takes a transaction and never commits it. Callers decide
//! the transaction boundaries.
//!
//! # Modules
//!
//! - [`store`] - Node and edge storage operations
//! - [`index`] - Adjacency index over the edge tables
//! - [`schema`] - Predicate and type declarations
//! - [`traversal`] - Neighbor expansion and cascading hop queries

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod index;
pub mod schema;
pub mod store;
pub mod traversal;
