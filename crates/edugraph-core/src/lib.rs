//! `EduGraph` Core
//!
//! This crate provides the fundamental types shared by every layer of the
//! education relationship graph.
//!
//! # Overview
//!
//! - **Identifiers**: [`NodeId`] and [`EdgeId`] for committed graph elements
//! - **Kinds**: [`NodeKind`] (Student, Instructor, Course, ...) and [`EdgeKind`]
//!   (enrolled, teaches, ...) with their endpoint rules
//! - **Nodes**: [`Node`] carrying a domain identifier and typed [`NodeFields`]
//! - **Edges**: [`Edge`] carrying a typed [`Relationship`] with its attributes
//!
//! # Example
//!
//! ```
//! use edugraph_core::{Edge, EdgeId, EdgeKind, Node, NodeFields, NodeId, NodeKind, Relationship};
//!
//! let student = Node::new(NodeId::new(1), "s1", NodeFields::Student);
//! let course = Node::new(NodeId::new(2), "c1", NodeFields::Course { title: None });
//!
//! let enrolled = Edge::new(EdgeId::new(1), student.id, course.id, Relationship::Enrolled);
//!
//! assert_eq!(student.kind(), NodeKind::Student);
//! assert_eq!(enrolled.kind(), EdgeKind::Enrolled);
//! assert!(EdgeKind::Enrolled.accepts(student.kind(), course.kind()));
//! ```
//!
//! # Modules
//!
//! - [`types`] - Identifiers, kinds, nodes and edges
//! - [`encoding`] - Value encoding and ordered storage keys
//! - [`error`] - Error types ([`CoreError`])

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod encoding;
pub mod error;
pub mod types;

pub use error::CoreError;
pub use types::{
    Edge, EdgeId, EdgeKind, Node, NodeFields, NodeId, NodeKey, NodeKind, Relationship,
};
