//! Core data types for `EduGraph`.
//!
//! This module defines the identifiers, kinds, nodes and edges of the
//! relationship graph.

mod edge;
mod id;
mod kind;
mod node;

pub use edge::{Edge, Relationship};
pub use id::{EdgeId, NodeId};
pub use kind::{EdgeKind, NodeKind};
pub use node::{Node, NodeFields, NodeKey};
