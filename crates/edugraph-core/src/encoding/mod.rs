//! Serialization and key encoding for storage.
//!
//! # Encoding Traits
//!
//! - [`Encoder`] - Serialize types to bytes
//! - [`Decoder`] - Deserialize types from bytes
//!
//! [`Node`](crate::types::Node) and [`Edge`](crate::types::Edge) implement both
//! through `bincode` in serde mode, behind a one-byte [`FORMAT_VERSION`]. Any
//! other serde type can use [`encode_versioned`] and [`decode_versioned`]
//! directly.
//!
//! # Key Encoding
//!
//! The [`keys`] module provides functions for encoding ordered keys that support
//! efficient range scans in key-value storage backends. Keys use prefixes to
//! partition the keyspace and big-endian encoding to preserve sort order.
//!
//! # Example
//!
//! ```
//! use edugraph_core::encoding::{Decoder, Encoder};
//! use edugraph_core::{Node, NodeFields, NodeId};
//!
//! let node = Node::new(NodeId::new(1), "c1", NodeFields::Course { title: Some("Graphs".into()) });
//!
//! let bytes = node.encode().unwrap();
//! let decoded = Node::decode(&bytes).unwrap();
//! assert_eq!(decoded, node);
//! ```

pub mod keys;
mod traits;
mod value;

#[cfg(test)]
mod proptest_tests;

pub use traits::{Decoder, Encoder, FORMAT_VERSION};
pub use value::{decode_versioned, encode_versioned};
