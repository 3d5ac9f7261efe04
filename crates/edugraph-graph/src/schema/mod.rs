//! Schema declarations and their persistence.
//!
//! The catalog records which predicates exist, their value types, which are
//! indexed for exact-match lookup and which may be traversed in reverse. It
//! only grows: changes are merged additively and an incompatible redefinition
//! is rejected as a whole.

mod catalog;
mod store;

pub use catalog::{
    IndexKind, PredicateDef, SchemaCatalog, SchemaChange, SchemaDefinition, TypeDef, ValueType,
};
pub use store::{SchemaStore, TABLE_METADATA};
