//! In-memory schema catalog and additive merging.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{GraphError, GraphResult};

/// The value type of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// UTF-8 text.
    String,
    /// 64-bit float.
    Float,
    /// UTC timestamp.
    DateTime,
    /// Reference to another node.
    Uid,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Float => "float",
            Self::DateTime => "datetime",
            Self::Uid => "uid",
        })
    }
}

/// Index kinds a predicate can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    /// Exact-match equality lookup.
    Exact,
}

/// Declaration of a single predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredicateDef {
    /// Predicate name, e.g. `course_id` or `enrolled`.
    pub name: String,
    /// Value type.
    pub value_type: ValueType,
    /// Whether the predicate holds a list of values.
    pub list: bool,
    /// Index carried by the predicate.
    pub index: Option<IndexKind>,
    /// Whether reverse traversal is enabled (only meaningful for `Uid`).
    pub reverse: bool,
}

impl PredicateDef {
    /// A scalar, unindexed predicate.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self { name: name.into(), value_type, list: false, index: None, reverse: false }
    }

    /// Mark the predicate as list-valued.
    #[must_use]
    pub const fn list(mut self) -> Self {
        self.list = true;
        self
    }

    /// Add an exact-match index.
    #[must_use]
    pub const fn exact(mut self) -> Self {
        self.index = Some(IndexKind::Exact);
        self
    }

    /// Enable reverse traversal.
    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// Declaration of a node type and the predicates it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Type name, e.g. `Course`.
    pub name: String,
    /// Predicate names, in declaration order.
    pub fields: Vec<String>,
}

impl TypeDef {
    /// Declare a type with the given fields.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name: name.into(), fields: fields.into_iter().map(Into::into).collect() }
    }
}

/// A batch of declarations to merge into the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDefinition {
    /// Predicate declarations.
    pub predicates: Vec<PredicateDef>,
    /// Type declarations.
    pub types: Vec<TypeDef>,
}

impl SchemaDefinition {
    /// Create an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate declaration.
    #[must_use]
    pub fn predicate(mut self, predicate: PredicateDef) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Add a type declaration.
    #[must_use]
    pub fn type_def(mut self, type_def: TypeDef) -> Self {
        self.types.push(type_def);
        self
    }
}

/// What a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaChange {
    /// Predicates that did not exist before.
    pub added_predicates: Vec<String>,
    /// Existing predicates that gained an index or reverse traversal.
    pub upgraded_predicates: Vec<String>,
    /// Types that did not exist before.
    pub added_types: Vec<String>,
    /// Existing types that gained fields.
    pub extended_types: Vec<String>,
}

impl SchemaChange {
    /// Whether the merge left the catalog unchanged.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added_predicates.is_empty()
            && self.upgraded_predicates.is_empty()
            && self.added_types.is_empty()
            && self.extended_types.is_empty()
    }
}

/// The persisted set of predicate and type declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCatalog {
    version: u64,
    predicates: BTreeMap<String, PredicateDef>,
    types: BTreeMap<String, TypeDef>,
}

impl SchemaCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of merges that changed the catalog.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Whether nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty() && self.types.is_empty()
    }

    /// Look up a predicate.
    #[must_use]
    pub fn predicate(&self, name: &str) -> Option<&PredicateDef> {
        self.predicates.get(name)
    }

    /// Look up a type.
    #[must_use]
    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Iterate over all predicates in name order.
    pub fn predicates(&self) -> impl Iterator<Item = &PredicateDef> {
        self.predicates.values()
    }

    /// Iterate over all types in name order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Whether `name` is declared with an exact-match index.
    #[must_use]
    pub fn is_exact_indexed(&self, name: &str) -> bool {
        self.predicates.get(name).is_some_and(|p| p.index == Some(IndexKind::Exact))
    }

    /// Whether `name` is declared with reverse traversal.
    #[must_use]
    pub fn has_reverse(&self, name: &str) -> bool {
        self.predicates.get(name).is_some_and(|p| p.reverse)
    }

    /// Merge a definition into the catalog.
    ///
    /// The merge is all-or-nothing: on error the catalog is unchanged.
    ///
    /// - An identical predicate is a no-op; a new one is added.
    /// - Redeclaring a predicate with another value type or list-ness is a
    ///   conflict.
    /// - Adding an index or reverse traversal to a predicate is allowed;
    ///   dropping one is not, the existing capability is kept.
    /// - Type field lists are unioned. A field must name a declared predicate.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::SchemaConflict`] on an incompatible declaration.
    pub fn merge(&mut self, definition: &SchemaDefinition) -> GraphResult<SchemaChange> {
        let mut next = self.clone();
        let mut change = SchemaChange::default();

        for predicate in &definition.predicates {
            next.merge_predicate(predicate, &mut change)?;
        }
        for type_def in &definition.types {
            next.merge_type(type_def, &mut change)?;
        }

        if !change.is_noop() {
            next.version += 1;
            *self = next;
        }
        Ok(change)
    }

    fn merge_predicate(
        &mut self,
        incoming: &PredicateDef,
        change: &mut SchemaChange,
    ) -> GraphResult<()> {
        if incoming.name.is_empty() {
            return Err(GraphError::SchemaConflict("predicate name must not be empty".to_owned()));
        }

        let Some(existing) = self.predicates.get_mut(&incoming.name) else {
            self.predicates.insert(incoming.name.clone(), incoming.clone());
            change.added_predicates.push(incoming.name.clone());
            return Ok(());
        };

        if existing.value_type != incoming.value_type || existing.list != incoming.list {
            return Err(GraphError::SchemaConflict(format!(
                "predicate {} is declared as {}{}, cannot redeclare as {}{}",
                existing.name,
                existing.value_type,
                if existing.list { " list" } else { "" },
                incoming.value_type,
                if incoming.list { " list" } else { "" },
            )));
        }

        let mut upgraded = false;
        if existing.index.is_none() && incoming.index.is_some() {
            existing.index = incoming.index;
            upgraded = true;
        }
        if !existing.reverse && incoming.reverse {
            existing.reverse = true;
            upgraded = true;
        }
        if upgraded && !change.added_predicates.contains(&incoming.name) {
            change.upgraded_predicates.push(incoming.name.clone());
        }
        Ok(())
    }

    fn merge_type(&mut self, incoming: &TypeDef, change: &mut SchemaChange) -> GraphResult<()> {
        if let Some(field) = incoming.fields.iter().find(|f| !self.predicates.contains_key(*f)) {
            return Err(GraphError::SchemaConflict(format!(
                "type {} names undeclared predicate {field}",
                incoming.name
            )));
        }

        let Some(existing) = self.types.get_mut(&incoming.name) else {
            self.types.insert(incoming.name.clone(), incoming.clone());
            change.added_types.push(incoming.name.clone());
            return Ok(());
        };

        let before = existing.fields.len();
        for field in &incoming.fields {
            if !existing.fields.contains(field) {
                existing.fields.push(field.clone());
            }
        }
        if existing.fields.len() > before && !change.added_types.contains(&incoming.name) {
            change.extended_types.push(incoming.name.clone());
        }
        Ok(())
    }
}
