//! Schema bootstrap, additive changes and destructive reset.

use std::sync::{Arc, RwLock};

use edugraph_core::{EdgeKind, NodeKind};
use edugraph_graph::schema::{
    PredicateDef, SchemaCatalog, SchemaChange, SchemaDefinition, SchemaStore, TypeDef, ValueType,
    TABLE_METADATA,
};
use edugraph_graph::store::{clear_tables, GRAPH_TABLES};
use edugraph_storage::{StorageEngine, Transaction};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::resolver::EntityResolver;

/// Confirmation token for [`SchemaManager::reset_schema`].
///
/// Passing it states that every node, edge and schema declaration may be
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropAll;

/// What a reset removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetReport {
    /// Number of stored entries deleted, index entries included.
    pub entries_removed: usize,
}

/// The schema of the education graph.
///
/// Every node kind is a type whose identity predicate carries an exact index.
/// Every edge kind is a list of node references with reverse traversal.
#[must_use]
pub fn education_schema() -> SchemaDefinition {
    let mut definition = SchemaDefinition::new();

    for kind in NodeKind::ALL {
        definition =
            definition.predicate(PredicateDef::new(kind.identity_predicate(), ValueType::String).exact());
    }
    definition = definition
        .predicate(PredicateDef::new("title", ValueType::String))
        .predicate(PredicateDef::new("score", ValueType::Float))
        .predicate(PredicateDef::new("content", ValueType::String))
        .predicate(PredicateDef::new("timestamp", ValueType::DateTime));
    for kind in EdgeKind::ALL {
        definition =
            definition.predicate(PredicateDef::new(kind.predicate(), ValueType::Uid).list().reverse());
    }

    for kind in NodeKind::ALL {
        let mut fields = vec![kind.identity_predicate()];
        fields.extend(match kind {
            NodeKind::Course => &["title"][..],
            NodeKind::Assignment => &["score"][..],
            NodeKind::Post => &["content", "timestamp"][..],
            NodeKind::Student | NodeKind::Instructor | NodeKind::User => &[][..],
        });
        fields.extend(
            EdgeKind::ALL.iter().filter(|edge| edge.source_kind() == kind).map(|edge| edge.predicate()),
        );
        definition = definition.type_def(TypeDef::new(kind.as_str(), fields));
    }

    definition
}

/// Declares and resets the graph schema.
pub struct SchemaManager<E: StorageEngine> {
    engine: Arc<E>,
    catalog: Arc<RwLock<SchemaCatalog>>,
    resolver: EntityResolver<E>,
    allow_reset: bool,
}

impl<E: StorageEngine> SchemaManager<E> {
    pub(crate) fn new(
        engine: Arc<E>,
        catalog: Arc<RwLock<SchemaCatalog>>,
        resolver: EntityResolver<E>,
        allow_reset: bool,
    ) -> Self {
        Self { engine, catalog, resolver, allow_reset }
    }

    /// Declare the education schema.
    ///
    /// Safe to repeat: a second call changes nothing and keeps all data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaConflict`] if a stored declaration is
    /// incompatible with the education schema.
    pub fn define_schema(&self) -> Result<SchemaChange> {
        self.alter(&education_schema())
    }

    /// Merge a definition into the stored schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaConflict`] on an incompatible declaration; the
    /// stored schema is then unchanged.
    pub fn alter(&self, definition: &SchemaDefinition) -> Result<SchemaChange> {
        let mut tx = self.engine.begin_write()?;
        let mut catalog = SchemaStore::load(&tx)?;
        let change = catalog.merge(definition)?;

        if change.is_noop() {
            tx.rollback()?;
        } else {
            SchemaStore::save(&mut tx, &catalog)?;
            tx.commit()?;
            info!(
                version = catalog.version(),
                added_predicates = change.added_predicates.len(),
                upgraded_predicates = change.upgraded_predicates.len(),
                added_types = change.added_types.len(),
                extended_types = change.extended_types.len(),
                "schema altered"
            );
        }

        *self.catalog.write().map_err(|e| Error::lock_poisoned(e.to_string()))? = catalog;
        Ok(change)
    }

    /// Drop every node, edge and schema declaration.
    ///
    /// Requires both the `allow_destructive_reset` setting and the [`DropAll`]
    /// token. Runs in one write transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResetNotAllowed`] if resets are disabled; nothing is
    /// touched in that case.
    pub fn reset_schema(&self, _confirm: DropAll) -> Result<ResetReport> {
        if !self.allow_reset {
            return Err(Error::ResetNotAllowed);
        }

        let mut tables = GRAPH_TABLES.to_vec();
        tables.push(TABLE_METADATA);

        let mut tx = self.engine.begin_write()?;
        let entries_removed = clear_tables(&mut tx, &tables)?;
        tx.commit()?;

        *self.catalog.write().map_err(|e| Error::lock_poisoned(e.to_string()))? =
            SchemaCatalog::new();
        self.resolver.clear()?;

        warn!(entries_removed, "graph reset, all data and schema dropped");
        Ok(ResetReport { entries_removed })
    }

    /// The stored schema as last loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the catalog lock is poisoned.
    pub fn catalog(&self) -> Result<SchemaCatalog> {
        Ok(self.catalog.read().map_err(|e| Error::lock_poisoned(e.to_string()))?.clone())
    }

    /// Fail unless `kind` may be traversed against its direction.
    pub(crate) fn require_reverse(catalog: &RwLock<SchemaCatalog>, kind: EdgeKind) -> Result<()> {
        let catalog = catalog.read().map_err(|e| Error::lock_poisoned(e.to_string()))?;
        if catalog.has_reverse(kind.predicate()) {
            Ok(())
        } else {
            Err(Error::malformed(format!("predicate {} has no reverse traversal", kind.predicate())))
        }
    }
}
