//! Identity resolution.
//!
//! Callers name entities by opaque domain identifiers. The [`EntityResolver`]
//! turns such an identifier into a [`NodeRef`]: either a reference to the
//! stored node, or a pending reference that materializes when a mutation
//! containing it commits.
//!
//! Resolution is a single read of the unique identity index. It does not
//! reserve anything: two callers may both receive a pending reference for the
//! same key. The write path re-checks the index inside its transaction, so
//! only one of them creates the node and the other sees
//! [`Error::RetryableConflict`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use edugraph_core::{Node, NodeFields, NodeId, NodeKey, NodeKind};
use edugraph_graph::schema::SchemaCatalog;
use edugraph_graph::store::NodeStore;
use edugraph_storage::{StorageEngine, Transaction};
use tracing::warn;

use crate::error::{Error, Result};

/// A resolved endpoint of a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRef {
    key: NodeKey,
    id: Option<NodeId>,
    fields: Option<NodeFields>,
}

impl NodeRef {
    /// A reference to a node that is already stored.
    #[must_use]
    pub fn existing(key: NodeKey, id: NodeId) -> Self {
        Self { key, id: Some(id), fields: None }
    }

    /// A reference to a node that will be created on commit.
    #[must_use]
    pub fn pending(key: NodeKey) -> Self {
        Self { key, id: None, fields: None }
    }

    /// Attach attributes to write with the node.
    ///
    /// For a pending node they become its initial fields; for an existing node
    /// they are merged in, overwriting provided values and keeping the rest.
    #[must_use]
    pub fn with_fields(mut self, fields: NodeFields) -> Self {
        self.fields = Some(fields);
        self
    }

    /// The identity this reference resolves.
    #[must_use]
    pub const fn key(&self) -> &NodeKey {
        &self.key
    }

    /// The kind of the referenced node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.key.kind
    }

    /// The stored node ID, or `None` while pending.
    #[must_use]
    pub const fn id(&self) -> Option<NodeId> {
        self.id
    }

    /// Whether the node does not exist yet.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.id.is_none()
    }

    /// The attributes attached with [`with_fields`](Self::with_fields).
    #[must_use]
    pub const fn fields(&self) -> Option<&NodeFields> {
        self.fields.as_ref()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} -> {id}", self.key),
            None => write!(f, "{} (pending)", self.key),
        }
    }
}

/// Maps domain identifiers to graph nodes.
///
/// Cloning is cheap; clones share the identity cache.
pub struct EntityResolver<E: StorageEngine> {
    engine: Arc<E>,
    catalog: Arc<RwLock<SchemaCatalog>>,
    cache: Arc<RwLock<HashMap<NodeKey, NodeId>>>,
    cache_enabled: bool,
}

impl<E: StorageEngine> Clone for EntityResolver<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            catalog: Arc::clone(&self.catalog),
            cache: Arc::clone(&self.cache),
            cache_enabled: self.cache_enabled,
        }
    }
}

impl<E: StorageEngine> EntityResolver<E> {
    pub(crate) fn new(
        engine: Arc<E>,
        catalog: Arc<RwLock<SchemaCatalog>>,
        cache_enabled: bool,
    ) -> Self {
        Self { engine, catalog, cache: Arc::new(RwLock::new(HashMap::new())), cache_enabled }
    }

    /// Resolve `(kind, domain_id)` in a fresh read transaction.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedQuery`] if `domain_id` is empty or the kind's
    ///   identity predicate carries no exact index
    /// - [`Error::IntegrityAnomaly`] if the identity index is inconsistent
    pub fn resolve(&self, kind: NodeKind, domain_id: &str) -> Result<NodeRef> {
        let tx = self.engine.begin_read()?;
        self.resolve_in(&tx, kind, domain_id)
    }

    /// Resolve `(kind, domain_id)` inside an open transaction.
    ///
    /// The answer reflects the transaction's snapshot: a node committed after
    /// `tx` began resolves as pending.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn resolve_in<T: Transaction>(
        &self,
        tx: &T,
        kind: NodeKind,
        domain_id: &str,
    ) -> Result<NodeRef> {
        if domain_id.is_empty() {
            return Err(Error::malformed(format!("{} must not be empty", kind.identity_predicate())));
        }
        self.require_identity_index(kind)?;

        let key = NodeKey::new(kind, domain_id);
        if let Some(id) = self.cached(&key)? {
            // The cache may be ahead of this snapshot, or stale after a reset.
            if NodeStore::exists(tx, id)? {
                return Ok(NodeRef::existing(key, id));
            }
            self.forget(&key)?;
        }

        match NodeStore::get_by_key(tx, &key)? {
            Some(node) => {
                self.remember(&key, node.id)?;
                Ok(NodeRef::existing(key, node.id))
            }
            None => Ok(NodeRef::pending(key)),
        }
    }

    /// Resolve the key of `node_ref` again, keeping its attached fields.
    ///
    /// Used after a lost creation race: the key now resolves to the node the
    /// competing writer created.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn refresh(&self, node_ref: &NodeRef) -> Result<NodeRef> {
        let key = node_ref.key();
        let fresh = self.resolve(key.kind, &key.domain_id)?;
        Ok(match node_ref.fields() {
            Some(fields) => fresh.with_fields(fields.clone()),
            None => fresh,
        })
    }

    /// Record a known identity.
    pub(crate) fn remember(&self, key: &NodeKey, id: NodeId) -> Result<()> {
        if !self.cache_enabled {
            return Ok(());
        }
        self.cache
            .write()
            .map_err(|e| Error::lock_poisoned(e.to_string()))?
            .insert(key.clone(), id);
        Ok(())
    }

    /// Record the nodes of a committed write.
    ///
    /// The write is already durable, so a cache failure is only logged.
    pub(crate) fn remember_committed(&self, nodes: &[Node]) {
        for node in nodes {
            if let Err(err) = self.remember(&node.key(), node.id) {
                warn!(error = %err, "identity cache unavailable, skipping");
                return;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn poison_cache(&self) {
        let cache = Arc::clone(&self.cache);
        let _ = std::thread::spawn(move || {
            let _guard = cache.write();
            panic!("cache writer died");
        })
        .join();
    }

    /// Drop a cached identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the cache lock is poisoned.
    pub fn forget(&self, key: &NodeKey) -> Result<()> {
        self.cache.write().map_err(|e| Error::lock_poisoned(e.to_string()))?.remove(key);
        Ok(())
    }

    /// Drop every cached identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the cache lock is poisoned.
    pub fn clear(&self) -> Result<()> {
        self.cache.write().map_err(|e| Error::lock_poisoned(e.to_string()))?.clear();
        Ok(())
    }

    /// Number of cached identities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the cache lock is poisoned.
    pub fn cached_len(&self) -> Result<usize> {
        Ok(self.cache.read().map_err(|e| Error::lock_poisoned(e.to_string()))?.len())
    }

    fn cached(&self, key: &NodeKey) -> Result<Option<NodeId>> {
        if !self.cache_enabled {
            return Ok(None);
        }
        Ok(self.cache.read().map_err(|e| Error::lock_poisoned(e.to_string()))?.get(key).copied())
    }

    fn require_identity_index(&self, kind: NodeKind) -> Result<()> {
        let predicate = kind.identity_predicate();
        let catalog = self.catalog.read().map_err(|e| Error::lock_poisoned(e.to_string()))?;
        if catalog.is_exact_indexed(predicate) {
            Ok(())
        } else {
            Err(Error::malformed(format!(
                "predicate {predicate} has no exact index; define the schema first"
            )))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use edugraph_storage::backends::RedbEngine;

    use super::*;
    use crate::schema::education_schema;

    fn resolver() -> EntityResolver<RedbEngine> {
        let mut catalog = SchemaCatalog::new();
        catalog.merge(&education_schema()).unwrap();
        EntityResolver::new(
            Arc::new(RedbEngine::in_memory().unwrap()),
            Arc::new(RwLock::new(catalog)),
            true,
        )
    }

    #[test]
    fn stale_cache_entry_is_dropped() {
        let resolver = resolver();
        let key = NodeKey::new(NodeKind::Student, "s1");
        resolver.remember(&key, NodeId::new(99)).unwrap();
        assert_eq!(resolver.cached_len().unwrap(), 1);

        let node_ref = resolver.resolve(NodeKind::Student, "s1").unwrap();
        assert!(node_ref.is_pending());
        assert_eq!(resolver.cached_len().unwrap(), 0);
    }

    #[test]
    fn committed_nodes_survive_a_poisoned_cache() {
        let resolver = resolver();
        resolver.poison_cache();

        let node = Node::new(NodeId::new(1), "s1", NodeFields::Student);
        resolver.remember_committed(&[node]);
        assert!(matches!(resolver.cached_len(), Err(Error::LockPoisoned(_))));
    }

    #[test]
    fn resolution_requires_identity_index() {
        let resolver = EntityResolver::new(
            Arc::new(RedbEngine::in_memory().unwrap()),
            Arc::new(RwLock::new(SchemaCatalog::new())),
            true,
        );
        let err = resolver.resolve(NodeKind::Course, "c1").unwrap_err();
        assert!(matches!(err, Error::MalformedQuery(_)), "{err}");
    }

    #[test]
    fn node_ref_states() {
        let key = NodeKey::new(NodeKind::Course, "c1");
        let pending = NodeRef::pending(key.clone());
        assert!(pending.is_pending());
        assert_eq!(pending.id(), None);
        assert_eq!(pending.to_string(), "Course(c1) (pending)");

        let existing = NodeRef::existing(key, NodeId::new(3))
            .with_fields(NodeFields::Course { title: Some("Graphs".into()) });
        assert!(!existing.is_pending());
        assert_eq!(existing.kind(), NodeKind::Course);
        assert!(existing.fields().is_some());
    }
}
