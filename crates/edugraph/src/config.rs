//! Engine configuration.
//!
//! [`EngineConfig`] holds every knob of an [`EduGraph`](crate::EduGraph)
//! instance. It is usually built through [`EduGraphBuilder`]:
//!
//! ```ignore
//! use edugraph::EduGraphBuilder;
//!
//! let graph = EduGraphBuilder::new()
//!     .path("campus.redb")
//!     .cache_size(64 * 1024 * 1024)
//!     .max_conflict_retries(5)
//!     .open()?;
//! ```

use std::path::{Path, PathBuf};

use edugraph_storage::backends::{RedbConfig, RedbEngine};

use crate::error::{Error, Result};
use crate::service::EduGraph;

/// Default number of attempts for a write that loses a creation race.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// Where the graph is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// A database file, created if missing.
    File(PathBuf),
    /// A transient in-memory database.
    InMemory,
}

/// Configuration for an [`EduGraph`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Where the graph is stored.
    pub location: StorageLocation,
    /// Page cache size in bytes for file databases.
    pub cache_size: Option<usize>,
    /// Attempts made by retrying writes before a conflict is returned.
    pub max_conflict_retries: u32,
    /// Whether resolved identities are cached in process.
    pub resolver_cache: bool,
    /// Whether [`SchemaManager::reset_schema`](crate::SchemaManager::reset_schema)
    /// may drop data.
    pub allow_destructive_reset: bool,
}

impl EngineConfig {
    /// Configuration for an in-memory graph with default settings.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { location: StorageLocation::InMemory, ..Self::default() }
    }

    /// Configuration for a file-backed graph with default settings.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self { location: StorageLocation::File(path.into()), ..Self::default() }
    }

    /// Check the configuration for values that cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a setting is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.max_conflict_retries == 0 {
            return Err(Error::Config("max_conflict_retries must be at least 1".to_owned()));
        }
        if let StorageLocation::File(path) = &self.location {
            if path.as_os_str().is_empty() {
                return Err(Error::Config("database path must not be empty".to_owned()));
            }
        }
        if self.cache_size == Some(0) {
            return Err(Error::Config("cache_size must be positive".to_owned()));
        }
        Ok(())
    }

    /// Open the redb engine this configuration describes.
    pub(crate) fn open_engine(&self) -> Result<RedbEngine> {
        let engine = match &self.location {
            StorageLocation::InMemory => RedbEngine::in_memory()?,
            StorageLocation::File(path) => {
                let mut redb_config = RedbConfig::new();
                if let Some(cache_size) = self.cache_size {
                    redb_config = redb_config.cache_size(cache_size);
                }
                RedbEngine::open_with_config(path, redb_config)?
            }
        };
        Ok(engine)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            location: StorageLocation::InMemory,
            cache_size: None,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
            resolver_cache: true,
            allow_destructive_reset: false,
        }
    }
}

/// Builder for opening an [`EduGraph`].
#[derive(Debug, Clone, Default)]
pub struct EduGraphBuilder {
    config: EngineConfig,
}

impl EduGraphBuilder {
    /// Start from the default, in-memory configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the graph in a file.
    #[must_use]
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.location = StorageLocation::File(path.as_ref().to_path_buf());
        self
    }

    /// Keep the graph in memory.
    #[must_use]
    pub fn in_memory(mut self) -> Self {
        self.config.location = StorageLocation::InMemory;
        self
    }

    /// Set the page cache size in bytes.
    #[must_use]
    pub const fn cache_size(mut self, bytes: usize) -> Self {
        self.config.cache_size = Some(bytes);
        self
    }

    /// Set how many attempts a retrying write makes.
    #[must_use]
    pub const fn max_conflict_retries(mut self, attempts: u32) -> Self {
        self.config.max_conflict_retries = attempts;
        self
    }

    /// Enable or disable the in-process identity cache.
    #[must_use]
    pub const fn resolver_cache(mut self, enabled: bool) -> Self {
        self.config.resolver_cache = enabled;
        self
    }

    /// Allow destructive schema resets.
    #[must_use]
    pub const fn allow_destructive_reset(mut self, allow: bool) -> Self {
        self.config.allow_destructive_reset = allow;
        self
    }

    /// The configuration built so far.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open the graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid configuration, or a
    /// connection error if the database cannot be opened.
    pub fn open(self) -> Result<EduGraph> {
        self.config.validate()?;
        let engine = self.config.open_engine()?;
        EduGraph::with_engine(engine, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.location, StorageLocation::InMemory);
        assert_eq!(config.max_conflict_retries, 3);
        assert!(config.resolver_cache);
        assert!(!config.allow_destructive_reset);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let builder = EduGraphBuilder::new()
            .path("/tmp/campus.redb")
            .cache_size(1024)
            .max_conflict_retries(7)
            .resolver_cache(false)
            .allow_destructive_reset(true);
        let config = builder.config();

        assert_eq!(config.location, StorageLocation::File(PathBuf::from("/tmp/campus.redb")));
        assert_eq!(config.cache_size, Some(1024));
        assert_eq!(config.max_conflict_retries, 7);
        assert!(!config.resolver_cache);
        assert!(config.allow_destructive_reset);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let config = EngineConfig { max_conflict_retries: 0, ..EngineConfig::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        assert!(matches!(EngineConfig::file("").validate(), Err(Error::Config(_))));

        let config = EngineConfig { cache_size: Some(0), ..EngineConfig::in_memory() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
