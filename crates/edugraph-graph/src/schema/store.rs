//! Persistence of the schema catalog in the metadata table.

use edugraph_core::encoding::{decode_versioned, encode_versioned};
use edugraph_storage::Transaction;

use super::catalog::SchemaCatalog;
use crate::store::GraphResult;

/// Table name for metadata.
pub const TABLE_METADATA: &str = "metadata";

/// Key of the encoded catalog.
const CATALOG_KEY: &[u8] = b"schema:catalog";

/// Loads and stores the [`SchemaCatalog`].
pub struct SchemaStore;

impl SchemaStore {
    /// Load the catalog, or an empty one if none was ever stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored catalog cannot be decoded.
    pub fn load<T: Transaction>(tx: &T) -> GraphResult<SchemaCatalog> {
        match tx.get(TABLE_METADATA, CATALOG_KEY)? {
            Some(bytes) => Ok(decode_versioned(&bytes)?),
            None => Ok(SchemaCatalog::new()),
        }
    }

    /// Store the catalog, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the write fails.
    pub fn save<T: Transaction>(tx: &mut T, catalog: &SchemaCatalog) -> GraphResult<()> {
        tx.put(TABLE_METADATA, CATALOG_KEY, &encode_versioned(catalog)?)?;
        Ok(())
    }

    /// Remove the stored catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear<T: Transaction>(tx: &mut T) -> GraphResult<bool> {
        Ok(tx.delete(TABLE_METADATA, CATALOG_KEY)?)
    }
}
