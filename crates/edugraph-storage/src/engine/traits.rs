//! Core storage engine traits.

use std::ops::Bound;
use std::sync::Arc;

use super::StorageError;

/// A key-value pair returned by cursor operations.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Result type for cursor operations that return a key-value pair.
pub type CursorResult = Result<Option<KeyValue>, StorageError>;

/// A storage engine that hands out transactions over named tables.
///
/// Each table is an ordered map from byte keys to byte values. Engines must be
/// `Send + Sync` so a single handle can be shared by every component of the
/// graph service.
///
/// # Example
///
/// ```ignore
/// use edugraph_storage::{StorageEngine, StorageError, Transaction};
///
/// fn record_title<E: StorageEngine>(engine: &E) -> Result<(), StorageError> {
///     let mut tx = engine.begin_write()?;
///     tx.put("course_titles", b"c1", b"Graph Theory")?;
///     tx.commit()
/// }
/// ```
pub trait StorageEngine: Send + Sync {
    /// The transaction type for this engine.
    type Transaction<'a>: Transaction
    where
        Self: 'a;

    /// Begin a read-only transaction over a consistent snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the transaction cannot be started.
    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Begin a read-write transaction.
    ///
    /// Write transactions are serialized by the backend: a second writer
    /// waits until the first commits or aborts.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the transaction cannot be started.
    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError>;

    /// Flush buffered data to durable storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the flush fails.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// A transaction over the engine's tables.
///
/// Writes become visible to other transactions only after [`commit`]. Dropping
/// a write transaction without committing discards every write it made.
///
/// [`commit`]: Transaction::commit
pub trait Transaction {
    /// The cursor type for iteration.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Get the value stored under `key` in `table`.
    ///
    /// A table that has never been written reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails.
    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Insert or replace the value under `key` in `table`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] in a read transaction, or an error
    /// if the backend write fails.
    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Remove `key` from `table`, returning whether it was present.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadOnly`] in a read transaction, or an error
    /// if the backend write fails.
    fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool, StorageError>;

    /// Open a cursor over the whole table.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor cannot be created.
    fn cursor(&self, table: &str) -> Result<Self::Cursor<'_>, StorageError>;

    /// Open a cursor restricted to keys within `start..end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor cannot be created.
    fn range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Self::Cursor<'_>, StorageError>;

    /// Make every write of this transaction durable and visible.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Transaction`] if the commit fails, in which case
    /// none of the writes persist.
    fn commit(self) -> Result<(), StorageError>;

    /// Discard every write of this transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to abort.
    fn rollback(self) -> Result<(), StorageError>;

    /// Check if this is a read-only transaction.
    fn is_read_only(&self) -> bool;
}

/// A cursor for ordered iteration over key-value pairs.
///
/// ```ignore
/// let mut cursor = tx.range("edges_by_source", Bound::Included(&prefix), Bound::Excluded(&end))?;
/// while let Some((key, _)) = cursor.next()? {
///     // one adjacency entry per key
/// }
/// ```
pub trait Cursor {
    /// Position at the first key greater than or equal to `key`.
    fn seek(&mut self, key: &[u8]) -> CursorResult;

    /// Position at the first entry.
    fn seek_first(&mut self) -> CursorResult;

    /// Position at the last entry.
    fn seek_last(&mut self) -> CursorResult;

    /// Advance to the next entry. An unpositioned cursor starts at the first.
    fn next(&mut self) -> CursorResult;

    /// Step back to the previous entry. An unpositioned cursor starts at the last.
    fn prev(&mut self) -> CursorResult;

    /// The entry the cursor is positioned at, if any.
    fn current(&self) -> Option<(&[u8], &[u8])>;
}

/// Shared engines are engines too, so the graph service can hand the same
/// `Arc` to every component.
impl<E: StorageEngine> StorageEngine for Arc<E> {
    type Transaction<'a>
        = E::Transaction<'a>
    where
        Self: 'a;

    fn begin_read(&self) -> Result<Self::Transaction<'_>, StorageError> {
        (**self).begin_read()
    }

    fn begin_write(&self) -> Result<Self::Transaction<'_>, StorageError> {
        (**self).begin_write()
    }

    fn flush(&self) -> Result<(), StorageError> {
        (**self).flush()
    }
}
