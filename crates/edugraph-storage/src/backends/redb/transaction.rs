//! Redb transaction and cursor implementation.
//!
//! Cursors stream entries in batches instead of materializing a whole range
//! up front. A cursor holds at most one batch plus its position, and fetches
//! the neighbouring batch on demand when it walks off either end.

use std::fmt::Display;
use std::ops::Bound;

use redb::{AccessGuard, ReadTransaction, ReadableTable, WriteTransaction};

use crate::engine::{Cursor, CursorResult, KeyValue, StorageError, Transaction};

use super::tables::{encode_key, table_end_key, table_start_key, DATA_TABLE};

/// Default number of entries fetched per cursor batch.
const DEFAULT_BATCH_SIZE: usize = 1000;

/// A transaction for the redb storage engine.
#[allow(clippy::large_enum_variant)]
pub enum RedbTransaction {
    /// A read-only snapshot.
    Read(ReadTransaction),
    /// A read-write transaction.
    Write(WriteTransaction),
}

impl RedbTransaction {
    /// Wrap a read-only transaction.
    #[must_use]
    pub const fn new_read(tx: ReadTransaction) -> Self {
        Self::Read(tx)
    }

    /// Wrap a read-write transaction.
    #[must_use]
    pub const fn new_write(tx: WriteTransaction) -> Self {
        Self::Write(tx)
    }

    /// Fetch up to `limit` entries within the physical bounds.
    ///
    /// Entries are returned in ascending key order with the table prefix
    /// stripped. When `reverse` is set the entries closest to `upper` are
    /// selected.
    fn fetch(
        &self,
        lower: &Bound<Vec<u8>>,
        upper: &Bound<Vec<u8>>,
        prefix_len: usize,
        limit: usize,
        reverse: bool,
    ) -> Result<Vec<KeyValue>, StorageError> {
        if range_is_empty(lower, upper) {
            return Ok(Vec::new());
        }

        match self {
            Self::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => scan(&t, lower, upper, prefix_len, limit, reverse),
                // Nothing has ever been written
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(Vec::new()),
                Err(e) => Err(internal(e)),
            },
            Self::Write(tx) => {
                let t = tx.open_table(DATA_TABLE).map_err(internal)?;
                scan(&t, lower, upper, prefix_len, limit, reverse)
            }
        }
    }
}

impl Transaction for RedbTransaction {
    type Cursor<'a>
        = RedbCursor<'a>
    where
        Self: 'a;

    fn get(&self, table: &str, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let encoded = encode_key(table, key);

        match self {
            Self::Read(tx) => match tx.open_table(DATA_TABLE) {
                Ok(t) => read_value(&t, &encoded),
                Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
                Err(e) => Err(internal(e)),
            },
            Self::Write(tx) => {
                let t = tx.open_table(DATA_TABLE).map_err(internal)?;
                read_value(&t, &encoded)
            }
        }
    }

    fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write(tx) => {
                let encoded = encode_key(table, key);
                let mut t = tx.open_table(DATA_TABLE).map_err(internal)?;
                t.insert(encoded.as_slice(), value).map_err(internal)?;
                Ok(())
            }
        }
    }

    fn delete(&mut self, table: &str, key: &[u8]) -> Result<bool, StorageError> {
        match self {
            Self::Read(_) => Err(StorageError::ReadOnly),
            Self::Write(tx) => {
                let encoded = encode_key(table, key);
                let mut t = tx.open_table(DATA_TABLE).map_err(internal)?;
                let removed = t.remove(encoded.as_slice()).map_err(internal)?;
                Ok(removed.is_some())
            }
        }
    }

    fn cursor(&self, table: &str) -> Result<Self::Cursor<'_>, StorageError> {
        Ok(RedbCursor::new(self, table, Bound::Unbounded, Bound::Unbounded, DEFAULT_BATCH_SIZE))
    }

    fn range(
        &self,
        table: &str,
        start: Bound<&[u8]>,
        end: Bound<&[u8]>,
    ) -> Result<Self::Cursor<'_>, StorageError> {
        Ok(RedbCursor::new(
            self,
            table,
            bound_to_owned(start),
            bound_to_owned(end),
            DEFAULT_BATCH_SIZE,
        ))
    }

    fn commit(self) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write(tx) => tx.commit().map_err(|e| StorageError::Transaction(e.to_string())),
        }
    }

    fn rollback(self) -> Result<(), StorageError> {
        match self {
            Self::Read(_) => Ok(()),
            Self::Write(tx) => tx.abort().map_err(|e| StorageError::Transaction(e.to_string())),
        }
    }

    fn is_read_only(&self) -> bool {
        matches!(self, Self::Read(_))
    }
}

fn internal(e: impl Display) -> StorageError {
    StorageError::Internal(e.to_string())
}

fn read_value<T>(table: &T, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    Ok(table.get(key).map_err(internal)?.map(|guard| guard.value().to_vec()))
}

fn scan<T>(
    table: &T,
    lower: &Bound<Vec<u8>>,
    upper: &Bound<Vec<u8>>,
    prefix_len: usize,
    limit: usize,
    reverse: bool,
) -> Result<Vec<KeyValue>, StorageError>
where
    T: ReadableTable<&'static [u8], &'static [u8]>,
{
    let range = table.range::<&[u8]>((as_slice(lower), as_slice(upper))).map_err(internal)?;

    if reverse {
        let mut entries = collect_entries(range.rev(), prefix_len, limit)?;
        entries.reverse();
        Ok(entries)
    } else {
        collect_entries(range, prefix_len, limit)
    }
}

type RawEntry<'a> =
    Result<(AccessGuard<'a, &'static [u8]>, AccessGuard<'a, &'static [u8]>), redb::StorageError>;

fn collect_entries<'a, I>(
    entries: I,
    prefix_len: usize,
    limit: usize,
) -> Result<Vec<KeyValue>, StorageError>
where
    I: Iterator<Item = RawEntry<'a>>,
{
    let mut out = Vec::with_capacity(limit.min(1024));
    for entry in entries.take(limit) {
        let (key, value) = entry.map_err(internal)?;
        let logical = key.value().get(prefix_len..).unwrap_or_default();
        out.push((logical.to_vec(), value.value().to_vec()));
    }
    Ok(out)
}

fn as_slice(bound: &Bound<Vec<u8>>) -> Bound<&[u8]> {
    match bound {
        Bound::Included(k) => Bound::Included(k.as_slice()),
        Bound::Excluded(k) => Bound::Excluded(k.as_slice()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

fn bound_to_owned(bound: Bound<&[u8]>) -> Bound<Vec<u8>> {
    match bound {
        Bound::Included(b) => Bound::Included(b.to_vec()),
        Bound::Excluded(b) => Bound::Excluded(b.to_vec()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

fn range_is_empty(lower: &Bound<Vec<u8>>, upper: &Bound<Vec<u8>>) -> bool {
    match (lower, upper) {
        (Bound::Included(lo), Bound::Included(hi)) => lo > hi,
        (Bound::Included(lo) | Bound::Excluded(lo), Bound::Excluded(hi))
        | (Bound::Excluded(lo), Bound::Included(hi)) => lo >= hi,
        _ => false,
    }
}

/// Translate a logical lower bound into the physical keyspace.
fn physical_lower(table: &str, bound: &Bound<Vec<u8>>) -> Bound<Vec<u8>> {
    match bound {
        Bound::Included(k) => Bound::Included(encode_key(table, k)),
        Bound::Excluded(k) => Bound::Excluded(encode_key(table, k)),
        Bound::Unbounded => Bound::Included(table_start_key(table)),
    }
}

/// Translate a logical upper bound into the physical keyspace.
fn physical_upper(table: &str, bound: &Bound<Vec<u8>>) -> Bound<Vec<u8>> {
    match bound {
        Bound::Included(k) => Bound::Included(encode_key(table, k)),
        Bound::Excluded(k) => Bound::Excluded(encode_key(table, k)),
        Bound::Unbounded => Bound::Excluded(table_end_key(table)),
    }
}

/// A batched cursor over one logical table of a [`RedbTransaction`].
pub struct RedbCursor<'a> {
    tx: &'a RedbTransaction,
    table: String,
    /// Length of the physical table prefix to strip from every key.
    prefix_len: usize,
    /// Logical bounds requested by the caller.
    start: Bound<Vec<u8>>,
    end: Bound<Vec<u8>>,
    batch: Vec<KeyValue>,
    position: Option<usize>,
    batch_size: usize,
    more_forward: bool,
    more_backward: bool,
}

impl<'a> RedbCursor<'a> {
    fn new(
        tx: &'a RedbTransaction,
        table: &str,
        start: Bound<Vec<u8>>,
        end: Bound<Vec<u8>>,
        batch_size: usize,
    ) -> Self {
        Self {
            tx,
            table: table.to_owned(),
            prefix_len: table_start_key(table).len(),
            start,
            end,
            batch: Vec::new(),
            position: None,
            batch_size,
            more_forward: true,
            more_backward: true,
        }
    }

    fn fetch_forward(&self, lower: &Bound<Vec<u8>>) -> Result<Vec<KeyValue>, StorageError> {
        let upper = physical_upper(&self.table, &self.end);
        self.tx.fetch(lower, &upper, self.prefix_len, self.batch_size, false)
    }

    fn fetch_backward(&self, upper: &Bound<Vec<u8>>) -> Result<Vec<KeyValue>, StorageError> {
        let lower = physical_lower(&self.table, &self.start);
        self.tx.fetch(&lower, upper, self.prefix_len, self.batch_size, true)
    }

    /// Replace the batch and position the cursor at `position`.
    fn install(&mut self, batch: Vec<KeyValue>, position: Position) -> CursorResult {
        if batch.is_empty() {
            return Ok(self.clear());
        }
        self.position = Some(match position {
            Position::First => 0,
            Position::Last => batch.len() - 1,
        });
        self.batch = batch;
        Ok(self.current_owned())
    }

    fn clear(&mut self) -> Option<KeyValue> {
        self.position = None;
        None
    }

    fn current_owned(&self) -> Option<KeyValue> {
        self.position.and_then(|pos| self.batch.get(pos).cloned())
    }
}

#[derive(Clone, Copy)]
enum Position {
    First,
    Last,
}

impl Cursor for RedbCursor<'_> {
    fn seek(&mut self, key: &[u8]) -> CursorResult {
        let requested = Bound::Included(key.to_vec());
        let logical = match &self.start {
            Bound::Included(start) | Bound::Excluded(start) if start.as_slice() >= key => {
                self.start.clone()
            }
            _ => requested,
        };
        let batch = self.fetch_forward(&physical_lower(&self.table, &logical))?;
        self.more_forward = batch.len() >= self.batch_size;
        self.more_backward = true;
        self.install(batch, Position::First)
    }

    fn seek_first(&mut self) -> CursorResult {
        let batch = self.fetch_forward(&physical_lower(&self.table, &self.start))?;
        self.more_forward = batch.len() >= self.batch_size;
        self.more_backward = false;
        self.install(batch, Position::First)
    }

    fn seek_last(&mut self) -> CursorResult {
        let batch = self.fetch_backward(&physical_upper(&self.table, &self.end))?;
        self.more_backward = batch.len() >= self.batch_size;
        self.more_forward = false;
        self.install(batch, Position::Last)
    }

    fn next(&mut self) -> CursorResult {
        let Some(pos) = self.position else {
            return self.seek_first();
        };

        if pos + 1 < self.batch.len() {
            self.position = Some(pos + 1);
            return Ok(self.current_owned());
        }
        if !self.more_forward {
            return Ok(self.clear());
        }

        let Some((last, _)) = self.batch.last() else {
            return Ok(self.clear());
        };
        let after = Bound::Excluded(encode_key(&self.table, last));
        let batch = self.fetch_forward(&after)?;
        self.more_forward = batch.len() >= self.batch_size;
        self.more_backward = true;
        self.install(batch, Position::First)
    }

    fn prev(&mut self) -> CursorResult {
        let Some(pos) = self.position else {
            return self.seek_last();
        };

        if pos > 0 {
            self.position = Some(pos - 1);
            return Ok(self.current_owned());
        }
        if !self.more_backward {
            return Ok(self.clear());
        }

        let Some((first, _)) = self.batch.first() else {
            return Ok(self.clear());
        };
        let before = Bound::Excluded(encode_key(&self.table, first));
        let batch = self.fetch_backward(&before)?;
        self.more_backward = batch.len() >= self.batch_size;
        self.more_forward = true;
        self.install(batch, Position::Last)
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        self.position
            .and_then(|pos| self.batch.get(pos))
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}
