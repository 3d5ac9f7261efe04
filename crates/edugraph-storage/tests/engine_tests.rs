//! Contract tests shared by every storage engine implementation.

use std::ops::Bound;

use edugraph_storage::{Cursor, StorageEngine, StorageError, StorageResult, Transaction};

/// Creates engines for the contract suite.
pub trait TestHarness {
    /// The storage engine type being tested.
    type Engine: StorageEngine;

    /// Create a fresh, empty engine.
    fn create_engine() -> StorageResult<Self::Engine>;
}

/// Run the contract suite against a harness.
pub fn run_test_suite<H: TestHarness>() {
    test_basic_operations::<H>();
    test_snapshot_isolation::<H>();
    test_cursor_operations::<H>();
    test_range_scan::<H>();
    test_dropped_write_is_discarded::<H>();
    test_read_only_enforcement::<H>();
}

fn test_basic_operations<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("nodes", b"n1", b"student").expect("failed to put");
        tx.put("nodes", b"n2", b"course").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        assert!(tx.delete("nodes", b"n2").expect("failed to delete"));
        assert!(!tx.delete("nodes", b"missing").expect("failed to delete"));
        tx.put("nodes", b"n1", b"instructor").expect("failed to overwrite");
        tx.commit().expect("failed to commit");
    }

    let tx = engine.begin_read().expect("failed to begin read");
    assert_eq!(tx.get("nodes", b"n1").expect("failed to get"), Some(b"instructor".to_vec()));
    assert_eq!(tx.get("nodes", b"n2").expect("failed to get"), None);
}

fn test_snapshot_isolation<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("metadata", b"version", b"1").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    let snapshot = engine.begin_read().expect("failed to begin read");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("metadata", b"version", b"2").expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    assert_eq!(snapshot.get("metadata", b"version").expect("failed to get"), Some(b"1".to_vec()));

    let fresh = engine.begin_read().expect("failed to begin read");
    assert_eq!(fresh.get("metadata", b"version").expect("failed to get"), Some(b"2".to_vec()));
}

fn test_cursor_operations<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        for (k, v) in [(b"a", b"1"), (b"b", b"2"), (b"c", b"3"), (b"d", b"4"), (b"e", b"5")] {
            tx.put("letters", k, v).expect("failed to put");
        }
        tx.commit().expect("failed to commit");
    }

    let tx = engine.begin_read().expect("failed to begin read");
    let mut cursor = tx.cursor("letters").expect("failed to create cursor");

    assert_eq!(cursor.seek_first().expect("seek_first"), Some((b"a".to_vec(), b"1".to_vec())));
    assert_eq!(cursor.next().expect("next"), Some((b"b".to_vec(), b"2".to_vec())));
    assert_eq!(cursor.current(), Some((b"b".as_slice(), b"2".as_slice())));
    assert_eq!(cursor.seek(b"bb").expect("seek"), Some((b"c".to_vec(), b"3".to_vec())));
    assert_eq!(cursor.seek_last().expect("seek_last"), Some((b"e".to_vec(), b"5".to_vec())));
    assert_eq!(cursor.prev().expect("prev"), Some((b"d".to_vec(), b"4".to_vec())));

    cursor.seek_last().expect("seek_last");
    assert_eq!(cursor.next().expect("next"), None);
    assert_eq!(cursor.current(), None);
}

fn test_range_scan<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        for i in 0..10u8 {
            tx.put("numbers", &[i], &[i * 10]).expect("failed to put");
        }
        tx.put("numbers_other", &[4], &[0]).expect("failed to put");
        tx.commit().expect("failed to commit");
    }

    let tx = engine.begin_read().expect("failed to begin read");

    let mut cursor = tx
        .range("numbers", Bound::Included(&[3u8] as &[u8]), Bound::Excluded(&[7u8] as &[u8]))
        .expect("failed to create range cursor");
    let mut bounded = Vec::new();
    while let Some((k, v)) = cursor.next().expect("next") {
        bounded.push((k[0], v[0]));
    }
    assert_eq!(bounded, vec![(3, 30), (4, 40), (5, 50), (6, 60)]);

    let mut cursor = tx
        .range("numbers", Bound::Excluded(&[7u8] as &[u8]), Bound::Unbounded)
        .expect("failed to create range cursor");
    let mut tail = Vec::new();
    while let Some((k, _)) = cursor.next().expect("next") {
        tail.push(k[0]);
    }
    assert_eq!(tail, vec![8, 9]);

    let mut cursor = tx
        .range("numbers", Bound::Included(&[5u8] as &[u8]), Bound::Included(&[2u8] as &[u8]))
        .expect("failed to create range cursor");
    assert_eq!(cursor.next().expect("next"), None);
}

fn test_dropped_write_is_discarded<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("edges", b"e1", b"enrolled").expect("failed to put");
        // dropped without commit
    }

    {
        let mut tx = engine.begin_write().expect("failed to begin write");
        tx.put("edges", b"e2", b"teaches").expect("failed to put");
        tx.rollback().expect("failed to rollback");
    }

    let tx = engine.begin_read().expect("failed to begin read");
    assert_eq!(tx.get("edges", b"e1").expect("failed to get"), None);
    assert_eq!(tx.get("edges", b"e2").expect("failed to get"), None);
}

fn test_read_only_enforcement<H: TestHarness>() {
    let engine = H::create_engine().expect("failed to create engine");

    let mut tx = engine.begin_read().expect("failed to begin read");
    assert!(tx.is_read_only());
    assert!(matches!(tx.put("nodes", b"k", b"v"), Err(StorageError::ReadOnly)));
    assert!(matches!(tx.delete("nodes", b"k"), Err(StorageError::ReadOnly)));

    let tx = engine.begin_write().expect("failed to begin write");
    assert!(!tx.is_read_only());
    tx.rollback().expect("failed to rollback");
}

#[test]
fn storage_error_is_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<StorageError>();
}
