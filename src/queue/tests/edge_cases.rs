//! Edge case tests for the queue store

use crate::queue::api::{QueueError, QueueStore};
use crate::storage::api::{MemoryStore, MessageStore, StorageError, StorageResult};
use std::sync::{Arc, Mutex};

/// Store wrapper that injects failures for chosen keys
struct FaultStore {
    inner: MemoryStore,
    unreadable: Mutex<Vec<String>>,
    writes_fail: Mutex<bool>,
}

impl FaultStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            unreadable: Mutex::new(Vec::new()),
            writes_fail: Mutex::new(false),
        }
    }

    fn make_unreadable(&self, key: &str) {
        self.unreadable.lock().unwrap().push(key.to_string());
    }

    fn heal(&self) {
        self.unreadable.lock().unwrap().clear();
    }

    fn fail_writes(&self, fail: bool) {
        *self.writes_fail.lock().unwrap() = fail;
    }
}

impl MessageStore for FaultStore {
    fn write(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        if *self.writes_fail.lock().unwrap() {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: "medium unavailable".to_string(),
            });
        }
        self.inner.write(key, bytes)
    }

    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        if self.unreadable.lock().unwrap().iter().any(|k| k == key) {
            return Err(StorageError::ReadFailed {
                key: key.to_string(),
                message: "injected read failure".to_string(),
            });
        }
        self.inner.read(key)
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        self.inner.delete(key)
    }

    fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list_keys(prefix)
    }
}

#[test]
fn test_foreign_keys_on_the_medium_are_ignored() {
    let store = Arc::new(MemoryStore::new());
    store.write("updates/not-a-sequence", b"junk").unwrap();

    let queue = QueueStore::new(Arc::clone(&store) as Arc<dyn MessageStore>);
    queue.append("updates", b"real").unwrap();

    assert_eq!(queue.queued_count("updates").unwrap(), 1);
    let messages = queue.drain_all("updates").unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].payload, b"real");

    // The foreign file is left alone, even by clear.
    queue.clear("updates").unwrap();
    assert!(store.read("updates/not-a-sequence").unwrap().is_some());
}

#[test]
fn test_append_failure_is_surfaced() {
    let store = Arc::new(FaultStore::new());
    let queue = QueueStore::new(Arc::clone(&store) as Arc<dyn MessageStore>);

    store.fail_writes(true);
    match queue.append("updates", b"x") {
        Err(QueueError::AppendFailed { identifier, .. }) => assert_eq!(identifier, "updates"),
        other => panic!("Expected AppendFailed, got {:?}", other),
    }

    // Nothing was persisted for the failed append.
    store.fail_writes(false);
    assert_eq!(queue.queued_count("updates").unwrap(), 0);
}

#[test]
fn test_unreadable_entry_ends_drain_early_and_recovers_in_order() {
    let store = Arc::new(FaultStore::new());
    let queue = QueueStore::new(Arc::clone(&store) as Arc<dyn MessageStore>);

    queue.append("updates", b"one").unwrap();
    queue.append("updates", b"two").unwrap();
    queue.append("updates", b"three").unwrap();
    store.make_unreadable("updates/0000000002");

    // The batch stops at the bad entry rather than skipping past it.
    let first = queue.drain_all("updates").unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].payload, b"one");

    // Once readable again, delivery resumes in sequence order.
    store.heal();
    let second = queue.drain_all("updates").unwrap();
    let payloads: Vec<&[u8]> = second.iter().map(|m| m.payload.as_slice()).collect();
    assert_eq!(payloads, vec![b"two".as_slice(), b"three"]);
}

#[test]
fn test_unreadable_entry_makes_poll_return_none() {
    let store = Arc::new(FaultStore::new());
    let queue = QueueStore::new(Arc::clone(&store) as Arc<dyn MessageStore>);

    queue.append("updates", b"one").unwrap();
    store.make_unreadable("updates/0000000001");

    assert!(queue.drain_one("updates").unwrap().is_none());

    store.heal();
    assert_eq!(queue.drain_one("updates").unwrap().unwrap().payload, b"one");
}

#[test]
fn test_empty_payloads_are_legal() {
    let queue = QueueStore::new(Arc::new(MemoryStore::new()) as Arc<dyn MessageStore>);

    queue.append("updates", b"").unwrap();
    let messages = queue.drain_all("updates").unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].payload.is_empty());
}
