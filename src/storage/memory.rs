//! In-memory message store
//!
//! Process-local implementation of [`MessageStore`] used by tests and by
//! single-process setups. A `BTreeMap` keeps keys sorted, so prefix
//! listings come out in the same lexicographic order a directory listing
//! would.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::MessageStore;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored, across all prefixes
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }
}

impl MessageStore for MemoryStore {
    fn write(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let mut entries = self.entries.write().unwrap();
        if entries.contains_key(key) {
            return Err(StorageError::KeyExists {
                key: key.to_string(),
            });
        }
        entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        Ok(self.entries.write().unwrap().remove(key).is_some())
    }

    fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
