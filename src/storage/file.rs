//! File-backed message store
//!
//! Persists each key as one file under a shared root directory, which is
//! how two processes sharing a container directory exchange messages.
//! A key `updates/0000000001` becomes `<root>/updates/0000000001`;
//! directory listings provide the stable lexicographic ordering the
//! queue layer derives sequence order from.
//!
//! Writes are published atomically: the payload is staged under a
//! dotted name first and only linked to the final key once fully on
//! disk, so another process can never list or read a half-written
//! message. Dotted names are reserved for staging and never appear in
//! `list_keys` output.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::MessageStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Distinguishes staging files written concurrently by one process
static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Message store backed by a directory of files
///
/// The root directory is created lazily on first write. All processes
/// that should see each other's messages must be constructed over the
/// same root.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store over `root`
    ///
    /// The directory does not need to exist yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to its on-disk path
    fn path_for(&self, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        for component in key.split('/') {
            path.push(component);
        }
        path
    }

    /// Split a prefix into the directory to list and a file-name prefix
    ///
    /// `updates/` lists the `updates` directory with no name filter;
    /// `updates/00000001` lists it filtered to names starting with
    /// `00000001`.
    fn split_prefix<'a>(&self, prefix: &'a str) -> (PathBuf, &'a str, &'a str) {
        match prefix.rfind('/') {
            Some(idx) => {
                let dir_part = &prefix[..idx];
                let name_part = &prefix[idx + 1..];
                let mut dir = self.root.clone();
                for component in dir_part.split('/') {
                    dir.push(component);
                }
                (dir, &prefix[..idx + 1], name_part)
            }
            None => (self.root.clone(), "", prefix),
        }
    }
}

impl MessageStore for FileStore {
    fn write(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.path_for(key);
        let parent = match path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => self.root.clone(),
        };

        fs::create_dir_all(&parent).map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        // Stage under a dotted name. A half-written payload must never
        // be enumerable as a message by another process.
        let staging = parent.join(format!(
            ".staging-{}-{}",
            std::process::id(),
            STAGING_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        if let Err(e) = fs::write(&staging, bytes) {
            let _ = fs::remove_file(&staging);
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            });
        }

        // Publish in one step. hard_link fails if the key is taken,
        // which preserves the create-new contract.
        let published = match fs::hard_link(&staging, &path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StorageError::KeyExists {
                key: key.to_string(),
            }),
            Err(e) => Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            }),
        };
        let _ = fs::remove_file(&staging);
        published
    }

    fn read(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::DeleteFailed {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let (dir, key_prefix, name_prefix) = self.split_prefix(prefix);

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::ListFailed {
                    prefix: prefix.to_string(),
                    message: e.to_string(),
                })
            }
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::ListFailed {
                prefix: prefix.to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                // Dotted names are staging files, not messages.
                if name.starts_with('.') {
                    continue;
                }
                if name.starts_with(name_prefix) {
                    keys.push(format!("{}{}", key_prefix, name));
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}
