//! Directory-backed key-value store.
//!
//! Layout: `<root>/<key>` — one UTF-8 file per key. Keys are restricted to
//! a filesystem-safe alphabet so the key itself can serve as the filename.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::kv::KeyValueStore;

/// Key-value store persisting each key as a file under a root directory.
pub struct DirKeyValueStore {
    root: PathBuf,
}

impl DirKeyValueStore {
    /// Create a store rooted at `root`. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened state directory");
        Ok(Self { root })
    }

    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !safe {
            return Err(StorageError::Backend(format!(
                "key '{key}' is not filesystem-safe"
            )));
        }
        Ok(self.root.join(key))
    }
}

impl KeyValueStore for DirKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                let text = String::from_utf8(bytes).map_err(|_| StorageError::Corrupt {
                    key: key.to_string(),
                })?;
                Ok(Some(text))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;

        // Atomic write: write to temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&path).map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, DirKeyValueStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DirKeyValueStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_roundtrip() {
        let (_dir, store) = make_store();
        store.set("oxmon.test.v1", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("oxmon.test.v1").unwrap(),
            Some("{\"a\":1}".to_string())
        );
    }

    #[test]
    fn test_missing_key_reads_none() {
        let (_dir, store) = make_store();
        assert_eq!(store.get("absent.v1").unwrap(), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, store) = make_store();
        store.set("k.v1", "x").unwrap();
        store.remove("k.v1").unwrap();
        store.remove("k.v1").unwrap();
        assert_eq!(store.get("k.v1").unwrap(), None);
    }

    #[test]
    fn test_unsafe_key_rejected() {
        let (_dir, store) = make_store();
        assert!(store.set("../escape", "x").is_err());
        assert!(store.set("", "x").is_err());
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let (_dir, store) = make_store();
        store.set("k.v1", "old").unwrap();
        store.set("k.v1", "new").unwrap();
        assert_eq!(store.get("k.v1").unwrap(), Some("new".to_string()));
    }
}
