//! FileStore - JSON ファイル 1 つに全エントリを保存する KeyValueStore
//!
//! Every mutation rewrites the whole document with the write-to-temp-then-rename
//! pattern:
//! 1. Write to `<path>.tmp`
//! 2. fsync the temp file
//! 3. Rename to `<path>`
//! 4. fsync the parent directory
//!
//! A crash at any point leaves either the old or the new document on disk,
//! never a partial one.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::domain::StoreError;
use crate::ports::KeyValueStore;

/// File-backed store.
///
/// The document is a flat JSON object. Values written by this store are
/// strings; any other JSON value found under a key is reported as corrupt.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// # Errors
    /// - the file exists but cannot be read
    /// - the file is not a JSON object
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries: BTreeMap<String, Value> = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened file store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` to a copy, persist it, then swap it in.
    ///
    /// The in-memory view only changes once the new document is on disk.
    fn mutate(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, Value>),
    ) -> Result<(), StoreError> {
        let mut guard = self.entries();
        let mut next = guard.clone();
        change(&mut next);
        save_atomic(&self.path, &next)?;
        *guard = next;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), Value::String(value.to_string()));
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entries().get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(StoreError::Corrupt {
                key: key.to_string(),
                reason: format!("expected a string, found {other}"),
            }),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        if !self.entries().contains_key(key) {
            return Ok(());
        }
        self.mutate(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries().keys().cloned().collect())
    }
}

fn save_atomic(path: &Path, entries: &BTreeMap<String, Value>) -> Result<(), StoreError> {
    if let Some(parent) = non_empty_parent(path) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec(entries)?;

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }

    std::fs::rename(&tmp_path, path)?;

    if let Some(parent) = non_empty_parent(path) {
        fsync_dir(parent)?;
    }
    Ok(())
}

/// `Path::parent` returns `Some("")` for bare file names.
fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn fsync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.put("payload-1", r#"{"a":1}"#).unwrap();
            store.put("payload-2", r#"{"b":2}"#).unwrap();
            store.remove("payload-1").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["payload-2"]);
        assert_eq!(
            reopened.get("payload-2").unwrap().as_deref(),
            Some(r#"{"b":2}"#)
        );
    }

    #[test]
    fn temp_file_is_cleaned_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.put("payload-1", "x").unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.put("payload-1", "x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn non_string_value_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"payload-1": 42, "payload-2": "ok"}"#).unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(matches!(
            store.get("payload-1"),
            Err(StoreError::Corrupt { key, .. }) if key == "payload-1"
        ));
        assert_eq!(store.get("payload-2").unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn unparseable_document_fails_to_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Serde(_))));
    }

    #[test]
    fn removing_missing_key_does_not_touch_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.remove("payload-nope").unwrap();
        assert!(!path.exists());
    }
}
