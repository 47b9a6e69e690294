//!
//! turfbook storage module
//! -----------------------
//! This module implements the on-disk document store for turfbook using a flat
//! layout: one JSON file per collection under a configured root folder, each
//! holding an array of documents. The server only ever needs equality-predicate
//! point lookups (`find_one`/`find_all`) and atomic single-document inserts, so
//! a whole-file rewrite through a temp file is sufficient: readers always see
//! either the previous array or the new one, never a torn write.
//!
//! The public API centers around the `Store` type, which is wrapped in a
//! thread-safe `SharedStore` (`Arc<RwLock<Store>>`) and injected explicitly
//! into the identity components and HTTP handlers.

use std::{fs, path::{Path, PathBuf}};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt collection '{collection}': {source}")]
    Corrupt {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("collection '{0}' is not a JSON array")]
    NotAnArray(String),
    #[error("failed to encode collection '{collection}': {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// On-disk document store rooted at a folder, one `<collection>.json` file per
/// collection. Collections spring into existence on `create_collection` and a
/// missing file reads as an empty collection.
pub struct Store {
    /// Root folder for all collection files.
    root: PathBuf,
}

impl Store {
    /// Create a new Store rooted at the given filesystem path.
    /// The directory is created if it does not already exist.
    pub fn new<P: AsRef<Path>>(root: P) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Return the configured root folder for this Store.
    pub fn root_path(&self) -> &PathBuf { &self.root }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{}.json", collection))
    }

    /// Idempotent ensure-exists for a collection file.
    pub fn create_collection(&self, collection: &str) -> StoreResult<()> {
        let path = self.collection_path(collection);
        if !path.exists() {
            debug!(target: "turfbook::storage", "create_collection: initializing '{}'", collection);
            fs::write(&path, "[]")?;
        }
        Ok(())
    }

    fn read_collection(&self, collection: &str) -> StoreResult<Vec<Value>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            collection: collection.to_string(),
            source: e,
        })?;
        match value {
            Value::Array(docs) => Ok(docs),
            _ => Err(StoreError::NotAnArray(collection.to_string())),
        }
    }

    fn write_collection(&self, collection: &str, docs: &[Value]) -> StoreResult<()> {
        let path = self.collection_path(collection);
        let tmp = self.root.join(format!(".{}.json.tmp", collection));
        let encoded = serde_json::to_string_pretty(&docs).map_err(|e| StoreError::Encode {
            collection: collection.to_string(),
            source: e,
        })?;
        fs::write(&tmp, encoded)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Point lookup by equality on a top-level string field.
    pub fn find_one(&self, collection: &str, field: &str, value: &str) -> StoreResult<Option<Value>> {
        let docs = self.read_collection(collection)?;
        Ok(docs.into_iter().find(|d| d.get(field).and_then(|v| v.as_str()) == Some(value)))
    }

    /// All documents matching an equality predicate on a top-level string field.
    pub fn find_all(&self, collection: &str, field: &str, value: &str) -> StoreResult<Vec<Value>> {
        let docs = self.read_collection(collection)?;
        Ok(docs
            .into_iter()
            .filter(|d| d.get(field).and_then(|v| v.as_str()) == Some(value))
            .collect())
    }

    /// Append a single document. The rewrite goes through a temp file followed
    /// by rename, so the insert is atomic from any reader's point of view.
    pub fn insert_one(&self, collection: &str, doc: Value) -> StoreResult<()> {
        let mut docs = self.read_collection(collection)?;
        docs.push(doc);
        self.write_collection(collection, &docs)?;
        debug!(target: "turfbook::storage", "insert_one: '{}' now holds {} documents", collection, docs.len());
        Ok(())
    }

    /// Connectivity probe: the root folder must exist and be listable.
    pub fn ping(&self) -> StoreResult<()> {
        fs::read_dir(&self.root)?;
        Ok(())
    }
}

/// Thread-safe shared handle over `Store`. Cloned into the server state and
/// passed by reference into the identity components.
#[derive(Clone)]
pub struct SharedStore(pub Arc<RwLock<Store>>);

impl SharedStore {
    pub fn new<P: AsRef<Path>>(root: P) -> StoreResult<Self> {
        Ok(Self(Arc::new(RwLock::new(Store::new(root)?))))
    }

    pub fn create_collection(&self, collection: &str) -> StoreResult<()> {
        self.0.write().create_collection(collection)
    }

    pub fn find_one(&self, collection: &str, field: &str, value: &str) -> StoreResult<Option<Value>> {
        self.0.read().find_one(collection, field, value)
    }

    pub fn find_all(&self, collection: &str, field: &str, value: &str) -> StoreResult<Vec<Value>> {
        self.0.read().find_all(collection, field, value)
    }

    pub fn insert_one(&self, collection: &str, doc: Value) -> StoreResult<()> {
        self.0.write().insert_one(collection, doc)
    }

    pub fn ping(&self) -> StoreResult<()> {
        self.0.read().ping()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn insert_then_find_one_by_email() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path()).unwrap();
        store.create_collection("users").unwrap();
        store
            .insert_one("users", json!({"id": "1", "email": "a@x.com", "name": "A"}))
            .unwrap();
        store
            .insert_one("users", json!({"id": "2", "email": "b@x.com", "name": "B"}))
            .unwrap();

        let hit = store.find_one("users", "email", "b@x.com").unwrap().unwrap();
        assert_eq!(hit.get("id").and_then(|v| v.as_str()), Some("2"));
        assert!(store.find_one("users", "email", "c@x.com").unwrap().is_none());
    }

    #[test]
    fn find_all_filters_by_field() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path()).unwrap();
        store.insert_one("turfs", json!({"id": "t1", "owner_id": "o1"})).unwrap();
        store.insert_one("turfs", json!({"id": "t2", "owner_id": "o2"})).unwrap();
        store.insert_one("turfs", json!({"id": "t3", "owner_id": "o1"})).unwrap();

        let mine = store.find_all("turfs", "owner_id", "o1").unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[test]
    fn create_collection_is_idempotent() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path()).unwrap();
        store.create_collection("owners").unwrap();
        store.insert_one("owners", json!({"id": "1"})).unwrap();
        // Ensure-exists must not clobber data already present
        store.create_collection("owners").unwrap();
        assert_eq!(store.find_all("owners", "id", "1").unwrap().len(), 1);
    }

    #[test]
    fn missing_collection_reads_empty() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path()).unwrap();
        assert!(store.find_one("nowhere", "email", "x").unwrap().is_none());
        assert!(store.find_all("nowhere", "email", "x").unwrap().is_empty());
    }

    #[test]
    fn ping_checks_root() {
        let tmp = tempdir().unwrap();
        let store = Store::new(tmp.path().join("sub")).unwrap();
        store.ping().unwrap();
        std::fs::remove_dir_all(tmp.path().join("sub")).unwrap();
        assert!(store.ping().is_err());
    }
}
