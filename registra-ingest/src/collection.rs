//! Document collections — the storage seam under the upsert primitive.
//!
//! A [`Collection`] holds JSON documents and answers find/insert/delete
//! under a [`RecordKey`]. The trait offers no transactions; the upsert
//! protocol's lookup, delete, and insert are three separate calls, and the
//! window between them is a documented property of the system, not
//! something a backend is expected to close.
//!
//! Two backends ship here: [`MemoryCollection`] for tests and embedding,
//! and [`FsCollection`], which keeps one JSON file per document and backs
//! the CLI.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use registra_core::ResourceRecord;

use crate::error::{io_err, StoreError};

// ---------------------------------------------------------------------------
// Record key
// ---------------------------------------------------------------------------

/// Uniqueness key into a collection: a document id, optionally narrowed to
/// one version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RecordKey {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl RecordKey {
    /// Key matching every document with the given id.
    pub fn id(id: impl Into<String>) -> RecordKey {
        RecordKey {
            id: id.into(),
            version: None,
        }
    }

    /// Key matching the single document with the given id and version.
    pub fn versioned(id: impl Into<String>, version: impl Into<String>) -> RecordKey {
        RecordKey {
            id: id.into(),
            version: Some(version.into()),
        }
    }

    /// True if `doc` falls under this key.
    pub fn matches(&self, doc: &ResourceRecord) -> bool {
        if doc.id != self.id {
            return false;
        }
        match self.version.as_deref() {
            Some(v) => doc.version.as_deref() == Some(v),
            None => true,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version.as_deref() {
            Some(v) => write!(f, "{{id: {}, version: {}}}", self.id, v),
            None => write!(f, "{{id: {}}}", self.id),
        }
    }
}

// ---------------------------------------------------------------------------
// Collection trait
// ---------------------------------------------------------------------------

/// A named set of resource-record documents.
pub trait Collection: Send + Sync {
    /// The collection's name within its database.
    fn name(&self) -> &str;

    /// All documents matching `key`, in stable order.
    fn find(&self, key: &RecordKey) -> Result<Vec<ResourceRecord>, StoreError>;

    /// Add a document. No uniqueness is enforced here; callers go through
    /// the upsert primitive for that.
    fn insert(&self, doc: &ResourceRecord) -> Result<(), StoreError>;

    /// Remove every document matching `key`; returns how many went away.
    fn delete(&self, key: &RecordKey) -> Result<usize, StoreError>;
}

// ---------------------------------------------------------------------------
// Memory backend
// ---------------------------------------------------------------------------

/// In-process collection over a mutex-guarded vector.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    name: String,
    docs: Mutex<Vec<ResourceRecord>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> MemoryCollection {
        MemoryCollection {
            name: name.into(),
            docs: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of every stored document, in insertion order.
    pub fn documents(&self) -> Vec<ResourceRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ResourceRecord>> {
        self.docs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, key: &RecordKey) -> Result<Vec<ResourceRecord>, StoreError> {
        Ok(self
            .lock()
            .iter()
            .filter(|doc| key.matches(doc))
            .cloned()
            .collect())
    }

    fn insert(&self, doc: &ResourceRecord) -> Result<(), StoreError> {
        self.lock().push(doc.clone());
        Ok(())
    }

    fn delete(&self, key: &RecordKey) -> Result<usize, StoreError> {
        let mut docs = self.lock();
        let before = docs.len();
        docs.retain(|doc| !key.matches(doc));
        Ok(before - docs.len())
    }
}

// ---------------------------------------------------------------------------
// Filesystem backend
// ---------------------------------------------------------------------------

/// File-per-document collection under `<root>/<name>/`.
///
/// Document files are named from a sanitized form of the document id and
/// written with the `.tmp` + rename pattern, so a crashed write never
/// leaves a half-parsed document behind.
#[derive(Debug)]
pub struct FsCollection {
    name: String,
    dir: PathBuf,
}

impl FsCollection {
    /// Open the collection, creating its directory if needed.
    pub fn open(root: &Path, name: &str) -> Result<FsCollection, StoreError> {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        Ok(FsCollection {
            name: name.to_owned(),
            dir,
        })
    }

    /// Path of the document file for `id` — pure, no I/O.
    pub fn document_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_id(id)))
    }

    fn scan(&self) -> Result<Vec<(PathBuf, ResourceRecord)>, StoreError> {
        let mut entries: Vec<_> = std::fs::read_dir(&self.dir)
            .map_err(|e| io_err(&self.dir, e))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        entries.sort();

        let mut docs = Vec::new();
        for path in entries {
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            let doc = serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                path: path.clone(),
                source: e,
            })?;
            docs.push((path, doc));
        }
        Ok(docs)
    }
}

impl Collection for FsCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, key: &RecordKey) -> Result<Vec<ResourceRecord>, StoreError> {
        Ok(self
            .scan()?
            .into_iter()
            .map(|(_, doc)| doc)
            .filter(|doc| key.matches(doc))
            .collect())
    }

    fn insert(&self, doc: &ResourceRecord) -> Result<(), StoreError> {
        let path = self.document_path(&doc.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(doc)?;
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
        Ok(())
    }

    fn delete(&self, key: &RecordKey) -> Result<usize, StoreError> {
        let mut removed = 0;
        for (path, doc) in self.scan()? {
            if key.matches(&doc) {
                std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Flatten an identifier into a filename stem. Identifier alphabets in use
/// here (ARK-style ids plus the `/pdr:v/` extensions) stay distinct.
fn sanitize_id(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
