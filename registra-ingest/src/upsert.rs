//! Conditional upsert — insert-or-replace under a uniqueness key and an
//! update policy.
//!
//! ## `put` — protocol
//!
//! 1. Look up existing documents under the key.
//! 2. More than one match is a fatal database-state error.
//! 3. No match: insert, report written.
//! 4. One match: consult the policy; a decline reports not-written.
//! 5. Replace is delete-then-insert. The two steps are not atomic; a
//!    delete that removes nothing after a successful lookup means a
//!    concurrent writer got there first, and is fatal.
//!
//! Nothing here retries; every failure surfaces to the caller once.

use std::sync::Arc;

use registra_core::ResourceRecord;

use crate::collection::{Collection, RecordKey};
use crate::error::{IngestError, StoreError};

// ---------------------------------------------------------------------------
// Update policy
// ---------------------------------------------------------------------------

/// What to do when a `put` finds a document already stored under its key.
pub enum UpdatePolicy {
    /// Replace whatever is stored.
    Replace,
    /// Fail the write; the collection does not accept updates.
    RejectUpdates,
    /// Replace only when the predicate accepts `(existing, incoming)`.
    ReplaceIf(Box<dyn Fn(&ResourceRecord, &ResourceRecord) -> bool + Send + Sync>),
}

impl std::fmt::Debug for UpdatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdatePolicy::Replace => f.write_str("Replace"),
            UpdatePolicy::RejectUpdates => f.write_str("RejectUpdates"),
            UpdatePolicy::ReplaceIf(_) => f.write_str("ReplaceIf(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Keyed write primitive over one collection.
pub struct ConditionalUpsertStore {
    collection: Arc<dyn Collection>,
}

impl ConditionalUpsertStore {
    pub fn new(collection: Arc<dyn Collection>) -> ConditionalUpsertStore {
        ConditionalUpsertStore { collection }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    /// Write `doc` under `key` per `policy`. Returns whether the document
    /// was written; a policy decline is `Ok(false)`, not an error.
    pub fn put(
        &self,
        doc: &ResourceRecord,
        key: &RecordKey,
        policy: &UpdatePolicy,
    ) -> Result<bool, IngestError> {
        let existing = self.collection.find(key).map_err(|e| self.store_err(e))?;
        if existing.len() > 1 {
            return Err(IngestError::DatabaseState {
                collection: self.collection.name().to_owned(),
                key: key.clone(),
                count: existing.len(),
            });
        }

        if let Some(previous) = existing.first() {
            let replace = match policy {
                UpdatePolicy::Replace => true,
                UpdatePolicy::RejectUpdates => {
                    return Err(IngestError::UpdateRejected {
                        collection: self.collection.name().to_owned(),
                        key: key.clone(),
                    })
                }
                UpdatePolicy::ReplaceIf(should_replace) => should_replace(previous, doc),
            };
            if !replace {
                tracing::debug!(
                    "keeping stored document in '{}' for {key}",
                    self.collection.name()
                );
                return Ok(false);
            }

            let removed = self.collection.delete(key).map_err(|e| self.store_err(e))?;
            if removed == 0 {
                return Err(IngestError::LostUpdate {
                    collection: self.collection.name().to_owned(),
                    key: key.clone(),
                });
            }
        }

        self.collection.insert(doc).map_err(|e| self.store_err(e))?;
        tracing::debug!("wrote document to '{}' for {key}", self.collection.name());
        Ok(true)
    }

    fn store_err(&self, source: StoreError) -> IngestError {
        IngestError::Store {
            collection: self.collection.name().to_owned(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
