//! Ingest orchestration — synthesis plus three conditional upserts.
//!
//! ## `ingest` — protocol
//!
//! 1. Derive the three renditions; a synthesis failure is logged against
//!    the best-available key and ends the attempt.
//! 2. Key the attempt by the snapshot's `(id, version)` pair.
//! 3. Validate the snapshot when asked; findings gate every write.
//! 4. Write the snapshot into `versions` (always replace). On failure,
//!    stop — the derived views must not get ahead of the snapshot.
//! 5. Write `record` and `releasesets` independently under the
//!    newer-or-equal-version policy; neither blocks nor rolls back the
//!    other, and nothing rolls back step 4.
//!
//! The three writes are not atomic across collections, and concurrent
//! ingests of the same resource are not serialized; the stored state is
//! best-effort by design.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use registra_core::{cmp_versions, ResourceRecord};
use registra_synth::{EndpointConfig, RenditionSynthesizer};

use crate::collection::{Collection, FsCollection, MemoryCollection, RecordKey};
use crate::error::{IngestError, StoreError};
use crate::load_log::LoadLog;
use crate::upsert::{ConditionalUpsertStore, UpdatePolicy};
use crate::validate::StructuralValidator;

/// Collection holding the latest view of each resource.
pub const LATEST_COLLECTION: &str = "record";
/// Collection holding one immutable snapshot per resource version.
pub const VERSIONS_COLLECTION: &str = "versions";
/// Collection holding the aggregated release history per resource.
pub const RELEASES_COLLECTION: &str = "releasesets";

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Synthesizes renditions of incoming records and keeps the three
/// collections in step.
pub struct IngestEngine {
    latest: ConditionalUpsertStore,
    versions: ConditionalUpsertStore,
    releases: ConditionalUpsertStore,
    synthesizer: RenditionSynthesizer,
    validator: Option<Box<dyn StructuralValidator>>,
    default_schema: Option<String>,
}

/// Handles onto the memory-backed collections of [`IngestEngine::in_memory`],
/// for inspecting stored state.
pub struct MemoryCollections {
    pub latest: Arc<MemoryCollection>,
    pub versions: Arc<MemoryCollection>,
    pub releases: Arc<MemoryCollection>,
}

impl IngestEngine {
    /// Build an engine over any three collection handles.
    pub fn new(
        latest: Arc<dyn Collection>,
        versions: Arc<dyn Collection>,
        releases: Arc<dyn Collection>,
        synthesizer: RenditionSynthesizer,
    ) -> IngestEngine {
        IngestEngine {
            latest: ConditionalUpsertStore::new(latest),
            versions: ConditionalUpsertStore::new(versions),
            releases: ConditionalUpsertStore::new(releases),
            synthesizer,
            validator: None,
            default_schema: None,
        }
    }

    /// Engine over fresh in-memory collections; returns the collection
    /// handles alongside it.
    pub fn in_memory(config: EndpointConfig) -> (IngestEngine, MemoryCollections) {
        let handles = MemoryCollections {
            latest: Arc::new(MemoryCollection::new(LATEST_COLLECTION)),
            versions: Arc::new(MemoryCollection::new(VERSIONS_COLLECTION)),
            releases: Arc::new(MemoryCollection::new(RELEASES_COLLECTION)),
        };
        let engine = IngestEngine::new(
            handles.latest.clone(),
            handles.versions.clone(),
            handles.releases.clone(),
            RenditionSynthesizer::new(config),
        );
        (engine, handles)
    }

    /// Engine over file-backed collections rooted at `root`.
    pub fn at_dir(root: &Path, config: EndpointConfig) -> Result<IngestEngine, StoreError> {
        Ok(IngestEngine::new(
            Arc::new(FsCollection::open(root, LATEST_COLLECTION)?),
            Arc::new(FsCollection::open(root, VERSIONS_COLLECTION)?),
            Arc::new(FsCollection::open(root, RELEASES_COLLECTION)?),
            RenditionSynthesizer::new(config),
        ))
    }

    /// Install a structural validator to gate writes when `ingest` is
    /// called with `validate = true`.
    pub fn with_validator(mut self, validator: Box<dyn StructuralValidator>) -> IngestEngine {
        self.validator = Some(validator);
        self
    }

    /// Schema URI assumed for records that carry no `_schema`.
    pub fn with_default_schema(mut self, uri: impl Into<String>) -> IngestEngine {
        self.default_schema = Some(uri.into());
        self
    }

    /// Ingest one canonical record, returning the per-attempt results.
    ///
    /// Never returns `Err`; callers inspect the log, where partial success
    /// (snapshot written, derived views skipped) is representable.
    pub fn ingest(&self, input: &ResourceRecord, validate: bool) -> LoadLog {
        let mut log = LoadLog::new("dataset resources");
        self.ingest_into(input, validate, &mut log);
        log
    }

    /// Ingest one record, accumulating results into an existing log.
    pub fn ingest_into(&self, input: &ResourceRecord, validate: bool, log: &mut LoadLog) {
        let renditions = match self.synthesizer.synthesize(input) {
            Ok(r) => r,
            Err(err) => {
                let id = if input.id.is_empty() {
                    "?"
                } else {
                    input.id.as_str()
                };
                tracing::warn!("rejecting record '{id}': {err}");
                log.add_failure(RecordKey::id(id), None, vec![err.into()]);
                return;
            }
        };

        let version_value = renditions.version.version.clone().unwrap_or_default();
        let key = RecordKey::versioned(&renditions.version.id, &version_value);
        if version_value.is_empty() {
            log.add_failure(key, Some(VERSIONS_COLLECTION), vec![IngestError::EmptyVersion]);
            return;
        }

        if validate {
            if let Some(validator) = self.validator.as_deref() {
                let schema_uri = renditions
                    .version
                    .schema
                    .as_deref()
                    .or(self.default_schema.as_deref());
                let issues = validator.validate(&renditions.version, schema_uri);
                if !issues.is_empty() {
                    tracing::warn!("validation blocked {key}: {} finding(s)", issues.len());
                    log.add_failure(
                        key,
                        Some(VERSIONS_COLLECTION),
                        issues.into_iter().map(IngestError::Validation).collect(),
                    );
                    return;
                }
            }
        }

        // The snapshot goes first; the derived views only get written once
        // it is safely stored.
        match self
            .versions
            .put(&renditions.version, &key, &UpdatePolicy::Replace)
        {
            Ok(true) => log.add_written(key.clone(), VERSIONS_COLLECTION),
            Ok(false) => log.add_skipped(key.clone(), VERSIONS_COLLECTION),
            Err(err) => {
                tracing::warn!("snapshot write failed for {key}: {err}");
                log.add_failure(key, Some(VERSIONS_COLLECTION), vec![err]);
                return;
            }
        }

        // Derived views accept the write only when the incoming version is
        // at least the stored one. The two attempts are independent.
        let if_newer = UpdatePolicy::ReplaceIf(Box::new(newer_or_equal));

        let latest_key = RecordKey::id(&renditions.record.id);
        match self.latest.put(&renditions.record, &latest_key, &if_newer) {
            Ok(true) => log.add_written(key.clone(), LATEST_COLLECTION),
            Ok(false) => log.add_skipped(key.clone(), LATEST_COLLECTION),
            Err(err) => {
                tracing::warn!("latest write failed for {key}: {err}");
                log.add_failure(key.clone(), Some(LATEST_COLLECTION), vec![err]);
            }
        }

        let release_key = RecordKey::id(&renditions.release_set.id);
        match self
            .releases
            .put(&renditions.release_set, &release_key, &if_newer)
        {
            Ok(true) => log.add_written(key, RELEASES_COLLECTION),
            Ok(false) => log.add_skipped(key, RELEASES_COLLECTION),
            Err(err) => {
                tracing::warn!("release-set write failed for {key}: {err}");
                log.add_failure(key, Some(RELEASES_COLLECTION), vec![err]);
            }
        }
    }
}

/// Supersede policy for the derived views: accept when the incoming
/// version is newer than or equal to the stored one. Absent versions count
/// as `1.0.0`, matching the synthesis default. An incoming document
/// identical to the stored one is declined — there is nothing to rewrite.
fn newer_or_equal(existing: &ResourceRecord, incoming: &ResourceRecord) -> bool {
    if incoming == existing {
        return false;
    }
    let stored = existing.version.as_deref().unwrap_or("1.0.0");
    let new = incoming.version.as_deref().unwrap_or("1.0.0");
    cmp_versions(new, stored) != Ordering::Less
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(version: &str) -> ResourceRecord {
        serde_json::from_value(json!({"id": "R1", "version": version})).expect("doc")
    }

    #[test]
    fn newer_or_equal_accepts_equal_and_newer() {
        let mut same_version = doc("1.0.0");
        same_version.title = Some("revised".into());
        assert!(newer_or_equal(&doc("1.0.0"), &same_version));
        assert!(newer_or_equal(&doc("1.0.0"), &doc("1.0.1")));
        assert!(!newer_or_equal(&doc("2.0.0"), &doc("1.9.9")));
    }

    #[test]
    fn identical_documents_are_declined() {
        assert!(!newer_or_equal(&doc("1.0.0"), &doc("1.0.0")));
    }

    #[test]
    fn absent_versions_default_for_comparison() {
        let unversioned: ResourceRecord =
            serde_json::from_value(json!({"id": "R1"})).expect("doc");
        assert!(newer_or_equal(&unversioned, &doc("1.0.0")));
        assert!(!newer_or_equal(&doc("1.0.1"), &unversioned));
    }
}
