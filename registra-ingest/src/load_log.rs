//! Per-attempt result tracking for ingests.
//!
//! Errors accumulate here instead of escaping the `ingest` boundary, so a
//! batch of many records processes with per-record failure isolation.
//! Partial success is a first-class state: a snapshot written while the
//! derived views decline a stale update shows up as one `Written` and two
//! `Skipped` results, none of them failures.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::collection::RecordKey;
use crate::error::IngestError;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// What happened to one write attempt.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The document went into its collection.
    Written,
    /// The policy kept the stored document; not an error.
    Skipped,
    /// The attempt failed; nothing was written for it.
    Failed(Vec<IngestError>),
}

/// One write attempt against one collection.
#[derive(Debug)]
pub struct LoadResult {
    pub key: RecordKey,
    /// Collection attempted, absent when the attempt died before any
    /// collection was chosen (synthesis or input errors).
    pub collection: Option<String>,
    pub outcome: LoadOutcome,
    pub at: DateTime<Utc>,
}

impl LoadResult {
    /// True unless the attempt failed.
    pub fn successful(&self) -> bool {
        !matches!(self.outcome, LoadOutcome::Failed(_))
    }

    pub fn errors(&self) -> &[IngestError] {
        match &self.outcome {
            LoadOutcome::Failed(errs) => errs,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Log
// ---------------------------------------------------------------------------

/// Accumulated results of one or more ingest attempts.
///
/// Attempts against the same key accumulate; a key can appear as both
/// succeeded and failed when it was attempted more than once.
#[derive(Debug, Default)]
pub struct LoadLog {
    description: Option<String>,
    results: Vec<LoadResult>,
}

impl LoadLog {
    pub fn new(description: impl Into<String>) -> LoadLog {
        LoadLog {
            description: Some(description.into()),
            results: Vec::new(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn results(&self) -> &[LoadResult] {
        &self.results
    }

    /// Number of write attempts recorded, successful or failed.
    pub fn attempt_count(&self) -> usize {
        self.results.len()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.successful()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.successful()).count()
    }

    /// True if any attempt against `key` succeeded.
    pub fn succeeded(&self, key: &RecordKey) -> bool {
        self.results.iter().any(|r| &r.key == key && r.successful())
    }

    /// True if any attempt against `key` failed.
    pub fn failed(&self, key: &RecordKey) -> bool {
        self.results.iter().any(|r| &r.key == key && !r.successful())
    }

    /// The failed results, optionally narrowed to one key.
    pub fn failures(&self, key: Option<&RecordKey>) -> Vec<&LoadResult> {
        self.results
            .iter()
            .filter(|r| !r.successful())
            .filter(|r| key.map_or(true, |k| &r.key == k))
            .collect()
    }

    pub fn add_written(&mut self, key: RecordKey, collection: &str) {
        self.push(key, Some(collection.to_owned()), LoadOutcome::Written);
    }

    pub fn add_skipped(&mut self, key: RecordKey, collection: &str) {
        self.push(key, Some(collection.to_owned()), LoadOutcome::Skipped);
    }

    pub fn add_failure(
        &mut self,
        key: RecordKey,
        collection: Option<&str>,
        errors: Vec<IngestError>,
    ) {
        self.push(key, collection.map(str::to_owned), LoadOutcome::Failed(errors));
    }

    fn push(&mut self, key: RecordKey, collection: Option<String>, outcome: LoadOutcome) {
        self.results.push(LoadResult {
            key,
            collection,
            outcome,
            at: Utc::now(),
        });
    }

    /// Fold another log's results into this one.
    pub fn merge(&mut self, other: LoadLog) {
        self.results.extend(other.results);
    }
}

impl fmt::Display for LoadLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempted, {} succeeded, {} failed",
            self.attempt_count(),
            self.success_count(),
            self.failure_count()
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
