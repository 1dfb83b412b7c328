//! Error types for registra-ingest.

use std::path::PathBuf;

use thiserror::Error;

use registra_synth::SynthesisError;

use crate::collection::RecordKey;
use crate::validate::ValidationIssue;

/// Failures raised by a collection backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored document that no longer parses.
    #[error("unreadable document at {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error on write.
    #[error("document JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

/// All errors that one ingest attempt can accumulate.
///
/// These are recorded in the [`LoadLog`](crate::LoadLog) rather than
/// returned from `ingest`; none of them triggers a retry.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A unique-key lookup matched more than one stored document. The
    /// uniqueness invariant was already violated upstream; nothing is
    /// written.
    #[error("unique key query returned {count} documents in '{collection}' for {key}")]
    DatabaseState {
        collection: String,
        key: RecordKey,
        count: usize,
    },

    /// The policy forbids replacing an existing document.
    #[error("existing document in '{collection}' with key {key}; updates not allowed")]
    UpdateRejected { collection: String, key: RecordKey },

    /// A document that was just looked up vanished before its replacement
    /// could be deleted — a lost-update race with a concurrent writer.
    #[error("document in '{collection}' with key {key} vanished before replacement")]
    LostUpdate { collection: String, key: RecordKey },

    /// A backend failure, wrapped with the collection it came from.
    #[error("storage failure in '{collection}': {source}")]
    Store {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// Rendition synthesis rejected the input before any I/O.
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// One structural-validation finding; validation gates all writes.
    #[error("validation: {0}")]
    Validation(ValidationIssue),

    /// A record whose version is an empty string cannot be keyed.
    #[error("record version may not be empty")]
    EmptyVersion,

    /// A batch input file that could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A batch input file that is not valid JSON for a resource record.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
