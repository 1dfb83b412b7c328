//! Error types for registra-synth.

use thiserror::Error;

/// All errors that can arise while deriving renditions from a record.
///
/// Every variant is detected before any storage I/O happens.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The input record carries no persistent identifier.
    #[error("record has no id")]
    MissingId,

    /// The input is itself a release collection; renditions derive only
    /// from resource records.
    #[error("record '{id}' is a release collection, not a resource")]
    ReleaseCollection { id: String },

    /// A field could not be migrated to the current conventions.
    #[error("cannot normalize '{field}' on record '{id}': {message}")]
    Normalize {
        id: String,
        field: String,
        message: String,
    },
}
