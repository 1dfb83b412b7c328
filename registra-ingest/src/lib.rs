//! # registra-ingest
//!
//! Storage synchronization for dataset resource records.
//!
//! [`IngestEngine::ingest`] takes one canonical record, derives its three
//! renditions, and writes them into the `record`, `versions`, and
//! `releasesets` collections under a version-ordering supersede policy,
//! reporting every attempt in a [`LoadLog`].

pub mod batch;
pub mod collection;
pub mod engine;
pub mod error;
pub mod load_log;
pub mod upsert;
pub mod validate;

pub use collection::{Collection, FsCollection, MemoryCollection, RecordKey};
pub use engine::{
    IngestEngine, MemoryCollections, LATEST_COLLECTION, RELEASES_COLLECTION, VERSIONS_COLLECTION,
};
pub use error::{IngestError, StoreError};
pub use load_log::{LoadLog, LoadOutcome, LoadResult};
pub use upsert::{ConditionalUpsertStore, UpdatePolicy};
pub use validate::{RequiredFieldsValidator, StructuralValidator, ValidationIssue};
