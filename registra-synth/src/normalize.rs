//! Schema-normalization seam.
//!
//! Normalization upgrades an arbitrarily old record to the current schema
//! conventions before renditions are derived from it. Implementations must
//! be idempotent and preserve the meaning of `id` and `version`.

use registra_core::{ident, ReleaseHistory, ReleaseRef, ResourceRecord};

use crate::error::SynthesisError;

/// Upgrades a record to the current schema conventions.
pub trait SchemaNormalizer: Send + Sync {
    fn normalize(&self, record: ResourceRecord) -> Result<ResourceRecord, SynthesisError>;
}

/// Passes records through untouched, for inputs already in current form.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityNormalizer;

impl SchemaNormalizer for IdentityNormalizer {
    fn normalize(&self, record: ResourceRecord) -> Result<ResourceRecord, SynthesisError> {
        Ok(record)
    }
}

/// Default normalizer: migrates the deprecated top-level `versionHistory`
/// array into `releaseHistory.hasRelease`.
///
/// Records already carrying a `releaseHistory` keep it; `versionHistory` is
/// dropped either way, so a second pass is a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct LatestConventions;

const VERSION_HISTORY_FIELD: &str = "versionHistory";

impl SchemaNormalizer for LatestConventions {
    fn normalize(&self, mut record: ResourceRecord) -> Result<ResourceRecord, SynthesisError> {
        let Some(legacy) = record.extra.remove(VERSION_HISTORY_FIELD) else {
            return Ok(record);
        };
        if record.release_history.is_some() {
            return Ok(record);
        }

        let has_release: Vec<ReleaseRef> =
            serde_json::from_value(legacy).map_err(|e| SynthesisError::Normalize {
                id: record.id.clone(),
                field: VERSION_HISTORY_FIELD.to_owned(),
                message: e.to_string(),
            })?;

        let rid = ident::strip_version_ext(&record.id);
        record.release_history = Some(ReleaseHistory {
            id: Some(ident::release_set_id(rid)),
            has_release,
            ..Default::default()
        });
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy_record() -> ResourceRecord {
        serde_json::from_value(json!({
            "id": "R1",
            "version": "1.0.1",
            "versionHistory": [
                {"version": "1.0.0", "issued": "2020-01-01"},
                {"version": "1.0.1", "issued": "2020-06-01"}
            ]
        }))
        .expect("deserialize")
    }

    #[test]
    fn migrates_version_history_into_release_history() {
        let out = LatestConventions.normalize(legacy_record()).expect("normalize");
        assert!(out.extra.get("versionHistory").is_none());

        let hist = out.release_history.expect("release history");
        assert_eq!(hist.id.as_deref(), Some("R1/pdr:v"));
        assert_eq!(hist.has_release.len(), 2);
        assert_eq!(hist.has_release[0].version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = LatestConventions.normalize(legacy_record()).expect("first");
        let twice = LatestConventions.normalize(once.clone()).expect("second");
        assert_eq!(once, twice);
    }

    #[test]
    fn existing_release_history_wins_over_legacy_field() {
        let rec: ResourceRecord = serde_json::from_value(json!({
            "id": "R1",
            "releaseHistory": {"hasRelease": [{"version": "2.0.0"}]},
            "versionHistory": [{"version": "1.0.0"}]
        }))
        .expect("deserialize");

        let out = LatestConventions.normalize(rec).expect("normalize");
        assert!(out.extra.get("versionHistory").is_none());
        let hist = out.release_history.expect("release history");
        assert_eq!(hist.has_release.len(), 1);
        assert_eq!(hist.has_release[0].version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn malformed_legacy_history_is_a_normalize_error() {
        let rec: ResourceRecord = serde_json::from_value(json!({
            "id": "R1",
            "versionHistory": "not a list"
        }))
        .expect("deserialize");

        let err = LatestConventions.normalize(rec).expect_err("must fail");
        assert!(matches!(err, SynthesisError::Normalize { .. }));
    }
}
