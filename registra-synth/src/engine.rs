//! Rendition synthesis — one canonical record in, three storable documents
//! out.
//!
//! # Identifier mapping
//!
//! | Rendition    | `id`                          |
//! |--------------|-------------------------------|
//! | `record`     | `<rid>`                       |
//! | `version`    | `<rid>/pdr:v/<version>`       |
//! | `release_set`| `<rid>/pdr:v`                 |
//!
//! The version rendition additionally gets a version-qualified landing page
//! and version-qualified component download URLs; the latest rendition
//! never does.

use registra_core::{ident, ReleaseRef, Renditions, ResourceRecord};

use crate::config::EndpointConfig;
use crate::error::SynthesisError;
use crate::normalize::{LatestConventions, SchemaNormalizer};

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

/// Derives the `{record, version, release_set}` triple from a canonical
/// resource record. Pure transformation: no storage I/O, no retained state.
pub struct RenditionSynthesizer {
    config: EndpointConfig,
    normalizer: Box<dyn SchemaNormalizer>,
}

impl RenditionSynthesizer {
    /// Create a synthesizer with the default [`LatestConventions`]
    /// normalizer.
    pub fn new(config: EndpointConfig) -> Self {
        Self::with_normalizer(config, Box::new(LatestConventions))
    }

    /// Create a synthesizer with an explicit normalization step.
    pub fn with_normalizer(config: EndpointConfig, normalizer: Box<dyn SchemaNormalizer>) -> Self {
        RenditionSynthesizer { config, normalizer }
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Derive the three renditions of `input`.
    ///
    /// The input is taken to be the canonical record for one resource
    /// version; a record that is itself a release collection is rejected
    /// before any other work.
    pub fn synthesize(&self, input: &ResourceRecord) -> Result<Renditions, SynthesisError> {
        if input.id.is_empty() {
            return Err(SynthesisError::MissingId);
        }
        if input.is_type("ReleaseCollection")
            || input.id.ends_with(ident::RELEASE_COLLECTION_SUFFIX)
        {
            return Err(SynthesisError::ReleaseCollection {
                id: input.id.clone(),
            });
        }

        let mut rec = self.normalizer.normalize(input.clone())?;

        if rec.version.as_deref().map_or(true, str::is_empty) {
            rec.version = Some(self.config.default_version.clone());
        }
        let version_str = rec.version.clone().unwrap_or_default();
        let rid = ident::strip_version_ext(&rec.id).to_owned();

        fill_release_ref_ids(&mut rec, &rid);

        // The latest view keeps the bare rid even when the producer sent a
        // versioned identifier.
        let mut record = rec.clone();
        record.id = rid.clone();

        let mut version = rec;
        if !ident::has_version_ext(&version.id) {
            version.id = format!("{}{}", version.id, ident::version_ext(&version_str));
        }

        let landing_base = self.config.landing_page_base();
        qualify_landing_page(&mut version, &version_str, &landing_base);
        qualify_download_urls(&mut version, &version_str, &self.config.distribution_base());

        let mut release_set = build_release_set(&record, &version, &rid);

        rewrite_locations(&mut release_set.has_release, &landing_base);
        if let Some(hist) = version.release_history.as_mut() {
            rewrite_locations(&mut hist.has_release, &landing_base);
        }

        Ok(Renditions {
            record,
            version,
            release_set,
        })
    }
}

// ---------------------------------------------------------------------------
// Synthesis steps
// ---------------------------------------------------------------------------

/// Assign an id to every release reference that lacks one, preferring the
/// reference's own version, then the deprecated `refid` field, then the
/// resource itself. `refid` is consumed either way.
fn fill_release_ref_ids(rec: &mut ResourceRecord, rid: &str) {
    let Some(hist) = rec.release_history.as_mut() else {
        return;
    };
    for rel in &mut hist.has_release {
        let refid = rel.refid.take();
        if rel.id.is_none() {
            rel.id = Some(match rel.version.as_deref() {
                Some(v) => format!("{rid}{}", ident::version_ext(v)),
                None => refid.unwrap_or_else(|| rid.to_owned()),
            });
        }
    }
}

fn qualify_landing_page(version: &mut ResourceRecord, version_str: &str, landing_base: &str) {
    let Some(lp) = version.landing_page.take() else {
        return;
    };
    let qualified = if lp.starts_with(landing_base) && !ident::has_version_ext(&lp) {
        format!("{lp}{}", ident::version_ext(version_str))
    } else {
        lp
    };
    version.landing_page = Some(qualified);
}

fn qualify_download_urls(version: &mut ResourceRecord, version_str: &str, dist_base: &str) {
    for comp in &mut version.components {
        if let Some(url) = comp.download_url.as_deref() {
            if let Some(qualified) = ident::qualify_download_url(url, version_str, dist_base) {
                comp.download_url = Some(qualified);
            }
        }
    }
}

/// Fields copied from the latest record into the release collection.
const RELEASE_SET_TYPES: [&str; 2] = ["nrdr:ReleaseCollection", "dcat:Catalog"];

fn build_release_set(
    record: &ResourceRecord,
    version: &ResourceRecord,
    rid: &str,
) -> ResourceRecord {
    let mut release_set = ResourceRecord {
        id: ident::release_set_id(rid),
        types: RELEASE_SET_TYPES.iter().map(|t| (*t).to_owned()).collect(),
        schema: record.schema.clone(),
        ediid: record.ediid.clone(),
        title: record.title.clone(),
        description: record.description.clone(),
        keyword: record.keyword.clone(),
        first_issued: record.first_issued.clone(),
        publisher: record.publisher.clone(),
        contact_point: record.contact_point.clone(),
        theme: record.theme.clone(),
        abbrev: record.abbrev.clone(),
        version: record.version.clone(),
        ..Default::default()
    };

    release_set.has_release = match record.release_history.as_ref() {
        Some(hist) if !hist.has_release.is_empty() => hist.has_release.clone(),
        _ => vec![initial_release_ref(version)],
    };
    release_set
}

/// A release reference for a resource publishing its first entry, built
/// from the versioned rendition.
fn initial_release_ref(version: &ResourceRecord) -> ReleaseRef {
    let ver = version.version.clone().unwrap_or_default();
    ReleaseRef {
        id: Some(version.id.clone()),
        version: Some(ver.clone()),
        issued: version.release_date().map(str::to_owned),
        location: version.landing_page.clone(),
        description: release_description(&ver).map(str::to_owned),
        ..Default::default()
    }
}

/// Classify a release by which version field changed. Versions are
/// zero-padded to three fields, so `"1.0"` classifies like `"1.0.0"`.
fn release_description(version: &str) -> Option<&'static str> {
    let mut fields: Vec<&str> = version.split(['.', '_']).collect();
    while fields.len() < 3 {
        fields.push("0");
    }
    if fields.len() != 3 {
        return None;
    }
    if fields[2] != "0" {
        Some("metadata update")
    } else if fields[1] != "0" {
        Some("data update")
    } else if fields[0] == "1" {
        Some("initial release")
    } else {
        None
    }
}

fn rewrite_locations(refs: &mut [ReleaseRef], landing_base: &str) {
    for rel in refs {
        if let Some(id) = rel.id.as_deref() {
            rel.location = Some(format!("{landing_base}{id}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn synthesizer() -> RenditionSynthesizer {
        RenditionSynthesizer::new(EndpointConfig::default())
    }

    fn record(value: serde_json::Value) -> ResourceRecord {
        serde_json::from_value(value).expect("test record")
    }

    fn basic_input() -> ResourceRecord {
        record(json!({
            "id": "R1",
            "type": ["nrdp:PublicDataResource"],
            "title": "T",
            "version": "2.0.0",
            "landingPage": "https://data.example/od/id/R1",
            "components": [
                {"downloadURL": "https://data.example/od/ds/R1/file.csv"},
                {"filepath": "subdir"}
            ]
        }))
    }

    #[test]
    fn renditions_carry_the_three_id_forms() {
        let out = synthesizer().synthesize(&basic_input()).expect("synthesize");
        assert_eq!(out.record.id, "R1");
        assert_eq!(out.version.id, "R1/pdr:v/2.0.0");
        assert_eq!(out.release_set.id, "R1/pdr:v");
    }

    #[test]
    fn version_rendition_gets_qualified_urls() {
        let out = synthesizer().synthesize(&basic_input()).expect("synthesize");
        assert_eq!(
            out.version.landing_page.as_deref(),
            Some("https://data.example/od/id/R1/pdr:v/2.0.0")
        );
        assert_eq!(
            out.version.components[0].download_url.as_deref(),
            Some("https://data.example/od/ds/R1/_v/2.0.0/file.csv")
        );
    }

    #[test]
    fn latest_rendition_urls_stay_unqualified() {
        let out = synthesizer().synthesize(&basic_input()).expect("synthesize");
        assert_eq!(
            out.record.landing_page.as_deref(),
            Some("https://data.example/od/id/R1")
        );
        assert_eq!(
            out.record.components[0].download_url.as_deref(),
            Some("https://data.example/od/ds/R1/file.csv")
        );
    }

    #[test]
    fn missing_version_defaults_and_marks_initial_release() {
        let out = synthesizer()
            .synthesize(&record(json!({
                "id": "R1",
                "title": "T",
                "issued": "2019-05-05",
                "landingPage": "https://data.example/od/id/R1"
            })))
            .expect("synthesize");

        assert_eq!(out.record.version.as_deref(), Some("1.0.0"));
        assert_eq!(out.version.id, "R1/pdr:v/1.0.0");

        let rel = &out.release_set.has_release[0];
        assert_eq!(rel.id.as_deref(), Some("R1/pdr:v/1.0.0"));
        assert_eq!(rel.version.as_deref(), Some("1.0.0"));
        assert_eq!(rel.issued.as_deref(), Some("2019-05-05"));
        assert_eq!(rel.description.as_deref(), Some("initial release"));
    }

    #[test]
    fn release_set_copies_only_the_summary_fields() {
        let out = synthesizer()
            .synthesize(&record(json!({
                "id": "R1",
                "ediid": "EDI-1",
                "title": "T",
                "description": ["about"],
                "keyword": ["k"],
                "theme": ["t"],
                "abbrev": ["A"],
                "publisher": {"name": "Example Lab"},
                "contactPoint": {"fn": "someone"},
                "firstIssued": "2019-01-01",
                "version": "1.0.0",
                "landingPage": "https://data.example/od/id/R1",
                "components": [{"downloadURL": "https://data.example/od/ds/R1/a.csv"}]
            })))
            .expect("synthesize");

        let rs = &out.release_set;
        assert_eq!(rs.ediid.as_deref(), Some("EDI-1"));
        assert_eq!(rs.title.as_deref(), Some("T"));
        assert_eq!(rs.first_issued.as_deref(), Some("2019-01-01"));
        assert_eq!(rs.publisher, Some(json!({"name": "Example Lab"})));
        assert!(rs.components.is_empty());
        assert!(rs.landing_page.is_none());
        assert!(rs.is_type("ReleaseCollection"));
    }

    #[test]
    fn existing_release_history_flows_into_release_set_with_locations() {
        let out = synthesizer()
            .synthesize(&record(json!({
                "id": "R1",
                "version": "1.1.0",
                "landingPage": "https://data.example/od/id/R1",
                "releaseHistory": {
                    "id": "R1/pdr:v",
                    "hasRelease": [
                        {"version": "1.0.0", "issued": "2020-01-01"},
                        {"version": "1.1.0", "issued": "2021-01-01"}
                    ]
                }
            })))
            .expect("synthesize");

        let refs = &out.release_set.has_release;
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].id.as_deref(), Some("R1/pdr:v/1.0.0"));
        assert_eq!(
            refs[0].location.as_deref(),
            Some("https://data.example/od/id/R1/pdr:v/1.0.0")
        );
        assert_eq!(
            refs[1].location.as_deref(),
            Some("https://data.example/od/id/R1/pdr:v/1.1.0")
        );

        // The snapshot's own history is rewritten the same way.
        let hist = out.version.release_history.as_ref().expect("history");
        assert_eq!(
            hist.has_release[1].location.as_deref(),
            Some("https://data.example/od/id/R1/pdr:v/1.1.0")
        );
    }

    #[test]
    fn release_ref_id_falls_back_to_deprecated_refid() {
        let out = synthesizer()
            .synthesize(&record(json!({
                "id": "R1",
                "version": "1.0.0",
                "releaseHistory": {
                    "hasRelease": [
                        {"refid": "legacy:R1-v1"},
                        {}
                    ]
                }
            })))
            .expect("synthesize");

        let refs = &out.release_set.has_release;
        assert_eq!(refs[0].id.as_deref(), Some("legacy:R1-v1"));
        assert_eq!(refs[1].id.as_deref(), Some("R1"));
        assert!(refs.iter().all(|r| r.refid.is_none()));
    }

    #[test]
    fn versioned_input_id_is_respected_and_latest_is_stripped() {
        let out = synthesizer()
            .synthesize(&record(json!({
                "id": "R1/pdr:v/3.0.0",
                "version": "3.0.0"
            })))
            .expect("synthesize");
        assert_eq!(out.record.id, "R1");
        assert_eq!(out.version.id, "R1/pdr:v/3.0.0");
        assert_eq!(out.release_set.id, "R1/pdr:v");
    }

    #[test]
    fn release_collection_input_is_rejected() {
        let err = synthesizer()
            .synthesize(&record(json!({
                "id": "R1/pdr:v",
                "type": ["nrdr:ReleaseCollection"]
            })))
            .expect_err("must reject");
        assert!(matches!(err, SynthesisError::ReleaseCollection { .. }));

        let err = synthesizer()
            .synthesize(&record(json!({"id": "R2/pdr:v"})))
            .expect_err("must reject by id suffix");
        assert!(matches!(err, SynthesisError::ReleaseCollection { .. }));
    }

    #[test]
    fn empty_id_is_rejected() {
        let err = synthesizer()
            .synthesize(&ResourceRecord::default())
            .expect_err("must reject");
        assert!(matches!(err, SynthesisError::MissingId));
    }

    #[rstest]
    #[case("1.0.0", Some("initial release"))]
    #[case("1.0", Some("initial release"))]
    #[case("2.0.0", None)]
    #[case("1.2.0", Some("data update"))]
    #[case("1.0.3", Some("metadata update"))]
    #[case("2.0.1", Some("metadata update"))]
    #[case("1_1_0", Some("data update"))]
    fn release_descriptions(#[case] version: &str, #[case] expected: Option<&str>) {
        assert_eq!(release_description(version), expected);
    }

    #[test]
    fn foreign_landing_page_is_left_alone() {
        let out = synthesizer()
            .synthesize(&record(json!({
                "id": "R1",
                "version": "1.0.0",
                "landingPage": "https://elsewhere.example/R1"
            })))
            .expect("synthesize");
        assert_eq!(
            out.version.landing_page.as_deref(),
            Some("https://elsewhere.example/R1")
        );
    }
}
