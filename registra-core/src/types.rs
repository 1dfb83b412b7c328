//! Domain types for dataset resource metadata.
//!
//! Documents are modeled as explicit structs with optional fields rather
//! than free-form maps; producer fields outside the model are preserved
//! through the flattened `extra` map on each struct, so a record survives a
//! store round-trip byte-for-byte.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Resource record
// ---------------------------------------------------------------------------

/// One metadata record describing a dataset resource.
///
/// The same shape serves all three stored renditions: the latest record
/// (unversioned `id`), the per-version snapshot (`id` carrying a version
/// extension), and the release collection (`id` carrying the release-
/// collection suffix plus a top-level `hasRelease` list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    /// Persistent identifier. Unversioned for the latest rendition.
    pub id: String,

    /// Declared resource types, possibly prefix-qualified (`nrdr:…`).
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,

    /// URI of the schema this record claims conformance with.
    #[serde(rename = "_schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Legacy EDI identifier carried through from the submission system.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ediid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_page: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_issued: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_point: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbrev: Option<Value>,

    // Release date candidates, most specific first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    /// File and subcollection entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,

    /// Release history as recorded on latest/version renditions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_history: Option<ReleaseHistory>,

    /// Release references at the document root; populated only on the
    /// release-collection rendition.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub has_release: Vec<ReleaseRef>,

    /// Producer fields outside the model, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceRecord {
    /// True if `name` matches one of the declared types, ignoring any
    /// `prefix:` qualifier on either side.
    pub fn is_type(&self, name: &str) -> bool {
        let want = local_name(name);
        self.types.iter().any(|t| local_name(t) == want)
    }

    /// The record's release date: the first present of `annotated`,
    /// `revised`, `issued`, `modified`.
    pub fn release_date(&self) -> Option<&str> {
        self.annotated
            .as_deref()
            .or(self.revised.as_deref())
            .or(self.issued.as_deref())
            .or(self.modified.as_deref())
    }
}

fn local_name(typename: &str) -> &str {
    match typename.split_once(':') {
        Some((_, local)) => local,
        None => typename,
    }
}

// ---------------------------------------------------------------------------
// Components and release references
// ---------------------------------------------------------------------------

/// One file or subcollection entry of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,

    #[serde(rename = "downloadURL", skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The ordered release history attached to a resource record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseHistory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub has_release: Vec<ReleaseRef>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A pointer-with-metadata to one published version of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued: Option<String>,

    /// Resolves to a version-qualified landing page once stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Deprecated identifier field still emitted by old producers; consumed
    /// during synthesis and never written back out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refid: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Renditions
// ---------------------------------------------------------------------------

/// The three derived documents produced from one canonical record.
///
/// Members share no state after synthesis; each is written to its own
/// collection independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Renditions {
    /// The latest view, keyed by the unversioned rid.
    pub record: ResourceRecord,
    /// The immutable per-version snapshot.
    pub version: ResourceRecord,
    /// The aggregated release collection.
    pub release_set: ResourceRecord,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
