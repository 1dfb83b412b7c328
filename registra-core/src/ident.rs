//! Identifier conventions for versioned and release-collection records.
//!
//! A resource's unversioned persistent identifier (its *rid*) is extended
//! with literal path suffixes to name the derived records:
//!
//! ```text
//! <rid>                      latest record
//! <rid>/pdr:v                release collection
//! <rid>/pdr:v/<version>      one immutable versioned snapshot
//! ```
//!
//! Download URLs are version-qualified by inserting a `_v/<version>/`
//! segment immediately after the resource's path-local id segment.

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal suffix naming a resource's release collection.
pub const RELEASE_COLLECTION_SUFFIX: &str = "/pdr:v";

static VERSION_EXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/pdr:v/\d+([._]\d+)*$").expect("valid regex"));

/// The version-extension suffix for a given version: `"/pdr:v/" + version`.
pub fn version_ext(version: &str) -> String {
    format!("{RELEASE_COLLECTION_SUFFIX}/{version}")
}

/// Identifier of the immutable snapshot of `rid` at `version`.
pub fn versioned_id(rid: &str, version: &str) -> String {
    format!("{rid}{}", version_ext(version))
}

/// Identifier of the aggregated release collection for `rid`.
pub fn release_set_id(rid: &str) -> String {
    format!("{rid}{RELEASE_COLLECTION_SUFFIX}")
}

/// True if `id` already carries a version-extension suffix.
pub fn has_version_ext(id: &str) -> bool {
    VERSION_EXT.is_match(id)
}

/// Strip a trailing version-extension suffix, if present, yielding the rid.
pub fn strip_version_ext(id: &str) -> &str {
    match VERSION_EXT.find(id) {
        Some(m) => &id[..m.start()],
        None => id,
    }
}

/// Insert the `_v/<version>/` segment into a download URL that falls under
/// `service_base`, immediately after the resource's id segment.
///
/// Returns `None` when the URL is outside the service base, already
/// version-qualified, or has no file path after the id segment.
pub fn qualify_download_url(url: &str, version: &str, service_base: &str) -> Option<String> {
    let rest = url.strip_prefix(service_base)?;
    let (id_segment, tail) = rest.split_once('/')?;
    if id_segment.is_empty() || tail.is_empty() {
        return None;
    }
    if tail == "_v" || tail.starts_with("_v/") {
        return None;
    }
    Some(format!("{service_base}{id_segment}/_v/{version}/{tail}"))
}
