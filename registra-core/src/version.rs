//! Natural ordering for dot/underscore-delimited version strings.
//!
//! A version like `"1.0.2"` splits into fields on `.` or `_`; each field is
//! compared numerically when it parses as an integer, otherwise as a raw
//! token. Numeric fields order before text tokens at the same position, and
//! when one field list is a prefix of the other, the shorter one orders
//! first (`"1.0" < "1.0.2"`). Delimiters carry no meaning of their own, so
//! `"1_0"` and `"1.0"` compare equal.

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static FIELD_DELIM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[._]").expect("valid regex"));
static PROPER_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+([._]\d+)*$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// One delimited field of a version string.
///
/// Variant order matters: `Num` before `Text` makes every numeric field
/// order before any non-numeric token at the same position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Field {
    Num(u64),
    Text(String),
}

impl Field {
    fn parse(raw: &str) -> Field {
        match raw.parse::<u64>() {
            Ok(n) => Field::Num(n),
            Err(_) => Field::Text(raw.to_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// A parsed version string that compares by field semantics rather than by
/// raw string order.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    fields: Vec<Field>,
}

impl Version {
    /// Parse a version string. Never fails: unparseable fields are kept as
    /// raw text tokens.
    pub fn parse(raw: &str) -> Version {
        let fields = FIELD_DELIM.split(raw).map(Field::parse).collect();
        Version {
            raw: raw.to_owned(),
            fields,
        }
    }

    /// The original string this version was parsed from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True for the all-numeric `M.M.M…` form (no text tokens).
    pub fn is_proper(&self) -> bool {
        PROPER_VERSION.is_match(&self.raw)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fields.cmp(&other.fields)
    }
}

/// Compare two version strings under field semantics.
pub fn cmp_versions(a: &str, b: &str) -> Ordering {
    Version::parse(a).cmp(&Version::parse(b))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
