//! Structural-validation seam.
//!
//! Real schema validation lives outside this system; the engine only needs
//! a yes/no-with-findings boundary it can gate writes on. An empty issue
//! list means the document is valid.

use std::fmt;

use registra_core::ResourceRecord;

/// One validation finding against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Field the finding is about, when attributable.
    pub field: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> ValidationIssue {
        ValidationIssue {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn missing(field: impl Into<String>) -> ValidationIssue {
        let field = field.into();
        ValidationIssue {
            message: format!("required property '{field}' is missing"),
            field: Some(field),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field.as_deref() {
            Some(field) => write!(f, "{field}: {}", self.message),
            None => self.message.fmt(f),
        }
    }
}

/// Validates a document against a schema, identified by URI when the
/// record carries one.
pub trait StructuralValidator: Send + Sync {
    fn validate(&self, doc: &ResourceRecord, schema_uri: Option<&str>) -> Vec<ValidationIssue>;
}

/// Minimal stand-in validator: checks the fields every publishable record
/// must carry. A deployment wires a real JSON-Schema validator in instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequiredFieldsValidator;

impl StructuralValidator for RequiredFieldsValidator {
    fn validate(&self, doc: &ResourceRecord, _schema_uri: Option<&str>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if doc.id.is_empty() {
            issues.push(ValidationIssue::missing("id"));
        }
        if doc.title.as_deref().map_or(true, str::is_empty) {
            issues.push(ValidationIssue::missing("title"));
        }
        if doc.landing_page.as_deref().map_or(true, str::is_empty) {
            issues.push(ValidationIssue::missing("landingPage"));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn complete_record_is_valid() {
        let doc: ResourceRecord = serde_json::from_value(json!({
            "id": "R1",
            "title": "T",
            "landingPage": "https://data.example/od/id/R1"
        }))
        .expect("doc");
        assert!(RequiredFieldsValidator.validate(&doc, None).is_empty());
    }

    #[test]
    fn findings_name_the_offending_fields() {
        let doc: ResourceRecord = serde_json::from_value(json!({"id": "R1"})).expect("doc");
        let issues = RequiredFieldsValidator.validate(&doc, None);
        let fields: Vec<_> = issues.iter().filter_map(|i| i.field.as_deref()).collect();
        assert_eq!(fields, vec!["title", "landingPage"]);
    }

    #[test]
    fn display_includes_field() {
        let issue = ValidationIssue::missing("title");
        assert_eq!(issue.to_string(), "title: required property 'title' is missing");
    }
}
