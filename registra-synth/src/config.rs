//! Public endpoint configuration for identifier and URL rewriting.

use serde::{Deserialize, Serialize};

/// Endpoints and defaults the synthesizer assumes when rewriting a record.
///
/// Always passed in explicitly at construction; nothing here is read from
/// process-wide state. Service values may be absolute URLs or paths
/// relative to `portal_base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Common base URL for all public endpoints.
    pub portal_base: String,
    /// Base that resolves an identifier to a landing page.
    pub landing_page_service: String,
    /// Base under which component download URLs are served.
    pub distribution_service: String,
    /// Version assumed for records that carry none.
    pub default_version: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            portal_base: "https://data.example/".to_owned(),
            landing_page_service: "od/id/".to_owned(),
            distribution_service: "od/ds/".to_owned(),
            default_version: "1.0.0".to_owned(),
        }
    }
}

impl EndpointConfig {
    /// Absolute landing-page base, with a trailing slash.
    pub fn landing_page_base(&self) -> String {
        join_base(&self.portal_base, &self.landing_page_service)
    }

    /// Absolute distribution-service base, with a trailing slash.
    pub fn distribution_base(&self) -> String {
        join_base(&self.portal_base, &self.distribution_service)
    }
}

fn join_base(portal: &str, service: &str) -> String {
    let absolute = if service.starts_with("http://") || service.starts_with("https://") {
        service.to_owned()
    } else {
        format!(
            "{}/{}",
            portal.trim_end_matches('/'),
            service.trim_start_matches('/')
        )
    };
    if absolute.ends_with('/') {
        absolute
    } else {
        format!("{absolute}/")
    }
}
