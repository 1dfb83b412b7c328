//! Registra core library — document model, version ordering, identifier
//! conventions.
//!
//! Public API surface:
//! - [`types`] — resource records and derived renditions
//! - [`version`] — natural ordering for version strings
//! - [`ident`] — versioned / release-collection identifier conventions

pub mod ident;
pub mod types;
pub mod version;

pub use types::{Component, ReleaseHistory, ReleaseRef, Renditions, ResourceRecord};
pub use version::{cmp_versions, Version};
