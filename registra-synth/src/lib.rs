//! # registra-synth
//!
//! Rendition synthesis for dataset resource records.
//!
//! One canonical record enters [`RenditionSynthesizer::synthesize`] and the
//! three storable renditions come out: the latest view, the immutable
//! per-version snapshot, and the aggregated release collection, each with
//! its identifiers and URLs rewritten to the public endpoint conventions.

pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;

pub use config::EndpointConfig;
pub use engine::RenditionSynthesizer;
pub use error::SynthesisError;
pub use normalize::{IdentityNormalizer, LatestConventions, SchemaNormalizer};
