//! CLI configuration — `~/.registra/config.yaml`.
//!
//! # API pattern
//!
//! Every path-dependent function has an `_at(home, …)` form used in tests
//! with `TempDir`; the store root resolves as flag > config file > default
//! `<home>/.registra/store`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use registra_synth::EndpointConfig;

/// On-disk CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Root directory of the document store.
    pub store: Option<PathBuf>,
    /// Public endpoints assumed when rewriting records.
    pub endpoints: EndpointConfig,
}

/// `<home>/.registra/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".registra").join("config.yaml")
}

/// Load the configuration, falling back to defaults when no file exists.
pub fn load_at(home: &Path) -> Result<CliConfig> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_yaml::from_str(&contents).with_context(|| format!("cannot parse {}", path.display()))
}

/// Resolve the store root from an explicit flag, the config file, or the
/// default location, in that order.
pub fn store_root_at(home: &Path, config: &CliConfig, flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| config.store.clone())
        .unwrap_or_else(|| home.join(".registra").join("store"))
}
