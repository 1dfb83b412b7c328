//! `registra show` — print a stored record as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use registra_core::ident;
use registra_ingest::{
    Collection, FsCollection, RecordKey, LATEST_COLLECTION, VERSIONS_COLLECTION,
};

use crate::config;

/// Arguments for `registra show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Resource identifier (unversioned).
    pub id: String,

    /// Show the snapshot of this version instead of the latest record.
    #[arg(long)]
    pub version: Option<String>,

    /// Store root (overrides the config file).
    #[arg(long)]
    pub store: Option<PathBuf>,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let cfg = config::load_at(&home)?;
        let root = config::store_root_at(&home, &cfg, self.store.clone());

        let (collection_name, key) = match self.version.as_deref() {
            Some(version) => (
                VERSIONS_COLLECTION,
                RecordKey::id(ident::versioned_id(&self.id, version)),
            ),
            None => (LATEST_COLLECTION, RecordKey::id(&self.id)),
        };

        let collection = FsCollection::open(&root, collection_name)
            .with_context(|| format!("cannot open store at {}", root.display()))?;
        let docs = collection
            .find(&key)
            .with_context(|| format!("lookup failed for {key}"))?;

        let Some(doc) = docs.first() else {
            bail!("no stored record for {key}");
        };
        println!("{}", serde_json::to_string_pretty(doc)?);
        Ok(())
    }
}
