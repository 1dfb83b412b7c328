//! `registra history` — print a resource's release history.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use registra_core::ident;
use registra_ingest::{Collection, FsCollection, RecordKey, RELEASES_COLLECTION};

use crate::config;

/// Arguments for `registra history`.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Resource identifier (unversioned).
    pub id: String,

    /// Store root (overrides the config file).
    #[arg(long)]
    pub store: Option<PathBuf>,
}

#[derive(Tabled)]
struct ReleaseRow {
    #[tabled(rename = "version")]
    version: String,
    #[tabled(rename = "issued")]
    issued: String,
    #[tabled(rename = "description")]
    description: String,
    #[tabled(rename = "location")]
    location: String,
}

impl HistoryArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let cfg = config::load_at(&home)?;
        let root = config::store_root_at(&home, &cfg, self.store.clone());

        let collection = FsCollection::open(&root, RELEASES_COLLECTION)
            .with_context(|| format!("cannot open store at {}", root.display()))?;
        let key = RecordKey::id(ident::release_set_id(&self.id));
        let docs = collection
            .find(&key)
            .with_context(|| format!("lookup failed for {key}"))?;

        let Some(release_set) = docs.first() else {
            bail!("no release history for '{}'", self.id);
        };

        let rows: Vec<ReleaseRow> = release_set
            .has_release
            .iter()
            .map(|rel| ReleaseRow {
                version: rel.version.clone().unwrap_or_default(),
                issued: rel.issued.clone().unwrap_or_default(),
                description: rel.description.clone().unwrap_or_default(),
                location: rel.location.clone().unwrap_or_default(),
            })
            .collect();

        if rows.is_empty() {
            println!("'{}' has no recorded releases", self.id);
            return Ok(());
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
