//! `registra load` — ingest resource records from a file or directory.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use registra_ingest::{
    IngestEngine, LoadLog, LoadOutcome, RecordKey, RequiredFieldsValidator,
};

use crate::config;

/// Arguments for `registra load`.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// A record `.json` file, or a directory tree of them.
    pub path: PathBuf,

    /// Store root (overrides the config file).
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Skip structural validation before writing.
    #[arg(long)]
    pub no_validate: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl LoadArgs {
    pub fn run(self) -> Result<()> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let cfg = config::load_at(&home)?;
        let root = config::store_root_at(&home, &cfg, self.store.clone());

        let engine = IngestEngine::at_dir(&root, cfg.endpoints)
            .with_context(|| format!("cannot open store at {}", root.display()))?
            .with_validator(Box::new(RequiredFieldsValidator));

        let validate = !self.no_validate;
        let log = if self.path.is_dir() {
            engine.load_dir(&self.path, validate)
        } else {
            let mut log = LoadLog::new("dataset resources");
            engine.load_file(&self.path, validate, &mut log);
            log
        };

        if self.json {
            print_json(&log)?;
        } else {
            print_results(&log);
        }
        if log.failure_count() > 0 {
            bail!("{} write(s) failed", log.failure_count());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct LoadReportJson {
    attempted: usize,
    succeeded: usize,
    failed: usize,
    results: Vec<LoadResultJson>,
}

#[derive(Serialize)]
struct LoadResultJson {
    key: RecordKey,
    collection: Option<String>,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

fn print_json(log: &LoadLog) -> Result<()> {
    let results = log
        .results()
        .iter()
        .map(|result| LoadResultJson {
            key: result.key.clone(),
            collection: result.collection.clone(),
            outcome: match result.outcome {
                LoadOutcome::Written => "written",
                LoadOutcome::Skipped => "skipped",
                LoadOutcome::Failed(_) => "failed",
            },
            errors: result.errors().iter().map(|e| e.to_string()).collect(),
        })
        .collect();

    let report = LoadReportJson {
        attempted: log.attempt_count(),
        succeeded: log.success_count(),
        failed: log.failure_count(),
        results,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_results(log: &LoadLog) {
    for result in log.results() {
        let collection = result.collection.as_deref().unwrap_or("-");
        match &result.outcome {
            LoadOutcome::Written => {
                println!("  {}  {} {}", "✎".green(), collection, result.key);
            }
            LoadOutcome::Skipped => {
                println!(
                    "  {}  {} {} (kept stored document)",
                    "·".dimmed(),
                    collection,
                    result.key
                );
            }
            LoadOutcome::Failed(errors) => {
                println!("  {}  {} {}", "✗".red(), collection, result.key);
                for err in errors.iter() {
                    println!("       {err}");
                }
            }
        }
    }

    let summary = log.to_string();
    if log.failure_count() > 0 {
        println!("{} {summary}", "✗".red());
    } else {
        println!("{} {summary}", "✓".green());
    }
}
