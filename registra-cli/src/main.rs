//! Registra — dataset release metadata store CLI.
//!
//! # Usage
//!
//! ```text
//! registra load <path> [--store <dir>] [--no-validate] [--json]
//! registra show <id> [--version <v>] [--store <dir>]
//! registra history <id> [--store <dir>]
//! ```

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{history::HistoryArgs, load::LoadArgs, show::ShowArgs};

#[derive(Parser, Debug)]
#[command(
    name = "registra",
    version,
    about = "Maintain latest, per-version, and release-history renditions of dataset metadata",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest records from a JSON file or a directory tree.
    Load(LoadArgs),

    /// Print a stored record (latest, or one version's snapshot).
    Show(ShowArgs),

    /// Print a resource's release history.
    History(HistoryArgs),
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Load(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::History(args) => args.run(),
    }
}
