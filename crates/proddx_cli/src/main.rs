//! `proddx` operator CLI.
//!
//! # Responsibility
//! - Apply schema migrations to the configured SQLite database.
//! - Print per-kind record counts for the configured backend.
//!
//! Storage is selected through `DATABASE_URL` (see `StorageConfig::from_env`).

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use proddx_core::{
    default_log_level, init_logging, Backend, CatalogService, Database, RecordKind, Storage,
    StorageConfig,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "proddx", version, about = "Proddx storage maintenance")]
struct Cli {
    /// trace|debug|info|warn|error
    #[arg(long, global = true, default_value_t = default_log_level().to_string())]
    log_level: String,

    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or upgrade the SQLite schema.
    Migrate,
    /// Print record counts per kind.
    Stats,
    /// Print core crate health and version.
    Ping,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        init_logging(&cli.log_level, log_dir).map_err(anyhow::Error::msg)?;
    }

    match cli.command {
        Command::Ping => {
            println!("proddx_core ping={}", proddx_core::ping());
            println!("proddx_core version={}", proddx_core::core_version());
        }
        Command::Migrate => migrate()?,
        Command::Stats => stats()?,
    }
    Ok(())
}

fn migrate() -> anyhow::Result<()> {
    let config = StorageConfig::from_env()?;
    let Backend::Sqlite { path } = &config.backend else {
        bail!("migrate needs a SQLite DATABASE_URL, e.g. sqlite://proddx.db");
    };

    let db = Database::open(path, config.database_options())
        .with_context(|| format!("failed to migrate `{}`", path.display()))?;
    let version = db.schema_version()?;
    info!(
        "event=cli_migrate module=cli status=ok path={} version={}",
        path.display(),
        version
    );
    println!("{} schema_version={version}", path.display());
    Ok(())
}

fn stats() -> anyhow::Result<()> {
    let config = StorageConfig::from_env()?;
    let storage = Storage::open(&config)?;
    let counts = CatalogService::new(storage.clone()).record_counts()?;

    println!("backend={}", storage.backend());
    for kind in [
        RecordKind::Account,
        RecordKind::Company,
        RecordKind::Product,
        RecordKind::Review,
    ] {
        println!("{}={}", kind.table(), counts.get(kind));
    }
    Ok(())
}
