//! Catalog Index CLI
//!
//! Ensures, verifies and lists the game catalog's secondary indexes.
//!
//! # Usage
//!
//! ```bash
//! # Create any missing index (exit code 0 / 1 / 2)
//! catalog-index --db latestgames.db ensure
//!
//! # Check the live schema without changing it (exit code 0 / 1 / 2)
//! catalog-index --config indexes.yaml verify --json
//!
//! # Show the configured catalog
//! catalog-index list
//! ```

use anyhow::Context;
use catalog_index::report::{verify_exit_code, verify_unreachable};
use catalog_index::{EnsureConfig, EnsureReport, IndexEnsurer, SqliteSchemaStore, VerifyResult};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "catalog-index")]
#[command(about = "Ensure the game catalog's secondary indexes exist", long_about = None)]
struct Cli {
    /// YAML configuration file (schema v1)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog database path (overrides config and LG_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create every missing index
    Ensure,

    /// Compare the catalog against the live schema
    Verify,

    /// Print the configured index catalog
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .ok();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Ensure => ensure(&config, cli.json).await,
        Commands::Verify => verify(&config, cli.json).await,
        Commands::List => list(&config, cli.json),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<EnsureConfig> {
    EnsureConfig::resolve(
        cli.config.as_deref(),
        |var| std::env::var(var).ok(),
        cli.db.as_deref(),
    )
    .context("loading configuration")
}

fn open_store(config: &EnsureConfig) -> catalog_index::Result<SqliteSchemaStore> {
    info!(database = %config.database.display(), indexes = config.catalog.len(), "opening catalog store");
    SqliteSchemaStore::open(&config.database, config.busy_timeout)
}

async fn ensure(config: &EnsureConfig, json: bool) -> anyhow::Result<ExitCode> {
    let report = match open_store(config) {
        Ok(store) => {
            IndexEnsurer::new(store)
                .ensure_report(config.catalog.specs())
                .await
        }
        Err(err) => {
            error!(error = %err, "catalog store unreachable");
            EnsureReport::store_unreachable(config.catalog.specs(), &err)
        }
    };

    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{report}");
    }
    Ok(exit_code(report.exit_code()))
}

async fn verify(config: &EnsureConfig, json: bool) -> anyhow::Result<ExitCode> {
    let results: Vec<VerifyResult> = match open_store(config) {
        Ok(store) => {
            IndexEnsurer::new(store)
                .verify_all(config.catalog.specs())
                .await
        }
        Err(err) => {
            error!(error = %err, "catalog store unreachable");
            verify_unreachable(config.catalog.specs(), &err)
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!("{result}");
        }
    }
    Ok(exit_code(verify_exit_code(&results)))
}

fn list(config: &EnsureConfig, json: bool) -> anyhow::Result<ExitCode> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.catalog)?);
    } else {
        for spec in &config.catalog {
            println!("{spec}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map(ExitCode::from).unwrap_or(ExitCode::FAILURE)
}
