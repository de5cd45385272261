//! `carpool-admin` — operator tool for the carpool store.
//!
//! Reads `carpool.toml` (or the path given with `--config`), opens the SQLite
//! store and runs a single subcommand, printing the result as JSON.
//!
//! ```text
//! carpool-admin person add facebook$123 alice@example.com --gender Female
//! carpool-admin carpool add --driver 1
//! carpool-admin request add 2 1
//! carpool-admin riders 1 --potential
//! carpool-admin is-driver 1 --as 5b0c…
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use carpool_store_sqlite::SqliteStore;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{commands::Command, config::AdminConfig};

#[derive(Parser)]
#[command(author, version, about = "Carpool store administration")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "carpool.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout stays machine-readable.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = AdminConfig::load(&cli.config)?;

  let store = if cfg.is_in_memory() {
    tracing::warn!("using an in-memory store; nothing will be persisted");
    SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store")?
  } else {
    SqliteStore::open(&cfg.store_path)
      .await
      .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?
  };
  tracing::debug!(store_path = ?cfg.store_path, "store ready");

  let output = commands::run(&store, cli.command).await?;
  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}
