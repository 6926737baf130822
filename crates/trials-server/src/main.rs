//! `trials` binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! mirror and then either serves the read API with the daily scheduler
//! (`serve`, the default) or performs a single run and exits (`load`,
//! `sync`).

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use trials_server::{ServerConfig, schedule};
use trials_store_sqlite::SqliteStore;
use trials_sync::SyncReport;

#[derive(Parser)]
#[command(author, version, about = "Clinical trials mirror")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the read API and run the daily sync (default).
  Serve,
  /// Fetch every study and upsert it, then exit.
  Load,
  /// Run one incremental sync, then exit.
  Sync {
    /// Sync from this date (YYYY-MM-DD, inclusive) instead of yesterday.
    #[arg(long, value_parser = trials_core::watermark::parse_date)]
    since: Option<NaiveDate>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;
  let store = Arc::new(store);
  let syncer = Arc::new(trials_server::live_syncer(&cfg, store.clone())?);

  match cli.command.unwrap_or(Command::Serve) {
    Command::Load => log_report(&syncer.run_full_load().await?),
    Command::Sync { since: Some(since) } => log_report(&syncer.run_sync_since(since).await?),
    Command::Sync { since: None } => log_report(&syncer.run_incremental_sync().await?),
    Command::Serve => {
      trials_server::bootstrap(syncer.clone())
        .await
        .context("failed to inspect store")?;

      if cfg.schedule.enabled {
        let at = cfg.schedule.time()?;
        tokio::spawn(schedule::run_daily(syncer.clone(), at));
      } else {
        tracing::info!("daily sync disabled");
      }

      let app = trials_server::app(store);
      let address = format!("{}:{}", cfg.host, cfg.port);

      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

      axum::serve(listener, app).await.context("server error")?;
    }
  }

  Ok(())
}

fn log_report(report: &SyncReport) {
  tracing::info!(
    run_id = %report.run_id,
    mode = %report.mode,
    pages = report.pages,
    upserted = report.upserted,
    skipped = report.skipped,
    "done"
  );
}
