//! Server wiring for the clinical trials mirror: configuration, the HTTP
//! app, startup bootstrap and the daily scheduler.

pub mod config;
pub mod schedule;

use std::sync::Arc;

use axum::Router;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use trials_core::store::TrialStore;
use trials_store_sqlite::SqliteStore;
use trials_sync::{ClinicalTrialsClient, Fetcher, PageSource, Syncer};

pub use config::ServerConfig;

/// The production syncer: live API client over the SQLite store.
pub type LiveSyncer = Syncer<ClinicalTrialsClient, SqliteStore>;

/// Build a [`LiveSyncer`] from configuration over an already-open store.
pub fn live_syncer(cfg: &ServerConfig, store: Arc<SqliteStore>) -> anyhow::Result<LiveSyncer> {
  let client = ClinicalTrialsClient::new(&cfg.source)?;
  Ok(Syncer::new(Fetcher::new(client, cfg.fetch.clone()), store))
}

/// The read API with request tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: TrialStore + 'static,
{
  trials_api::api_router(store).layer(TraceLayer::new_for_http())
}

/// Start a full load in the background if the store holds no trials.
///
/// Returns the task handle when a load was started. The API can be served
/// while the load runs; its failure is logged and leaves every committed
/// page in place.
pub async fn bootstrap<P, S>(syncer: Arc<Syncer<P, S>>) -> Result<Option<JoinHandle<()>>, S::Error>
where
  P: PageSource + 'static,
  S: TrialStore + 'static,
{
  if !syncer.store().is_empty().await? {
    tracing::info!("store already populated; skipping initial full load");
    return Ok(None);
  }

  tracing::info!("store is empty; starting initial full load in background");
  Ok(Some(tokio::spawn(async move {
    if let Err(e) = syncer.run_full_load().await {
      tracing::warn!(error = %e, "initial full load did not complete");
    }
  })))
}
