//! Daily trigger for the incremental sync.
//!
//! Fires once per day at a fixed UTC wall-clock time. A fire that is missed
//! while the process is down is not replayed; run `trials sync --since` to
//! cover the gap.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use trials_core::store::TrialStore;
use trials_sync::{PageSource, Syncer};

/// The first instant strictly after `now` whose UTC time of day is `at`.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
  let today = now.date_naive().and_time(at).and_utc();
  if today > now { today } else { today + Duration::days(1) }
}

/// Run the incremental sync every day at `at`, forever.
///
/// A failed run is logged and the loop waits for the next fire.
pub async fn run_daily<P, S>(syncer: Arc<Syncer<P, S>>, at: NaiveTime)
where
  P: PageSource,
  S: TrialStore,
{
  loop {
    let now = Utc::now();
    let next = next_run_after(now, at);
    tracing::info!(next = %next, "next incremental sync scheduled");

    let wait = (next - now).to_std().unwrap_or_default();
    tokio::time::sleep(wait).await;

    if let Err(e) = syncer.run_incremental_sync().await {
      tracing::warn!(error = %e, "scheduled sync failed; will retry at next fire");
    }
  }
}
