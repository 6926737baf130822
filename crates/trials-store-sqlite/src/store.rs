//! The SQLite implementation of [`TrialStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;
use trials_core::{TrialRecord, store::TrialStore, watermark::format_date};

use crate::{
  Result,
  encode::{COLUMNS, RawTrial, UPSERT_SQL},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A trials mirror backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted. All clones
/// share one connection thread, so writes from overlapping sync runs are
/// serialised.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write pre-encoded rows inside one transaction.
  ///
  /// Rows are applied in order, so a later duplicate key overwrites an
  /// earlier one. The `last_updated` index is maintained by SQLite as part of
  /// each statement; readers see either the old row and index entry or the
  /// new ones, never a mix.
  async fn write_rows(&self, rows: Vec<RawTrial>) -> Result<usize> {
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
          for row in &rows {
            written += row.execute_upsert(&mut stmt)?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;
    Ok(written)
  }
}

// ─── TrialStore impl ─────────────────────────────────────────────────────────

impl TrialStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn upsert(&self, trial: TrialRecord) -> Result<()> {
    self.write_rows(vec![RawTrial::encode(trial)?]).await?;
    Ok(())
  }

  #[tracing::instrument(level = "debug", skip_all, fields(batch = trials.len()))]
  async fn upsert_many(&self, trials: Vec<TrialRecord>) -> Result<usize> {
    if trials.is_empty() {
      return Ok(0);
    }
    let rows = trials
      .into_iter()
      .map(RawTrial::encode)
      .collect::<Result<Vec<_>>>()?;
    self.write_rows(rows).await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, nct_id: &str) -> Result<Option<TrialRecord>> {
    let id = nct_id.to_owned();

    let raw: Option<RawTrial> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {COLUMNS} FROM trials WHERE nct_id = ?1"),
            rusqlite::params![id],
            RawTrial::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTrial::into_trial).transpose()
  }

  async fn since(&self, date: NaiveDate) -> Result<Vec<TrialRecord>> {
    let bound = format_date(date);

    let raws: Vec<RawTrial> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(&format!(
          "SELECT {COLUMNS} FROM trials
           WHERE last_updated >= ?1
           ORDER BY last_updated, nct_id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![bound], RawTrial::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTrial::into_trial).collect()
  }

  async fn count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM trials", [], |r| r.get(0))?))
      .await?;
    Ok(n.max(0) as u64)
  }

  async fn is_empty(&self) -> Result<bool> {
    let any: Option<i64> = self
      .conn
      .call(|conn| {
        Ok(conn
          .query_row("SELECT 1 FROM trials LIMIT 1", [], |r| r.get(0))
          .optional()?)
      })
      .await?;
    Ok(any.is_none())
  }
}
