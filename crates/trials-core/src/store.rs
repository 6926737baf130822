//! The `TrialStore` trait.
//!
//! Implemented by storage backends (e.g. `trials-store-sqlite`). The sync
//! engine and the read API depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::trial::TrialRecord;

/// Abstraction over the mirror's persistent store.
///
/// Writes are upserts keyed by `nct_id`: a record replaces any stored record
/// with the same key in full. The store keeps an ordering index on
/// `last_updated` that is updated together with every row, so
/// [`TrialStore::since`] never observes a row without its current index
/// entry.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TrialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert or overwrite a single record.
  fn upsert(
    &self,
    trial: TrialRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert or overwrite every record in `trials`, in iteration order.
  ///
  /// When two entries share a key the later one wins. Returns the number of
  /// rows written.
  fn upsert_many(
    &self,
    trials: Vec<TrialRecord>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a record by `nct_id`. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    nct_id: &'a str,
  ) -> impl Future<Output = Result<Option<TrialRecord>, Self::Error>> + Send + 'a;

  /// Every record with `last_updated >= date`, ordered by `last_updated`
  /// then `nct_id`.
  fn since(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<TrialRecord>, Self::Error>> + Send + '_;

  /// Total number of stored records.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// `true` if no record has ever been stored.
  fn is_empty(&self) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
