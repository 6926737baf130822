//! Error type for `trials-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error in column {column}: {source}")]
  Json {
    column: &'static str,
    #[source]
    source: serde_json::Error,
  },

  /// A stored value that cannot be mapped back onto a [`TrialRecord`].
  ///
  /// [`TrialRecord`]: trials_core::TrialRecord
  #[error("corrupt row {nct_id}: {reason}")]
  CorruptRow { nct_id: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
