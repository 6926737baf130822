//! Error types for `trials-sync`.

use thiserror::Error;

/// A failed page request. Every variant is treated as transient and retried
/// by the [`Fetcher`](crate::Fetcher) until its attempt budget runs out.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("source returned status {0}")]
  Status(reqwest::StatusCode),

  #[error("rate limited by source")]
  RateLimited,

  #[error("malformed response body: {0}")]
  Decode(#[from] serde_json::Error),
}

impl FetchError {
  pub fn is_rate_limited(&self) -> bool { matches!(self, Self::RateLimited) }
}

#[derive(Debug, Error)]
pub enum Error {
  /// Retries for one page were exhausted; the run cannot be complete.
  #[error("fetching page {page} failed after {attempts} attempt(s): {source}")]
  Fetch {
    page:     usize,
    attempts: u32,
    #[source]
    source:   FetchError,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
