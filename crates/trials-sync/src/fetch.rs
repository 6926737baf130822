//! Cursor-driven pagination over a [`PageSource`].
//!
//! The first request carries no cursor; each later request carries the
//! `nextPageToken` of the previous response. A missing or empty token ends
//! the sequence. Consecutive requests are separated by a fixed courtesy
//! delay, which is only paid when another page follows.
//!
//! A failed request is retried with identical parameters. When the attempt
//! budget is spent the stream yields [`Error::Fetch`] and ends; a page is
//! never skipped.

use std::time::Duration;

use chrono::NaiveDate;
use futures::{Stream, TryStreamExt as _, stream};
use serde::Deserialize;
use trials_core::{TrialRecord, normalize};

use crate::{Error, PageQuery, PageSource, RawPage, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Pacing and retry policy for one fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
  pub page_size:             u32,
  /// Pause between consecutive page requests.
  pub request_delay_ms:      u64,
  /// Total tries per page, including the first.
  pub max_attempts:          u32,
  /// Pause before retrying a failed request.
  pub retry_backoff_ms:      u64,
  /// Pause before retrying after the source answered 429.
  pub rate_limit_backoff_ms: u64,
}

impl Default for FetchConfig {
  fn default() -> Self {
    Self {
      page_size:             1000,
      request_delay_ms:      500,
      max_attempts:          3,
      retry_backoff_ms:      2_000,
      rate_limit_backoff_ms: 60_000,
    }
  }
}

impl FetchConfig {
  fn request_delay(&self) -> Duration { Duration::from_millis(self.request_delay_ms) }

  fn retry_backoff(&self) -> Duration { Duration::from_millis(self.retry_backoff_ms) }

  fn rate_limit_backoff(&self) -> Duration {
    Duration::from_millis(self.rate_limit_backoff_ms)
  }
}

// ─── Pages ───────────────────────────────────────────────────────────────────

/// One fetched page, already normalised.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
  /// 1-based position in the sequence.
  pub number: usize,
  pub trials: Vec<TrialRecord>,
}

enum Cursor {
  First,
  Next { token: String, number: usize },
  Done,
}

// ─── Fetcher ─────────────────────────────────────────────────────────────────

pub struct Fetcher<P> {
  source: P,
  config: FetchConfig,
}

impl<P: PageSource> Fetcher<P> {
  pub fn new(source: P, config: FetchConfig) -> Self { Self { source, config } }

  pub fn config(&self) -> &FetchConfig { &self.config }

  /// Lazily fetch every page matching `since`.
  ///
  /// Nothing is requested until the stream is polled. An empty result set
  /// yields a single empty page.
  pub fn pages(
    &self,
    since: Option<NaiveDate>,
  ) -> impl Stream<Item = Result<Page>> + Send + '_ {
    stream::try_unfold(Cursor::First, move |cursor| async move {
      let (page_token, number) = match cursor {
        Cursor::First => (None, 1),
        Cursor::Next { token, number } => {
          tokio::time::sleep(self.config.request_delay()).await;
          (Some(token), number)
        }
        Cursor::Done => return Ok(None),
      };

      let query = PageQuery { since, page_token, page_size: self.config.page_size };
      let raw = self.fetch_with_retry(&query, number).await?;

      let trials: Vec<TrialRecord> = raw.studies.iter().map(normalize).collect();
      let next = match raw.next_page_token.filter(|t| !t.is_empty()) {
        Some(token) => Cursor::Next { token, number: number + 1 },
        None => Cursor::Done,
      };

      tracing::debug!(
        page = number,
        records = trials.len(),
        last = matches!(next, Cursor::Done),
        "fetched page"
      );
      Ok(Some((Page { number, trials }, next)))
    })
  }

  /// Lazily fetch every record matching `since`, flattened across pages.
  pub fn records(
    &self,
    since: Option<NaiveDate>,
  ) -> impl Stream<Item = Result<TrialRecord>> + Send + '_ {
    self
      .pages(since)
      .map_ok(|page| stream::iter(page.trials.into_iter().map(Ok)))
      .try_flatten()
  }

  #[tracing::instrument(
    level = "debug",
    skip(self, query),
    fields(has_cursor = query.page_token.is_some())
  )]
  async fn fetch_with_retry(&self, query: &PageQuery, page: usize) -> Result<RawPage> {
    let max_attempts = self.config.max_attempts.max(1);
    let mut attempt = 1;
    loop {
      match self.source.fetch_page(query).await {
        Ok(raw) => return Ok(raw),
        Err(e) if attempt < max_attempts => {
          let wait = if e.is_rate_limited() {
            self.config.rate_limit_backoff()
          } else {
            self.config.retry_backoff()
          };
          tracing::warn!(
            page,
            attempt,
            max_attempts,
            error = %e,
            ?wait,
            "page request failed; retrying"
          );
          tokio::time::sleep(wait).await;
          attempt += 1;
        }
        Err(source) => {
          return Err(Error::Fetch { page, attempts: attempt, source });
        }
      }
    }
  }
}
