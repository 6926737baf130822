//! The paginated external query consumed by the fetcher.

use std::future::Future;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::FetchError;

/// Parameters of one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
  /// Only trials with `last_updated >= since`; `None` means everything.
  pub since:      Option<NaiveDate>,
  /// Opaque cursor from the previous page; `None` for the first page.
  pub page_token: Option<String>,
  pub page_size:  u32,
}

/// One page as returned by the source, before normalisation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage {
  #[serde(default)]
  pub studies:         Vec<serde_json::Value>,
  /// Absent on the last page.
  #[serde(default)]
  pub next_page_token: Option<String>,
}

/// A cursor-paginated source of raw trial documents.
///
/// Implementations perform exactly one request per call; retrying and
/// pacing are the fetcher's job.
pub trait PageSource: Send + Sync {
  fn fetch_page<'a>(
    &'a self,
    query: &'a PageQuery,
  ) -> impl Future<Output = Result<RawPage, FetchError>> + Send + 'a;
}
