//! ClinicalTrials.gov API v2 implementation of [`PageSource`].

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use trials_core::watermark::format_date;

use crate::{Error, FetchError, PageQuery, PageSource, RawPage, Result};

pub const DEFAULT_BASE_URL: &str = "https://clinicaltrials.gov/api/v2/studies";

/// Connection settings for the studies endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  pub base_url:     String,
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url:     DEFAULT_BASE_URL.to_owned(),
      timeout_secs: 30,
    }
  }
}

/// Async HTTP client for `GET /api/v2/studies`.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ClinicalTrialsClient {
  client:   Client,
  base_url: String,
}

impl ClinicalTrialsClient {
  pub fn new(config: &ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, base_url: config.base_url.clone() })
  }
}

/// Query-string parameters for one page request.
///
/// The since-date filter uses the source's search syntax on
/// `LastUpdatePostDate` with an inclusive lower bound.
pub fn query_params(query: &PageQuery) -> Vec<(&'static str, String)> {
  let mut params = vec![
    ("format", "json".to_owned()),
    ("pageSize", query.page_size.to_string()),
  ];
  if let Some(since) = query.since {
    params.push((
      "query.term",
      format!("AREA[LastUpdatePostDate]RANGE[{},MAX]", format_date(since)),
    ));
  }
  if let Some(token) = &query.page_token {
    params.push(("pageToken", token.clone()));
  }
  params
}

impl PageSource for ClinicalTrialsClient {
  async fn fetch_page(&self, query: &PageQuery) -> Result<RawPage, FetchError> {
    let resp = self
      .client
      .get(&self.base_url)
      .query(&query_params(query))
      .send()
      .await?;

    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
      return Err(FetchError::RateLimited);
    }
    if !status.is_success() {
      return Err(FetchError::Status(status));
    }

    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
  }
}
