//! Scripted in-memory [`PageSource`] shared by the fetcher and sync tests.

use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
};

use serde_json::{Value, json};

use crate::{FetchConfig, FetchError, PageQuery, PageSource, RawPage};

#[derive(Default)]
struct Script {
  responses: VecDeque<Result<RawPage, FetchError>>,
  requests:  Vec<PageQuery>,
}

/// Replays a fixed sequence of responses, one per request, and records every
/// query it receives. Clones share the same script.
#[derive(Clone, Default)]
pub struct ScriptedSource {
  script: Arc<Mutex<Script>>,
}

impl ScriptedSource {
  pub fn new(responses: impl IntoIterator<Item = Result<RawPage, FetchError>>) -> Self {
    let script = Script { responses: responses.into_iter().collect(), requests: Vec::new() };
    Self { script: Arc::new(Mutex::new(script)) }
  }

  /// Queue more responses behind the remaining ones.
  pub fn push(&self, responses: impl IntoIterator<Item = Result<RawPage, FetchError>>) {
    self.script.lock().unwrap().responses.extend(responses);
  }

  pub fn requests(&self) -> Vec<PageQuery> { self.script.lock().unwrap().requests.clone() }
}

impl PageSource for ScriptedSource {
  async fn fetch_page(&self, query: &PageQuery) -> Result<RawPage, FetchError> {
    let mut script = self.script.lock().unwrap();
    script.requests.push(query.clone());
    script
      .responses
      .pop_front()
      .unwrap_or_else(|| panic!("unscripted request: {query:?}"))
  }
}

/// Retry budget of 3 with every pause set to zero.
pub fn fast_config() -> FetchConfig {
  FetchConfig {
    page_size:             100,
    request_delay_ms:      0,
    max_attempts:          3,
    retry_backoff_ms:      0,
    rate_limit_backoff_ms: 0,
  }
}

/// A minimal raw study updated on `2026-02-20`.
pub fn study(nct_id: &str) -> Value { study_updated(nct_id, "2026-02-20") }

pub fn study_updated(nct_id: &str, last_updated: &str) -> Value {
  json!({
    "protocolSection": {
      "identificationModule": { "nctId": nct_id, "briefTitle": format!("Study {nct_id}") },
      "statusModule": {
        "overallStatus": "RECRUITING",
        "lastUpdatePostDateStruct": { "date": last_updated }
      }
    },
    "hasResults": false
  })
}

pub fn page(ids: &[&str], next: Option<&str>) -> RawPage {
  RawPage {
    studies:         ids.iter().map(|id| study(id)).collect(),
    next_page_token: next.map(str::to_owned),
  }
}
