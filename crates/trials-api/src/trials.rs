//! Handlers for `/trials` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/trials` | `?since=YYYY-MM-DD` required; inclusive lower bound on `last_updated` |
//! | `GET`  | `/trials/{nct_id}` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use trials_core::{TrialRecord, store::TrialStore, watermark};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SinceParams {
  /// ISO date, e.g. `2026-02-20`.
  pub since: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrialsPage {
  pub count:  usize,
  pub trials: Vec<TrialRecord>,
}

/// `GET /trials?since=<date>`
pub async fn list_since<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SinceParams>,
) -> Result<Json<TrialsPage>, ApiError>
where
  S: TrialStore,
{
  let raw = params
    .since
    .ok_or_else(|| ApiError::BadRequest("missing query parameter `since`".into()))?;
  let since = watermark::parse_date(&raw)?;

  let trials = store
    .since(since)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(TrialsPage { count: trials.len(), trials }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /trials/{nct_id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(nct_id): Path<String>,
) -> Result<Json<TrialRecord>, ApiError>
where
  S: TrialStore,
{
  let trial = store
    .get(&nct_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("trial {nct_id} not found")))?;
  Ok(Json(trial))
}
