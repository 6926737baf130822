//! JSON read API for the clinical trials mirror.
//!
//! Exposes an axum [`Router`] backed by any [`trials_core::store::TrialStore`].
//! Transport concerns (binding, request tracing) are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = trials_api::api_router(store.clone());
//! ```

pub mod error;
pub mod trials;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use trials_core::store::TrialStore;

pub use error::ApiError;

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// Build the read API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: TrialStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .route("/trials", get(trials::list_since::<S>))
    .route("/trials/{nct_id}", get(trials::get_one::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
