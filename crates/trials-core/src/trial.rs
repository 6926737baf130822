//! The canonical flat trial record.
//!
//! One [`TrialRecord`] is stored per `nct_id`. A newer version of the same
//! trial replaces the stored row in full; fields are never merged.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Base URL for the public study page; the `nct_id` is appended.
pub const STUDY_URL_BASE: &str = "https://clinicaltrials.gov/study/";

/// One intervention arm entry, e.g. `{"type": "DRUG", "name": "Aspirin"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervention {
  #[serde(rename = "type")]
  pub kind: String,
  pub name: String,
}

/// A clinical trial in the mirror's flat shape.
///
/// Every field is always present; absent source data is represented by the
/// empty string, an empty list, `0` or `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
  /// External identity, e.g. `NCT07137416`.
  pub nct_id:          String,
  pub brief_title:     String,
  pub official_title:  String,
  pub status:          String,
  pub study_type:      String,
  pub phases:          Vec<String>,
  /// Source dates may be partial (`2025-03`), so they are kept verbatim.
  pub start_date:      String,
  pub completion_date: String,
  /// The incremental-sync watermark, `YYYY-MM-DD`.
  pub last_updated:    String,
  pub sponsor:         String,
  pub sponsor_class:   String,
  pub conditions:      Vec<String>,
  pub interventions:   Vec<Intervention>,
  pub mesh_terms:      Vec<String>,
  pub drug_mesh_terms: Vec<String>,
  pub countries:       Vec<String>,
  pub enrollment:      u32,
  pub sex:             String,
  pub min_age:         String,
  pub max_age:         String,
  pub has_results:     bool,
  pub source_url:      String,
}

impl TrialRecord {
  /// Public study page for `nct_id`.
  pub fn study_url(nct_id: &str) -> String { format!("{STUDY_URL_BASE}{nct_id}") }

  /// Reject records that cannot be keyed in the store.
  pub fn ensure_key(&self) -> Result<()> {
    if self.nct_id.trim().is_empty() {
      return Err(Error::MissingKey);
    }
    Ok(())
  }
}
