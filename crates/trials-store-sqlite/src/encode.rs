//! Encoding and decoding helpers between [`TrialRecord`] and the plain
//! column values stored in SQLite.
//!
//! List-valued fields are stored as compact JSON arrays. `has_results` is an
//! `INTEGER` 0/1 and `enrollment` a signed 64-bit integer.

use serde::{Serialize, de::DeserializeOwned};
use trials_core::TrialRecord;

use crate::{Error, Result};

// ─── Column list ─────────────────────────────────────────────────────────────

/// Column order shared by the upsert statement and every `SELECT`.
pub const COLUMNS: &str = "nct_id, brief_title, official_title, status, study_type, phases, \
   start_date, completion_date, last_updated, sponsor, sponsor_class, conditions, \
   interventions, mesh_terms, drug_mesh_terms, countries, enrollment, sex, min_age, \
   max_age, has_results, source_url";

/// Insert-or-overwrite on `nct_id`. Every non-key column is replaced, so no
/// field of a previous version survives.
pub const UPSERT_SQL: &str = "INSERT INTO trials (
     nct_id, brief_title, official_title, status, study_type, phases,
     start_date, completion_date, last_updated, sponsor, sponsor_class, conditions,
     interventions, mesh_terms, drug_mesh_terms, countries, enrollment, sex, min_age,
     max_age, has_results, source_url
   ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
             ?17, ?18, ?19, ?20, ?21, ?22)
   ON CONFLICT(nct_id) DO UPDATE SET
     brief_title     = excluded.brief_title,
     official_title  = excluded.official_title,
     status          = excluded.status,
     study_type      = excluded.study_type,
     phases          = excluded.phases,
     start_date      = excluded.start_date,
     completion_date = excluded.completion_date,
     last_updated    = excluded.last_updated,
     sponsor         = excluded.sponsor,
     sponsor_class   = excluded.sponsor_class,
     conditions      = excluded.conditions,
     interventions   = excluded.interventions,
     mesh_terms      = excluded.mesh_terms,
     drug_mesh_terms = excluded.drug_mesh_terms,
     countries       = excluded.countries,
     enrollment      = excluded.enrollment,
     sex             = excluded.sex,
     min_age         = excluded.min_age,
     max_age         = excluded.max_age,
     has_results     = excluded.has_results,
     source_url      = excluded.source_url";

// ─── Lists ───────────────────────────────────────────────────────────────────

fn encode_list<T: Serialize>(column: &'static str, items: &[T]) -> Result<String> {
  serde_json::to_string(items).map_err(|source| Error::Json { column, source })
}

fn decode_list<T: DeserializeOwned>(column: &'static str, s: &str) -> Result<Vec<T>> {
  if s.is_empty() {
    return Ok(Vec::new());
  }
  serde_json::from_str(s).map_err(|source| Error::Json { column, source })
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column values of one `trials` row, in [`COLUMNS`] order.
#[derive(Debug, Clone)]
pub struct RawTrial {
  pub nct_id:          String,
  pub brief_title:     String,
  pub official_title:  String,
  pub status:          String,
  pub study_type:      String,
  pub phases:          String,
  pub start_date:      String,
  pub completion_date: String,
  pub last_updated:    String,
  pub sponsor:         String,
  pub sponsor_class:   String,
  pub conditions:      String,
  pub interventions:   String,
  pub mesh_terms:      String,
  pub drug_mesh_terms: String,
  pub countries:       String,
  pub enrollment:      i64,
  pub sex:             String,
  pub min_age:         String,
  pub max_age:         String,
  pub has_results:     bool,
  pub source_url:      String,
}

impl RawTrial {
  pub fn encode(t: TrialRecord) -> Result<Self> {
    Ok(Self {
      phases:          encode_list("phases", &t.phases)?,
      conditions:      encode_list("conditions", &t.conditions)?,
      interventions:   encode_list("interventions", &t.interventions)?,
      mesh_terms:      encode_list("mesh_terms", &t.mesh_terms)?,
      drug_mesh_terms: encode_list("drug_mesh_terms", &t.drug_mesh_terms)?,
      countries:       encode_list("countries", &t.countries)?,
      enrollment:      i64::from(t.enrollment),
      nct_id:          t.nct_id,
      brief_title:     t.brief_title,
      official_title:  t.official_title,
      status:          t.status,
      study_type:      t.study_type,
      start_date:      t.start_date,
      completion_date: t.completion_date,
      last_updated:    t.last_updated,
      sponsor:         t.sponsor,
      sponsor_class:   t.sponsor_class,
      sex:             t.sex,
      min_age:         t.min_age,
      max_age:         t.max_age,
      has_results:     t.has_results,
      source_url:      t.source_url,
    })
  }

  /// Read a row selected with [`COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      nct_id:          row.get(0)?,
      brief_title:     row.get(1)?,
      official_title:  row.get(2)?,
      status:          row.get(3)?,
      study_type:      row.get(4)?,
      phases:          row.get(5)?,
      start_date:      row.get(6)?,
      completion_date: row.get(7)?,
      last_updated:    row.get(8)?,
      sponsor:         row.get(9)?,
      sponsor_class:   row.get(10)?,
      conditions:      row.get(11)?,
      interventions:   row.get(12)?,
      mesh_terms:      row.get(13)?,
      drug_mesh_terms: row.get(14)?,
      countries:       row.get(15)?,
      enrollment:      row.get(16)?,
      sex:             row.get(17)?,
      min_age:         row.get(18)?,
      max_age:         row.get(19)?,
      has_results:     row.get(20)?,
      source_url:      row.get(21)?,
    })
  }

  /// Bind as `?1..?22` of [`UPSERT_SQL`].
  pub fn execute_upsert(&self, stmt: &mut rusqlite::Statement<'_>) -> rusqlite::Result<usize> {
    stmt.execute(rusqlite::params![
      self.nct_id,
      self.brief_title,
      self.official_title,
      self.status,
      self.study_type,
      self.phases,
      self.start_date,
      self.completion_date,
      self.last_updated,
      self.sponsor,
      self.sponsor_class,
      self.conditions,
      self.interventions,
      self.mesh_terms,
      self.drug_mesh_terms,
      self.countries,
      self.enrollment,
      self.sex,
      self.min_age,
      self.max_age,
      self.has_results,
      self.source_url,
    ])
  }

  pub fn into_trial(self) -> Result<TrialRecord> {
    let enrollment = u32::try_from(self.enrollment).map_err(|_| Error::CorruptRow {
      nct_id: self.nct_id.clone(),
      reason: format!("enrollment {} out of range", self.enrollment),
    })?;

    Ok(TrialRecord {
      phases: decode_list("phases", &self.phases)?,
      conditions: decode_list("conditions", &self.conditions)?,
      interventions: decode_list("interventions", &self.interventions)?,
      mesh_terms: decode_list("mesh_terms", &self.mesh_terms)?,
      drug_mesh_terms: decode_list("drug_mesh_terms", &self.drug_mesh_terms)?,
      countries: decode_list("countries", &self.countries)?,
      enrollment,
      nct_id: self.nct_id,
      brief_title: self.brief_title,
      official_title: self.official_title,
      status: self.status,
      study_type: self.study_type,
      start_date: self.start_date,
      completion_date: self.completion_date,
      last_updated: self.last_updated,
      sponsor: self.sponsor,
      sponsor_class: self.sponsor_class,
      sex: self.sex,
      min_age: self.min_age,
      max_age: self.max_age,
      has_results: self.has_results,
      source_url: self.source_url,
    })
  }
}
