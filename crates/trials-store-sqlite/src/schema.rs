//! SQL schema for the trials SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per trial. A newer version of a trial overwrites every column.
-- List-valued columns hold JSON arrays.
CREATE TABLE IF NOT EXISTS trials (
    nct_id          TEXT PRIMARY KEY,
    brief_title     TEXT NOT NULL DEFAULT '',
    official_title  TEXT NOT NULL DEFAULT '',
    status          TEXT NOT NULL DEFAULT '',
    study_type      TEXT NOT NULL DEFAULT '',
    phases          TEXT NOT NULL DEFAULT '[]',
    start_date      TEXT NOT NULL DEFAULT '',
    completion_date TEXT NOT NULL DEFAULT '',
    last_updated    TEXT NOT NULL DEFAULT '',   -- YYYY-MM-DD
    sponsor         TEXT NOT NULL DEFAULT '',
    sponsor_class   TEXT NOT NULL DEFAULT '',
    conditions      TEXT NOT NULL DEFAULT '[]',
    interventions   TEXT NOT NULL DEFAULT '[]', -- [{\"type\":..,\"name\":..}]
    mesh_terms      TEXT NOT NULL DEFAULT '[]',
    drug_mesh_terms TEXT NOT NULL DEFAULT '[]',
    countries       TEXT NOT NULL DEFAULT '[]',
    enrollment      INTEGER NOT NULL DEFAULT 0,
    sex             TEXT NOT NULL DEFAULT '',
    min_age         TEXT NOT NULL DEFAULT '',
    max_age         TEXT NOT NULL DEFAULT '',
    has_results     INTEGER NOT NULL DEFAULT 0,
    source_url      TEXT NOT NULL DEFAULT ''
);

-- Serves `since` range scans in (last_updated, nct_id) order.
CREATE INDEX IF NOT EXISTS idx_trials_last_updated
    ON trials (last_updated, nct_id);

PRAGMA user_version = 1;
";
