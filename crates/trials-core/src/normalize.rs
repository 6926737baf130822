//! Raw study document → [`TrialRecord`].
//!
//! The source document is navigated as untyped JSON so that a missing,
//! `null`, or mistyped sub-tree only ever degrades the affected field to its
//! default. Normalisation never fails.
//!
//! Text is passed through unchanged. Some upstream location names carry
//! mangled multi-byte characters; repairing them is out of scope.

use serde_json::Value;

use crate::trial::{Intervention, TrialRecord};

// ─── Navigation helpers ──────────────────────────────────────────────────────

fn at<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
  path.iter().try_fold(root, |node, key| node.get(key))
}

fn string_at(root: &Value, path: &[&str]) -> String {
  at(root, path)
    .and_then(Value::as_str)
    .map(str::to_owned)
    .unwrap_or_default()
}

fn items_at<'a>(root: &'a Value, path: &[&str]) -> impl Iterator<Item = &'a Value> {
  at(root, path)
    .and_then(Value::as_array)
    .into_iter()
    .flatten()
}

fn strings_at(root: &Value, path: &[&str]) -> Vec<String> {
  items_at(root, path)
    .filter_map(Value::as_str)
    .map(str::to_owned)
    .collect()
}

/// `meshes: [{"id": "...", "term": "..."}]` → terms.
fn mesh_terms_at(root: &Value, path: &[&str]) -> Vec<String> {
  items_at(root, path)
    .filter_map(|m| m.get("term").and_then(Value::as_str))
    .map(str::to_owned)
    .collect()
}

/// Accepts `42`, `42.0` and `"42"`; anything else is `0`.
fn count(value: Option<&Value>) -> u32 {
  let n = match value {
    Some(Value::Number(n)) => n.as_u64().or_else(|| {
      n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= 0.0)
        .map(|f| f as u64)
    }),
    Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
    _ => None,
  };
  n.and_then(|n| u32::try_from(n).ok()).unwrap_or(0)
}

// ─── Normaliser ──────────────────────────────────────────────────────────────

const PROTOCOL: &str = "protocolSection";
const DERIVED: &str = "derivedSection";

/// Map one raw ClinicalTrials.gov v2 study to the flat record shape.
pub fn normalize(raw: &Value) -> TrialRecord {
  let empty = Value::Null;
  let protocol = raw.get(PROTOCOL).unwrap_or(&empty);
  let derived = raw.get(DERIVED).unwrap_or(&empty);

  let nct_id = string_at(protocol, &["identificationModule", "nctId"]);

  let interventions = items_at(protocol, &["armsInterventionsModule", "interventions"])
    .filter(|iv| iv.is_object())
    .map(|iv| Intervention {
      kind: string_at(iv, &["type"]),
      name: string_at(iv, &["name"]),
    })
    .collect();

  let mut countries: Vec<String> = Vec::new();
  for country in items_at(protocol, &["contactsLocationsModule", "locations"])
    .filter_map(|loc| loc.get("country").and_then(Value::as_str))
    .filter(|c| !c.is_empty())
  {
    if !countries.iter().any(|seen| seen == country) {
      countries.push(country.to_owned());
    }
  }

  TrialRecord {
    brief_title: string_at(protocol, &["identificationModule", "briefTitle"]),
    official_title: string_at(protocol, &["identificationModule", "officialTitle"]),
    status: string_at(protocol, &["statusModule", "overallStatus"]),
    study_type: string_at(protocol, &["designModule", "studyType"]),
    phases: strings_at(protocol, &["designModule", "phases"]),
    start_date: string_at(protocol, &["statusModule", "startDateStruct", "date"]),
    completion_date: string_at(protocol, &["statusModule", "completionDateStruct", "date"]),
    last_updated: string_at(protocol, &["statusModule", "lastUpdatePostDateStruct", "date"]),
    sponsor: string_at(protocol, &["sponsorCollaboratorsModule", "leadSponsor", "name"]),
    sponsor_class: string_at(protocol, &["sponsorCollaboratorsModule", "leadSponsor", "class"]),
    conditions: strings_at(protocol, &["conditionsModule", "conditions"]),
    interventions,
    mesh_terms: mesh_terms_at(derived, &["conditionBrowseModule", "meshes"]),
    drug_mesh_terms: mesh_terms_at(derived, &["interventionBrowseModule", "meshes"]),
    countries,
    enrollment: count(at(protocol, &["designModule", "enrollmentInfo", "count"])),
    sex: string_at(protocol, &["eligibilityModule", "sex"]),
    min_age: string_at(protocol, &["eligibilityModule", "minimumAge"]),
    max_age: string_at(protocol, &["eligibilityModule", "maximumAge"]),
    has_results: raw.get("hasResults").and_then(Value::as_bool).unwrap_or(false),
    source_url: TrialRecord::study_url(&nct_id),
    nct_id,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn full_study() -> Value {
    json!({
      "protocolSection": {
        "identificationModule": {
          "nctId": "NCT07137416",
          "briefTitle": "Aspirin in Migraine",
          "officialTitle": "A Randomised Trial of Aspirin in Migraine"
        },
        "statusModule": {
          "overallStatus": "RECRUITING",
          "startDateStruct": { "date": "2025-03" },
          "completionDateStruct": { "date": "2027-01-31" },
          "lastUpdatePostDateStruct": { "date": "2026-02-20" }
        },
        "sponsorCollaboratorsModule": {
          "leadSponsor": { "name": "Acme Pharma", "class": "INDUSTRY" }
        },
        "conditionsModule": { "conditions": ["Migraine", "Headache"] },
        "designModule": {
          "studyType": "INTERVENTIONAL",
          "phases": ["PHASE2", "PHASE3"],
          "enrollmentInfo": { "count": 120, "type": "ESTIMATED" }
        },
        "armsInterventionsModule": {
          "interventions": [
            { "type": "DRUG", "name": "Aspirin" },
            { "type": "DRUG", "name": "Placebo" }
          ]
        },
        "eligibilityModule": {
          "sex": "ALL",
          "minimumAge": "18 Years",
          "maximumAge": "65 Years"
        },
        "contactsLocationsModule": {
          "locations": [
            { "city": "Boston", "country": "United States" },
            { "city": "Köln", "country": "Germany" },
            { "city": "Denver", "country": "United States" },
            { "city": "Nowhere" }
          ]
        }
      },
      "derivedSection": {
        "conditionBrowseModule": {
          "meshes": [{ "id": "D008881", "term": "Migraine Disorders" }]
        },
        "interventionBrowseModule": {
          "meshes": [{ "id": "D001241", "term": "Aspirin" }]
        }
      },
      "hasResults": true
    })
  }

  #[test]
  fn normalizes_fully_populated_study() {
    let t = normalize(&full_study());

    assert_eq!(t.nct_id, "NCT07137416");
    assert_eq!(t.brief_title, "Aspirin in Migraine");
    assert_eq!(t.official_title, "A Randomised Trial of Aspirin in Migraine");
    assert_eq!(t.status, "RECRUITING");
    assert_eq!(t.study_type, "INTERVENTIONAL");
    assert_eq!(t.phases, ["PHASE2", "PHASE3"]);
    assert_eq!(t.start_date, "2025-03");
    assert_eq!(t.completion_date, "2027-01-31");
    assert_eq!(t.last_updated, "2026-02-20");
    assert_eq!(t.sponsor, "Acme Pharma");
    assert_eq!(t.sponsor_class, "INDUSTRY");
    assert_eq!(t.conditions, ["Migraine", "Headache"]);
    assert_eq!(t.interventions, vec![
      Intervention { kind: "DRUG".into(), name: "Aspirin".into() },
      Intervention { kind: "DRUG".into(), name: "Placebo".into() },
    ]);
    assert_eq!(t.mesh_terms, ["Migraine Disorders"]);
    assert_eq!(t.drug_mesh_terms, ["Aspirin"]);
    assert_eq!(t.countries, ["United States", "Germany"]);
    assert_eq!(t.enrollment, 120);
    assert_eq!(t.sex, "ALL");
    assert_eq!(t.min_age, "18 Years");
    assert_eq!(t.max_age, "65 Years");
    assert!(t.has_results);
    assert_eq!(t.source_url, "https://clinicaltrials.gov/study/NCT07137416");
  }

  #[test]
  fn missing_interventions_become_empty_list() {
    let mut raw = full_study();
    raw["protocolSection"]
      .as_object_mut()
      .unwrap()
      .remove("armsInterventionsModule");

    let t = normalize(&raw);
    assert!(t.interventions.is_empty());

    let mut expected = normalize(&full_study());
    expected.interventions.clear();
    assert_eq!(t, expected);
  }

  #[test]
  fn empty_document_yields_defaults() {
    let t = normalize(&json!({}));
    let expected = TrialRecord {
      source_url: "https://clinicaltrials.gov/study/".into(),
      ..TrialRecord::default()
    };
    assert_eq!(t, expected);
    assert!(t.ensure_key().is_err());
  }

  #[test]
  fn nulls_and_wrong_types_degrade_to_defaults() {
    let raw = json!({
      "protocolSection": {
        "identificationModule": { "nctId": "NCT00000001", "briefTitle": null },
        "statusModule": { "lastUpdatePostDateStruct": null },
        "designModule": {
          "phases": "PHASE1",
          "enrollmentInfo": { "count": "not a number" }
        },
        "armsInterventionsModule": { "interventions": [null, { "name": "Saline" }] },
        "contactsLocationsModule": { "locations": { "country": "France" } }
      },
      "derivedSection": null,
      "hasResults": "yes"
    });

    let t = normalize(&raw);
    assert_eq!(t.nct_id, "NCT00000001");
    assert_eq!(t.brief_title, "");
    assert_eq!(t.last_updated, "");
    assert!(t.phases.is_empty());
    assert_eq!(t.enrollment, 0);
    assert_eq!(t.interventions, vec![Intervention {
      kind: String::new(),
      name: "Saline".into(),
    }]);
    assert!(t.countries.is_empty());
    assert!(t.mesh_terms.is_empty());
    assert!(!t.has_results);
  }

  #[test]
  fn enrollment_accepts_numeric_strings_and_integral_floats() {
    assert_eq!(count(Some(&json!("250"))), 250);
    assert_eq!(count(Some(&json!(250.0))), 250);
    assert_eq!(count(Some(&json!(12.5))), 0);
    assert_eq!(count(Some(&json!(-3))), 0);
    assert_eq!(count(None), 0);
  }

  #[test]
  fn mangled_text_passes_through() {
    let mut raw = full_study();
    raw["protocolSection"]["contactsLocationsModule"]["locations"] =
      json!([{ "country": "CÃ´te d'Ivoire" }]);
    assert_eq!(normalize(&raw).countries, ["CÃ´te d'Ivoire"]);
  }
}
