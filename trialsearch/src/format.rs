//! Result formatting: normalizing stored payload encodings for clients.
//!
//! Several payload fields arrive as stringified lists (`"['PHASE1', 'PHASE2']"`)
//! or sentinel values (`"['NA']"`); clients get flat comma-separated text and
//! a uniform shape across all results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::intent::SearchIntent;
use crate::trial::{nct_from_point_id, SearchHit};

/// A client-facing search result: the trial's payload normalized, its
/// similarity score, and an echo of the resolved query intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSummary {
    /// Registry identifier in canonical `NCT########` form.
    pub id: String,
    /// Similarity score from the vector search.
    pub rank: f32,
    /// Short trial title.
    pub brief_title: String,
    /// Conditions under study, comma-separated.
    pub conditions_treated: String,
    /// Study start date.
    pub start_date: String,
    /// Overall recruitment status.
    pub status: String,
    /// Study type (`INTERVENTIONAL` | `OBSERVATIONAL`).
    #[serde(rename = "type")]
    pub study_type: String,
    /// Trial phases, comma-separated.
    pub phase: String,
    /// Lead sponsor name.
    pub sponsor: String,
    /// Eligible age brackets, comma-separated.
    pub criteria_age: String,
    /// Sex eligibility (`ALL` | `FEMALE` | `MALE`).
    pub criteria_sex: String,
    /// Raw stored site coordinates; `"[]"` when the trial has none.
    pub lat_lon: String,
    /// The structured intent this result was retrieved under.
    pub search_params: SearchIntent,
}

/// Normalize a stored payload value for display.
///
/// A missing value or the `['NA']` sentinel becomes empty text. A
/// stringified list is flattened to its comma-separated elements with the
/// quoting stripped. Anything else passes through unchanged.
pub fn clean_value(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(raw) => raw.trim(),
        None => return String::new(),
    };
    if raw.is_empty() || raw == "['NA']" {
        return String::new();
    }
    let Some(inner) = raw.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) else {
        return raw.to_string();
    };
    inner
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"'))
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Re-express a store point id in canonical `NCT########` form.
///
/// Handles both numeric ids (written by the population path) and ids that
/// already carry the prefix; anything unrecognizable passes through.
pub fn canonical_nct_id(id: &str) -> String {
    if id.starts_with("NCT") {
        return id.to_string();
    }
    match id.parse::<u64>() {
        Ok(numeric) => nct_from_point_id(numeric),
        Err(_) => id.to_string(),
    }
}

fn field<'a>(payload: &'a HashMap<String, String>, key: &str) -> &'a str {
    payload.get(key).map(String::as_str).unwrap_or("")
}

/// Shape one search hit for client consumption.
pub fn format_hit(hit: &SearchHit, intent: &SearchIntent) -> TrialSummary {
    TrialSummary {
        id: canonical_nct_id(&hit.id),
        rank: hit.score,
        brief_title: field(&hit.payload, "brief_title").to_string(),
        conditions_treated: clean_value(hit.payload.get("conditions_treated").map(String::as_str)),
        start_date: field(&hit.payload, "start_date").to_string(),
        status: field(&hit.payload, "status").to_string(),
        study_type: field(&hit.payload, "type").to_string(),
        phase: clean_value(hit.payload.get("phase").map(String::as_str)),
        sponsor: field(&hit.payload, "sponsor").to_string(),
        criteria_age: clean_value(hit.payload.get("criteria_age").map(String::as_str)),
        criteria_sex: field(&hit.payload, "criteria_sex").to_string(),
        lat_lon: hit.payload.get("lat_lon").cloned().unwrap_or_else(|| "[]".to_string()),
        search_params: intent.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_na_values_become_empty() {
        assert_eq!(clean_value(None), "");
        assert_eq!(clean_value(Some("")), "");
        assert_eq!(clean_value(Some("['NA']")), "");
    }

    #[test]
    fn stringified_lists_flatten_to_comma_separated_text() {
        assert_eq!(clean_value(Some("['PHASE1', 'PHASE2']")), "PHASE1, PHASE2");
        assert_eq!(clean_value(Some("['Breast Cancer']")), "Breast Cancer");
    }

    #[test]
    fn compound_age_variants_flatten_cleanly() {
        assert_eq!(clean_value(Some("['CHILD, ADULT']")), "CHILD, ADULT");
        assert_eq!(
            clean_value(Some("['CHILD', 'ADULT', 'OLDER_ADULT']")),
            "CHILD, ADULT, OLDER_ADULT"
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(clean_value(Some("Massachusetts General Hospital")), "Massachusetts General Hospital");
    }

    #[test]
    fn numeric_and_prefixed_ids_both_canonicalize() {
        assert_eq!(canonical_nct_id("6313437"), "NCT06313437");
        assert_eq!(canonical_nct_id("NCT06313437"), "NCT06313437");
        assert_eq!(canonical_nct_id("not-an-id"), "not-an-id");
    }

    #[test]
    fn formatted_hit_has_uniform_shape() {
        let mut payload = HashMap::new();
        payload.insert("brief_title".to_string(), "A Study".to_string());
        payload.insert("conditions_treated".to_string(), "['Asthma', 'COPD']".to_string());
        payload.insert("type".to_string(), "INTERVENTIONAL".to_string());
        payload.insert("criteria_age".to_string(), "['ADULT, OLDER_ADULT']".to_string());
        let hit = SearchHit { id: "12345".to_string(), score: 0.87, payload };

        let summary = format_hit(&hit, &SearchIntent::default());
        assert_eq!(summary.id, "NCT00012345");
        assert_eq!(summary.rank, 0.87);
        assert_eq!(summary.conditions_treated, "Asthma, COPD");
        assert_eq!(summary.criteria_age, "ADULT, OLDER_ADULT");
        // Absent fields come back empty, absent coordinates as an empty list.
        assert_eq!(summary.sponsor, "");
        assert_eq!(summary.lat_lon, "[]");
    }
}
