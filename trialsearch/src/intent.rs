//! Query intent: the structured form of a free-text search query.
//!
//! The [`IntentParser`] is the sole boundary where unstructured text becomes
//! structured intent. Implementations send the user's query to a language
//! model constrained to a fixed JSON schema; everything downstream works
//! with the resulting [`SearchIntent`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// System instruction for the intent-extraction model.
///
/// The model is told to populate only values explicitly present in the
/// query; this is a contract placed on the model, not re-validated here.
pub const INTENT_SYSTEM_PROMPT: &str = "\
You are a doctor, and your task is to parse clinical trial search queries into:
- structured filters
- semantic search phrases

Given a user's natural language input, output:
1. key: \"type\". values can be: ['', 'OBSERVATIONAL', 'INTERVENTIONAL']
2. key: \"criteria_sex\". values can be: ['', 'FEMALE', 'MALE']
3. key: \"criteria_age\". values can be: ['', 'CHILD', 'ADULT', 'OLDER_ADULT']
4. key: \"location\". value: specific location mentioned (city, state, zip code, etc.) or '' if none specified
5. key: \"distance_miles\". value: numeric distance in miles or 50 if location specified but no distance
6. key: \"semantic_phrases\". value: a cleaned-up set of terms on conditions and treatments for semantic embedding search

Only include values that are explicitly mentioned in the query.
If a location is mentioned but no distance, use 50 miles as the default.";

/// Structured filter intent extracted from one free-text query.
///
/// Every field defaults to empty/zero so an unrecognized or missing key in
/// the model's response degrades to "unspecified" rather than failing
/// deserialization. Created per request, echoed in each result, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchIntent {
    /// Study type filter: `""`, `INTERVENTIONAL`, or `OBSERVATIONAL`.
    #[serde(rename = "type", default)]
    pub study_type: String,
    /// Sex eligibility filter: `""`, `FEMALE`, or `MALE`.
    #[serde(default)]
    pub criteria_sex: String,
    /// Age bracket filter: `""`, `CHILD`, `ADULT`, or `OLDER_ADULT`.
    #[serde(default)]
    pub criteria_age: String,
    /// Free-text location, or `""` when the query names none.
    #[serde(default)]
    pub location: String,
    /// Search radius in miles; meaningful only when `location` is non-empty.
    #[serde(default)]
    pub distance_miles: u32,
    /// Cleaned-up condition/treatment terms used for the embedding search.
    #[serde(default)]
    pub semantic_phrases: String,
}

/// Extracts a [`SearchIntent`] from raw user text.
#[async_trait]
pub trait IntentParser: Send + Sync {
    /// Parse one free-text query into structured intent.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::IntentError`](crate::SearchError::IntentError)
    /// when the model call fails or its response does not deserialize into
    /// the intent schema.
    async fn parse(&self, query: &str) -> Result<SearchIntent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_response_deserializes() {
        let intent: SearchIntent = serde_json::from_str(
            r#"{
                "type": "INTERVENTIONAL",
                "criteria_sex": "FEMALE",
                "criteria_age": "ADULT",
                "location": "Boston",
                "distance_miles": 20,
                "semantic_phrases": "breast cancer"
            }"#,
        )
        .unwrap();
        assert_eq!(intent.study_type, "INTERVENTIONAL");
        assert_eq!(intent.criteria_sex, "FEMALE");
        assert_eq!(intent.location, "Boston");
        assert_eq!(intent.distance_miles, 20);
        assert_eq!(intent.semantic_phrases, "breast cancer");
    }

    #[test]
    fn missing_fields_default_to_unspecified() {
        let intent: SearchIntent =
            serde_json::from_str(r#"{"semantic_phrases": "diabetes"}"#).unwrap();
        assert_eq!(intent.study_type, "");
        assert_eq!(intent.criteria_sex, "");
        assert_eq!(intent.criteria_age, "");
        assert_eq!(intent.location, "");
        assert_eq!(intent.distance_miles, 0);
        assert_eq!(intent.semantic_phrases, "diabetes");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let intent: SearchIntent =
            serde_json::from_str(r#"{"semantic_phrases": "asthma", "status": "RECRUITING"}"#)
                .unwrap();
        assert_eq!(intent.semantic_phrases, "asthma");
    }

    #[test]
    fn intent_serializes_with_wire_field_names() {
        let intent = SearchIntent { study_type: "OBSERVATIONAL".into(), ..Default::default() };
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value["type"], "OBSERVATIONAL");
        assert!(value.get("study_type").is_none());
    }
}
