//! Data types for stored trial points and search hits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// A clinical trial as stored in the vector index.
///
/// The embedding is derived from the trial's title, summary, and detailed
/// description. All payload values are strings; several carry stringified
/// lists inherited from the upstream registry export (see [`crate::filter`]
/// and [`crate::format`] for how those are matched and normalized).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialPoint {
    /// Numeric point id: the registry identifier with the `NCT` prefix stripped.
    pub id: u64,
    /// The similarity vector for this trial.
    pub embedding: Vec<f32>,
    /// Categorical and text attributes keyed by payload field name.
    pub payload: HashMap<String, String>,
}

/// A trial returned from a vector store search, with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The store's native point id rendered as a string.
    ///
    /// Numeric for points written through [`TrialPoint`]; other backends may
    /// return string ids. [`crate::format::canonical_nct_id`] normalizes both.
    pub id: String,
    /// The similarity score (higher is more relevant).
    pub score: f32,
    /// The stored payload attributes.
    pub payload: HashMap<String, String>,
}

/// Convert a registry identifier (`NCT01234567`) to its numeric point id.
pub fn point_id_from_nct(nct_id: &str) -> Result<u64> {
    let digits = nct_id.strip_prefix("NCT").unwrap_or(nct_id);
    digits
        .parse::<u64>()
        .map_err(|_| SearchError::PipelineError(format!("'{nct_id}' is not a valid NCT identifier")))
}

/// Render a numeric point id in canonical `NCT########` form.
pub fn nct_from_point_id(id: u64) -> String {
    format!("NCT{id:08}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nct_round_trips_through_point_id() {
        let id = point_id_from_nct("NCT06313437").unwrap();
        assert_eq!(id, 6_313_437);
        assert_eq!(nct_from_point_id(id), "NCT06313437");
    }

    #[test]
    fn bare_digits_are_accepted() {
        assert_eq!(point_id_from_nct("1234567").unwrap(), 1_234_567);
    }

    #[test]
    fn short_ids_are_zero_padded() {
        assert_eq!(nct_from_point_id(42), "NCT00000042");
    }

    #[test]
    fn malformed_identifiers_are_rejected() {
        assert!(point_id_from_nct("NCT12AB").is_err());
        assert!(point_id_from_nct("").is_err());
    }
}
