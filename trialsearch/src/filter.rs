//! Filter resolution: mapping normalized intent values onto the raw
//! stored-value variants that satisfy them.
//!
//! The stored vocabulary is closed and brittle — `criteria_age` in
//! particular is never a clean list but one of exactly six stringified
//! variants inherited from the registry export. Resolution therefore works
//! from explicit tables over that vocabulary, not from runtime parsing; any
//! upstream change to the stored formats is a breaking change to the tables
//! below.

use tracing::warn;

use crate::intent::SearchIntent;

/// Raw stored values for the `type` payload field.
pub const TYPE_VALUES: [&str; 2] = ["INTERVENTIONAL", "OBSERVATIONAL"];

/// Raw stored values for the `criteria_sex` payload field.
pub const SEX_VALUES: [&str; 3] = ["ALL", "FEMALE", "MALE"];

/// The six fixed stored variants of the `criteria_age` payload field.
///
/// Single brackets and the compound combinations the registry actually
/// emits. Matching against these is a substring test over the closed set:
/// note that `ADULT` also matches the `OLDER_ADULT` variants.
pub const AGE_VARIANTS: [&str; 6] = [
    "['CHILD']",
    "['ADULT']",
    "['OLDER_ADULT']",
    "['CHILD, ADULT']",
    "['ADULT, OLDER_ADULT']",
    "['CHILD', 'ADULT', 'OLDER_ADULT']",
];

/// The three categorical payload fields a query intent can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// Study type (`type`).
    StudyType,
    /// Sex eligibility (`criteria_sex`).
    Sex,
    /// Age eligibility (`criteria_age`).
    Age,
}

impl FilterField {
    /// The payload key this field filters on.
    pub fn key(self) -> &'static str {
        match self {
            FilterField::StudyType => "type",
            FilterField::Sex => "criteria_sex",
            FilterField::Age => "criteria_age",
        }
    }
}

/// One conjunctive filter condition: the payload value under `key` must
/// equal any member of `any` (MatchAny semantics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    /// The payload field to match on.
    pub key: String,
    /// The raw stored values that satisfy the condition.
    pub any: Vec<String>,
}

/// Resolve a normalized intent value to the set of raw stored values that
/// satisfy it.
///
/// An empty value resolves to the field's full value set (no narrowing).
/// A trial with `criteria_sex = ALL` is open to either sex, so the explicit
/// `FEMALE`/`MALE` filters include it. Age brackets resolve by substring
/// over the six stored variants. An unrecognized value degrades to the full
/// set with a warning rather than silently matching nothing.
pub fn resolve(field: FilterField, value: &str) -> Vec<String> {
    let resolved: Vec<String> = match field {
        FilterField::StudyType => match value {
            "" => TYPE_VALUES.iter().map(|v| v.to_string()).collect(),
            "INTERVENTIONAL" | "OBSERVATIONAL" => vec![value.to_string()],
            _ => Vec::new(),
        },
        FilterField::Sex => match value {
            "" => SEX_VALUES.iter().map(|v| v.to_string()).collect(),
            "FEMALE" | "MALE" => vec!["ALL".to_string(), value.to_string()],
            _ => Vec::new(),
        },
        FilterField::Age => match value {
            "" => AGE_VARIANTS.iter().map(|v| v.to_string()).collect(),
            "CHILD" | "ADULT" | "OLDER_ADULT" => AGE_VARIANTS
                .iter()
                .filter(|variant| variant.contains(value))
                .map(|v| v.to_string())
                .collect(),
            _ => Vec::new(),
        },
    };

    if resolved.is_empty() {
        warn!(field = field.key(), value, "unrecognized filter value, not narrowing");
        return resolve(field, "");
    }
    resolved
}

/// Build the conjunctive filter set for an intent.
///
/// A field contributes a filter only when its intent value is non-empty; an
/// unspecified field is omitted entirely rather than expanded to
/// match-everything, so the index can short-circuit. All returned filters
/// combine with logical AND.
pub fn build_filters(intent: &SearchIntent) -> Vec<FieldFilter> {
    let mut filters = Vec::new();
    for (field, value) in [
        (FilterField::StudyType, intent.study_type.as_str()),
        (FilterField::Sex, intent.criteria_sex.as_str()),
        (FilterField::Age, intent.criteria_age.as_str()),
    ] {
        if !value.is_empty() {
            filters.push(FieldFilter { key: field.key().to_string(), any: resolve(field, value) });
        }
    }
    filters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn empty_value_resolves_to_full_set_for_every_field() {
        assert_eq!(resolve(FilterField::StudyType, ""), strings(&TYPE_VALUES));
        assert_eq!(resolve(FilterField::Sex, ""), strings(&SEX_VALUES));
        assert_eq!(resolve(FilterField::Age, ""), strings(&AGE_VARIANTS));
    }

    #[test]
    fn explicit_type_narrows_to_itself() {
        assert_eq!(resolve(FilterField::StudyType, "OBSERVATIONAL"), strings(&["OBSERVATIONAL"]));
    }

    #[test]
    fn explicit_sex_includes_trials_open_to_all() {
        assert_eq!(resolve(FilterField::Sex, "FEMALE"), strings(&["ALL", "FEMALE"]));
        assert_eq!(resolve(FilterField::Sex, "MALE"), strings(&["ALL", "MALE"]));
    }

    #[test]
    fn adult_matches_every_variant_containing_the_token() {
        // Substring semantics: ADULT also matches the OLDER_ADULT variants.
        let resolved = resolve(FilterField::Age, "ADULT");
        assert_eq!(
            resolved,
            strings(&[
                "['ADULT']",
                "['OLDER_ADULT']",
                "['CHILD, ADULT']",
                "['ADULT, OLDER_ADULT']",
                "['CHILD', 'ADULT', 'OLDER_ADULT']",
            ])
        );
        assert!(!resolved.contains(&"['CHILD']".to_string()));
    }

    #[test]
    fn child_matches_single_and_compound_variants() {
        assert_eq!(
            resolve(FilterField::Age, "CHILD"),
            strings(&["['CHILD']", "['CHILD, ADULT']", "['CHILD', 'ADULT', 'OLDER_ADULT']"])
        );
    }

    #[test]
    fn older_adult_matches_its_three_variants() {
        assert_eq!(
            resolve(FilterField::Age, "OLDER_ADULT"),
            strings(&[
                "['OLDER_ADULT']",
                "['ADULT, OLDER_ADULT']",
                "['CHILD', 'ADULT', 'OLDER_ADULT']",
            ])
        );
    }

    #[test]
    fn unrecognized_value_falls_back_to_full_set() {
        assert_eq!(resolve(FilterField::Age, "TEEN"), strings(&AGE_VARIANTS));
        assert_eq!(resolve(FilterField::StudyType, "EXPANDED_ACCESS"), strings(&TYPE_VALUES));
    }

    #[test]
    fn all_empty_intent_builds_no_filters() {
        assert!(build_filters(&SearchIntent::default()).is_empty());
    }

    #[test]
    fn non_empty_fields_each_contribute_one_filter() {
        let intent = SearchIntent {
            study_type: "INTERVENTIONAL".into(),
            criteria_sex: "FEMALE".into(),
            ..Default::default()
        };
        let filters = build_filters(&intent);
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].key, "type");
        assert_eq!(filters[0].any, strings(&["INTERVENTIONAL"]));
        assert_eq!(filters[1].key, "criteria_sex");
        assert_eq!(filters[1].any, strings(&["ALL", "FEMALE"]));
    }
}
