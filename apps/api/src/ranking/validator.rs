//! Turns raw completion text into a [`RatingMap`].
//!
//! The accepted shape is `{ "<field>": { "<key>": <number>, ... } }`. Keys are
//! not checked against the candidates here; the aggregator filters them, so a
//! model that invents an extra key costs one dropped entry, not the request.
//! Values are not range-checked either: 0–100 is what the prompt asks for,
//! nothing more.

use std::collections::HashSet;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::llm_client::prompts::strip_json_fences;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("completion returned no content")]
    Empty,

    #[error("completion is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("completion does not match the rating shape: {0}")]
    Schema(String),
}

/// One rated key.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub key: String,
    pub value: f64,
}

/// Ratings in the order the model emitted them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingMap {
    entries: Vec<Rating>,
}

impl RatingMap {
    pub fn iter(&self) -> impl Iterator<Item = &Rating> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|r| r.key == key).map(|r| r.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for RatingMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| Rating {
                    key: key.into(),
                    value,
                })
                .collect(),
        }
    }
}

/// Parses `raw_text` and extracts the rating mapping under `field`.
///
/// If `field` is absent but the object has exactly one member, that member is
/// used instead: models occasionally rename the wrapper key while getting the
/// mapping itself right.
pub fn validate(
    raw_text: &str,
    field: &str,
    expected_keys: &HashSet<String>,
) -> Result<RatingMap, ValidationError> {
    let text = strip_json_fences(raw_text);
    if text.is_empty() {
        return Err(ValidationError::Empty);
    }

    let parsed: Value = serde_json::from_str(text)?;

    let Value::Object(top) = parsed else {
        return Err(ValidationError::Schema(
            "top level is not a JSON object".to_string(),
        ));
    };

    let mapping = rating_member(&top, field)?;

    let mut entries = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let value = value.as_f64().ok_or_else(|| {
            ValidationError::Schema(format!("rating for '{key}' is not a number: {value}"))
        })?;
        if !expected_keys.contains(key) {
            debug!("Completion rated unrequested key '{key}'");
        }
        entries.push(Rating {
            key: key.clone(),
            value,
        });
    }

    Ok(RatingMap { entries })
}

fn rating_member<'a>(
    top: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    let member = match top.get(field) {
        Some(member) => member,
        None if top.len() == 1 => top.values().next().unwrap_or(&Value::Null),
        None => {
            return Err(ValidationError::Schema(format!(
                "missing '{field}' member"
            )))
        }
    };

    member.as_object().ok_or_else(|| {
        ValidationError::Schema(format!("'{field}' is not a mapping of names to numbers"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_area_ratings() {
        let map = validate(
            "{\"areasWithRating\":{\"Sales\":80,\"Marketing\":20}}",
            "areasWithRating",
            &keys(&["Sales", "Marketing"]),
        )
        .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("Sales"), Some(80.0));
        assert_eq!(map.get("Marketing"), Some(20.0));
    }

    #[test]
    fn test_not_json_is_parse_error() {
        let err = validate("not json", "areasWithRating", &keys(&[])).unwrap_err();
        assert!(matches!(err, ValidationError::Parse(_)));
    }

    #[test]
    fn test_empty_text_is_empty_error() {
        let err = validate("  \n", "areasWithRating", &keys(&[])).unwrap_err();
        assert!(matches!(err, ValidationError::Empty));
    }

    #[test]
    fn test_preserves_document_order() {
        let map = validate(
            r#"{"areasWithRating": {"Zeta": 10, "Alpha": 10, "Mid": 10}}"#,
            "areasWithRating",
            &keys(&[]),
        )
        .unwrap();
        let order: Vec<&str> = map.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(order, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_fenced_output_is_accepted() {
        let map = validate(
            "```json\n{\"contactsWithRating\": {\"c1\": 55.5}}\n```",
            "contactsWithRating",
            &keys(&["c1"]),
        )
        .unwrap();
        assert_eq!(map.get("c1"), Some(55.5));
    }

    #[test]
    fn test_unknown_keys_and_out_of_range_values_are_kept() {
        let map = validate(
            r#"{"areasWithRating": {"Sales": 140, "Invented": -3}}"#,
            "areasWithRating",
            &keys(&["Sales"]),
        )
        .unwrap();
        assert_eq!(map.get("Sales"), Some(140.0));
        assert_eq!(map.get("Invented"), Some(-3.0));
    }

    #[test]
    fn test_single_renamed_member_is_accepted() {
        let map = validate(
            r#"{"areas": {"Sales": 80}}"#,
            "areasWithRating",
            &keys(&["Sales"]),
        )
        .unwrap();
        assert_eq!(map.get("Sales"), Some(80.0));
    }

    #[test]
    fn test_non_object_top_level_is_schema_error() {
        let err = validate("[1, 2]", "areasWithRating", &keys(&[])).unwrap_err();
        assert!(matches!(err, ValidationError::Schema(_)));
    }

    #[test]
    fn test_missing_field_among_several_is_schema_error() {
        let err = validate(
            r#"{"foo": {"Sales": 1}, "bar": {}}"#,
            "areasWithRating",
            &keys(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Schema(_)));
    }

    #[test]
    fn test_non_numeric_rating_is_schema_error() {
        let err = validate(
            r#"{"areasWithRating": {"Sales": "80%"}}"#,
            "areasWithRating",
            &keys(&["Sales"]),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Schema(_)));
    }

    #[test]
    fn test_mapping_that_is_not_an_object_is_schema_error() {
        let err = validate(
            r#"{"areasWithRating": [80, 20]}"#,
            "areasWithRating",
            &keys(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::Schema(_)));
    }
}
