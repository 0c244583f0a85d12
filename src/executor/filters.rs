//! Row predicates: exact-match filters and substring search
//!
//! Filters match by equality. A string filter also matches a stored number
//! or bool whose textual form is that string, so text typed on a command line
//! can address numeric columns; no other coercion happens.
//! Search is case-insensitive substring containment over textual forms.

use serde_json::Value;

use crate::query::{Filters, Record, Search};

/// Evaluates exact-match filters against records
pub struct FilterPredicate;

impl FilterPredicate {
    /// All filters must match (AND). A missing field never matches.
    pub fn matches_all(record: &Record, filters: &Filters) -> bool {
        filters
            .iter()
            .all(|(field, expected)| {
                record
                    .get(field)
                    .is_some_and(|actual| value_matches(actual, expected))
            })
    }

    /// Every filter whose key is present in the record must match.
    ///
    /// Keys absent from the record are not evaluated; an empty filter set
    /// always passes.
    pub fn matches_present(record: &Record, filters: &Filters) -> bool {
        filters
            .iter()
            .filter_map(|(field, expected)| {
                record
                    .get(field)
                    .map(|actual| value_matches(actual, expected))
            })
            .all(|matched| matched)
    }
}

/// Evaluates a substring search against records or plain text
pub struct SearchFilter;

impl SearchFilter {
    /// True if any of `fields` contains the search text, inverted when negated
    pub fn matches_record(record: &Record, search: &Search, fields: &[String]) -> bool {
        let needle = search.value.to_lowercase();
        let found = fields
            .iter()
            .filter_map(|field| record.get(field))
            .filter_map(searchable_text)
            .any(|text| text.to_lowercase().contains(&needle));
        found != search.negate
    }

    /// Same predicate applied to a single text value
    pub fn matches_text(text: &str, search: &Search) -> bool {
        let found = text.to_lowercase().contains(&search.value.to_lowercase());
        found != search.negate
    }
}

fn value_matches(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::Number(_) | Value::Bool(_), Value::String(text)) => {
            searchable_text(actual).is_some_and(|actual| &actual == text)
        }
        _ => false,
    }
}

fn searchable_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
