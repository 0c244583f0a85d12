//! Multi-field record sorting
//!
//! Sort is stable and deterministic: fields are compared in order, and rows
//! equal on every field keep their input order.

use std::cmp::Ordering;

use serde_json::Value;

use crate::query::{Record, SortOrder, SortSpec};

/// Sorts records and plain values
pub struct RecordSorter;

impl RecordSorter {
    /// Sorts records according to the sort specification
    pub fn sort(records: &mut [Record], spec: &SortSpec) {
        records.sort_by(|a, b| {
            let ordering = spec
                .fields
                .iter()
                .map(|field| Self::compare_values(a.get(field), b.get(field)))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal);

            Self::directed(ordering, spec.order)
        });
    }

    /// Sorts items by their own ordering
    pub fn sort_by_self<T: Ord>(items: &mut [T], order: SortOrder) {
        items.sort_by(|a, b| Self::directed(a.cmp(b), order));
    }

    fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - missing < null < bool < number < string
    /// - For same types, natural ordering
    pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                let a_type = type_rank(a_val);
                let b_type = type_rank(b_val);

                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                match (a_val, b_val) {
                    (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
                    (Value::Number(a_n), Value::Number(b_n)) => {
                        let a_f = a_n.as_f64().unwrap_or(0.0);
                        let b_f = b_n.as_f64().unwrap_or(0.0);
                        a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
                    }
                    (Value::String(a_s), Value::String(b_s)) => a_s.cmp(b_s),
                    // Nulls, arrays and objects are not compared
                    _ => Ordering::Equal,
                }
            }
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
