//! Flat-to-nested record reshaping
//!
//! Field names of the form `prefix_rest` are folded under `prefix` when at
//! least two fields share the prefix, or when the prefix is forced:
//!
//! ```text
//! {"cpu_name": .., "cpu_cores": .., "board_serial": ..}
//!   => {"cpu": {"name": .., "cores": ..}, "board_serial": ..}
//! ```
//!
//! The result depends only on the set of field names, so records with the
//! same fields always nest the same way.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::query::Record;

const SEPARATOR: char = '_';

/// Stateless record reshaper
pub struct Shaper;

impl Shaper {
    /// Nests fields sharing a prefix
    pub fn to_nested(record: &Record) -> Record {
        Self::to_nested_with(record, &[])
    }

    /// Nests fields sharing a prefix, always nesting the `force` prefixes
    pub fn to_nested_with(record: &Record, force: &[&str]) -> Record {
        let mut by_prefix: BTreeMap<&str, Vec<(&str, &Value)>> = BTreeMap::new();
        for (field, value) in record {
            if let Some((prefix, rest)) = split(field) {
                by_prefix.entry(prefix).or_default().push((rest, value));
            }
        }

        let nested_prefixes: Vec<&str> = by_prefix
            .iter()
            .filter(|(prefix, subfields)| {
                (subfields.len() > 1 || force.contains(*prefix)) && !record.contains_key(**prefix)
            })
            .map(|(prefix, _)| *prefix)
            .collect();

        let mut output = Record::new();
        for (field, value) in record {
            let target = split(field).filter(|(prefix, _)| nested_prefixes.contains(prefix));
            match target {
                Some((prefix, rest)) => {
                    let entry = output
                        .entry(prefix.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(inner) = entry {
                        inner.insert(rest.to_string(), value.clone());
                    }
                }
                None => {
                    output.insert(field.clone(), value.clone());
                }
            }
        }

        // Forced prefixes appear even when no field carries them
        for prefix in force {
            if !record.contains_key(*prefix) {
                output
                    .entry(prefix.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
            }
        }

        output
    }
}

fn split(field: &str) -> Option<(&str, &str)> {
    field
        .split_once(SEPARATOR)
        .filter(|(prefix, rest)| !prefix.is_empty() && !rest.is_empty())
}
