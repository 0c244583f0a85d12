//! Result types for query execution and aggregation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::AgentId;

/// Flat or nested field-name -> value mapping
pub type Record = Map<String, Value>;

/// One page of results plus the number of matches before pagination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(rename = "totalItems")]
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Creates an empty page
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
        }
    }

    /// Cuts `[offset, offset + limit)` out of the full match list.
    ///
    /// An offset past the end yields an empty page; `total_items` is always
    /// the full length.
    pub fn cut(all: Vec<T>, offset: usize, limit: usize) -> Self {
        let total_items = all.len();
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self { items, total_items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Transforms every item, keeping the total
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
        }
    }
}

/// Canonical, hashable identity of a group.
///
/// Pairs of (leaf path segments, JSON text) sorted by path, so two nested
/// values that are structurally equal always produce equal keys. Segments are
/// kept apart so a key containing a dot never aliases a nested path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(Vec<(Vec<String>, String)>);

impl GroupKey {
    /// Builds the key from a (possibly nested) value
    pub fn from_value(value: &Value) -> Self {
        let mut pairs = Vec::new();
        flatten_into(&mut pairs, &mut Vec::new(), value);
        pairs.sort();
        Self(pairs)
    }

    pub fn pairs(&self) -> &[(Vec<String>, String)] {
        &self.0
    }
}

fn flatten_into(pairs: &mut Vec<(Vec<String>, String)>, path: &mut Vec<String>, value: &Value) {
    match value {
        Value::Object(map) => {
            for (name, inner) in map {
                path.push(name.clone());
                flatten_into(pairs, path, inner);
                path.pop();
            }
        }
        other => pairs.push((path.clone(), other.to_string())),
    }
}

/// Agents collapsed under one shared value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    #[serde(skip)]
    pub key: GroupKey,
    /// Grouped value in output shape, e.g. `{"os": {"name": .., "version": ..}}`
    #[serde(flatten)]
    pub fields: Record,
    /// Agents sharing the value, in first-seen order
    #[serde(rename = "agent_id")]
    pub members: Vec<AgentId>,
}
