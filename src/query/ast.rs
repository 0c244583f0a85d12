//! Caller-facing query model
//!
//! Every part of a query is independently optional. A fresh `Query` owns
//! fresh, empty filter and search state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default page size when the caller gives none
pub const DEFAULT_LIMIT: usize = 500;

/// Exact-match filters, AND-combined
pub type Filters = BTreeMap<String, Value>;

/// Substring search across the projected fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Search {
    /// Text to look for (case-insensitive)
    pub value: String,
    /// Invert the match
    #[serde(default)]
    pub negate: bool,
    /// Fields searched. Filled in from the resolved projection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl Search {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            negate: false,
            fields: Vec::new(),
        }
    }

    pub fn negated(value: impl Into<String>) -> Self {
        Self {
            negate: true,
            ..Self::new(value)
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Multi-field sort with a single direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Fields compared in order; later fields break ties
    pub fields: Vec<String>,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    pub fn asc<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            order: SortOrder::Desc,
            ..Self::asc(fields)
        }
    }
}

/// A select/filter/search/sort/offset/limit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Projection (None = every allowed field)
    #[serde(default)]
    pub select: Option<BTreeSet<String>>,
    #[serde(default)]
    pub filters: Filters,
    #[serde(default)]
    pub search: Option<Search>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for Query {
    fn default() -> Self {
        Self {
            select: None,
            filters: Filters::new(),
            search: None,
            sort: None,
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the projection
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Adds an exact-match filter
    pub fn filter(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.insert(field.into(), value);
        self
    }

    pub fn with_search(mut self, search: Search) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Requested projection, empty when omitted
    pub fn requested_fields(&self) -> BTreeSet<String> {
        self.select.clone().unwrap_or_default()
    }
}
