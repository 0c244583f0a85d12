//! Query error taxonomy
//!
//! Error codes:
//! - 1000 storage failure
//! - 1403 sort field outside the sortable set
//! - 1406 limit out of range
//! - 1701 agent does not exist
//! - 1724 select or filter field outside the selectable set
//!
//! "No data" is not an error at this layer: it resolves to an empty record
//! or an empty page.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::agent::AgentId;
use crate::schema::Table;
use crate::storage::StoreError;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Requested select or filter fields are not allowed for the table
    #[error(
        "Allowed select fields for {table}: {}. Fields {}",
        join(allowed),
        join(offending)
    )]
    InvalidField {
        table: Table,
        offending: BTreeSet<String>,
        allowed: BTreeSet<String>,
    },

    /// Requested sort fields are not sortable
    #[error("Allowed sort fields: {}. Fields: {}", join(allowed), join(offending))]
    InvalidSort {
        offending: BTreeSet<String>,
        allowed: BTreeSet<String>,
    },

    /// Limit is zero or above the configured maximum
    #[error("{limit} is not a valid limit (1..={max})")]
    InvalidLimit { limit: usize, max: usize },

    #[error("Agent {0} does not exist")]
    UnknownAgent(AgentId),

    #[error("{0}")]
    Storage(StoreError),
}

impl QueryError {
    /// Numeric error code reported to callers
    pub fn code(&self) -> u16 {
        match self {
            QueryError::InvalidField { .. } => 1724,
            QueryError::InvalidSort { .. } => 1403,
            QueryError::InvalidLimit { .. } => 1406,
            QueryError::UnknownAgent(_) => 1701,
            QueryError::Storage(_) => 1000,
        }
    }

    /// Returns true if the error names an agent that does not exist
    pub fn is_unknown_agent(&self) -> bool {
        matches!(self, QueryError::UnknownAgent(_))
    }

    /// Fields that caused a validation failure, if any
    pub fn offending_fields(&self) -> Option<&BTreeSet<String>> {
        match self {
            QueryError::InvalidField { offending, .. } | QueryError::InvalidSort { offending, .. } => {
                Some(offending)
            }
            _ => None,
        }
    }

    /// Allow-list reported with a validation failure, if any
    pub fn allowed_fields(&self) -> Option<&BTreeSet<String>> {
        match self {
            QueryError::InvalidField { allowed, .. } | QueryError::InvalidSort { allowed, .. } => {
                Some(allowed)
            }
            _ => None,
        }
    }
}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownAgent(agent) => QueryError::UnknownAgent(agent),
            other => QueryError::Storage(other),
        }
    }
}

fn join(fields: &BTreeSet<String>) -> String {
    fields.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
