//! Storage collaborator errors

use thiserror::Error;

use crate::agent::AgentId;
use crate::schema::Table;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Conditions signalled by the per-agent storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The agent has never reported rows for this table
    #[error("No rows in {table} for agent {agent}")]
    NoRows { agent: AgentId, table: Table },

    /// The agent is not known to the storage
    #[error("Agent {0} does not exist")]
    UnknownAgent(AgentId),

    /// Any other storage failure
    #[error("Storage failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if this signals "no data" rather than a failure
    pub fn is_no_rows(&self) -> bool {
        matches!(self, StoreError::NoRows { .. })
    }
}
