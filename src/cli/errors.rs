//! CLI-specific error types

use std::io;

use thiserror::Error;

use crate::query::QueryError;
use crate::storage::StoreError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, unreadable or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed command line input
    #[error("Invalid argument: {0}")]
    Usage(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn config(msg: impl Into<String>) -> Self {
        CliError::Config(msg.into())
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        CliError::Usage(msg.into())
    }

    /// Numeric code written to the error response
    pub fn code(&self) -> u16 {
        match self {
            CliError::Query(err) => err.code(),
            CliError::Storage(err) => QueryError::from(err.clone()).code(),
            CliError::Config(_) => 1101,
            CliError::Usage(_) => 1102,
            CliError::Io(_) | CliError::Json(_) => 1000,
        }
    }
}
