//! Schema registry and selection validation
//!
//! Every inventory table declares which fields may be projected and which
//! may be sorted on. Requests naming anything else are rejected before
//! storage is touched.
//!
//! # Design Principles
//!
//! - Allow-lists are static data, one definition per table
//! - Platform-dependent tables resolve their variant per agent
//! - Unknown platforms resolve to the broadest variant
//! - Read-only after startup

mod registry;
mod types;
mod validator;

pub use registry::SchemaRegistry;
pub use types::{SelectMode, Table, TableDef, TableSchema};
pub use validator::SelectionValidator;
