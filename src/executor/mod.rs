//! Query Executor subsystem
//!
//! Runs one validated query against one agent's inventory table.
//!
//! # Execution Flow (strict order)
//!
//! 1. Check pagination bounds
//! 2. Resolve the schema variant for the agent
//! 3. Validate projection, sort and filter fields
//! 4. Load filtered/searched/sorted/paginated rows from storage
//! 5. Return the page and the total before pagination
//!
//! # Invariants
//!
//! - Validation fails before any storage access
//! - `total_items` does not depend on offset or limit
//! - "No rows" yields an empty result, never an error

mod executor;
mod filters;
mod sorter;

pub use executor::{QueryExecutor, DEFAULT_MAX_LIMIT};
pub use filters::{FilterPredicate, SearchFilter};
pub use sorter::RecordSorter;
