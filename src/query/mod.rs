//! Query model for inventory lookups
//!
//! A query carries the caller's projection, exact-match filters, substring
//! search, multi-field sort and offset/limit pagination. Results come back
//! as a `Page` whose `total_items` counts every match before pagination.

mod ast;
mod errors;
mod result;

pub use ast::{Filters, Query, Search, SortOrder, SortSpec, DEFAULT_LIMIT};
pub use errors::{QueryError, QueryResult};
pub use result::{Group, GroupKey, Page, Record};
