//! syscollector - schema-constrained queries over per-agent inventory
//!
//! Operating system, hardware and installed-program records are collected
//! per agent. This crate validates projections against per-table allow-lists,
//! runs paged queries for a single agent, and aggregates across the whole
//! fleet.

pub mod agent;
pub mod aggregate;
pub mod cli;
pub mod executor;
pub mod query;
pub mod schema;
pub mod shape;
pub mod storage;

pub use agent::{AgentId, Platform};
pub use aggregate::FleetAggregator;
pub use executor::QueryExecutor;
pub use query::{Group, Page, Query, QueryError, QueryResult, Record};
pub use schema::{SchemaRegistry, Table};
pub use storage::{AgentDirectory, InventoryStore, MemoryInventory};
