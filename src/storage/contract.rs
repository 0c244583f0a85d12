//! Contracts the query layer requires from its collaborators

use std::collections::BTreeSet;

use crate::agent::{AgentId, Platform};
use crate::query::{Filters, Record, Search, SortSpec};
use crate::schema::Table;

use super::errors::StoreResult;

/// One per-agent, per-table load
#[derive(Debug, Clone, Copy)]
pub struct LoadRequest<'a> {
    pub table: Table,
    /// Fields to project
    pub select: &'a BTreeSet<String>,
    pub offset: usize,
    /// None loads every matching row
    pub limit: Option<usize>,
    /// Whether to report the total before pagination
    pub count: bool,
    pub sort: Option<&'a SortSpec>,
    pub search: Option<&'a Search>,
    pub filters: &'a Filters,
}

impl<'a> LoadRequest<'a> {
    /// Unpaginated, uncounted, unsorted load of the given projection
    pub fn all(table: Table, select: &'a BTreeSet<String>, filters: &'a Filters) -> Self {
        Self {
            table,
            select,
            offset: 0,
            limit: None,
            count: false,
            sort: None,
            search: None,
            filters,
        }
    }
}

/// Rows returned by a load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loaded {
    /// Filtered, searched, sorted and paginated rows
    pub rows: Vec<Record>,
    /// Matches before pagination; present iff the request asked for a count
    pub total: Option<usize>,
}

/// Per-agent inventory storage.
///
/// Implementations apply filtering, search, sort and pagination themselves.
/// An agent that never reported a table signals `StoreError::NoRows`.
pub trait InventoryStore {
    fn load(&self, agent: &AgentId, request: &LoadRequest<'_>) -> StoreResult<Loaded>;
}

/// Enumeration of known agents
pub trait AgentDirectory {
    /// Known agents in a stable, deterministic order
    fn list_agent_ids(&self) -> Vec<AgentId>;

    /// Platform family of an agent.
    ///
    /// `Ok(None)` when the agent exists but its platform is unrecognised;
    /// `StoreError::UnknownAgent` when the agent does not exist.
    fn platform(&self, agent: &AgentId) -> StoreResult<Option<Platform>>;
}
