//! In-memory inventory
//!
//! Holds a fleet snapshot and answers both collaborator contracts. Used by
//! the command line front end and by tests.
//!
//! Snapshot format:
//!
//! ```json
//! {"agents": [
//!   {"id": "001", "platform": "windows",
//!    "tables": {"sys_osinfo": [{"os_name": "..."}], "sys_programs": [...]}}
//! ]}
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, Platform};
use crate::executor::{FilterPredicate, RecordSorter, SearchFilter};
use crate::query::{Page, Record};
use crate::schema::Table;

use super::contract::{AgentDirectory, InventoryStore, LoadRequest, Loaded};
use super::errors::{StoreError, StoreResult};

/// One agent's reported inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    /// Reported platform family, e.g. "windows" or "ubuntu"
    #[serde(default)]
    pub platform: Option<String>,
    /// Rows per table name
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<Record>>,
}

/// Inventory of every known agent, in enumeration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    #[serde(default)]
    pub agents: Vec<AgentSnapshot>,
}

/// Snapshot-backed agent directory and inventory store
#[derive(Debug, Clone, Default)]
pub struct MemoryInventory {
    agents: Vec<AgentSnapshot>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: FleetSnapshot) -> Self {
        Self {
            agents: snapshot.agents,
        }
    }

    /// Loads a JSON fleet snapshot from disk
    pub fn load_file(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::Backend(format!("Failed to read snapshot {}: {}", path.display(), e))
        })?;

        let snapshot: FleetSnapshot = serde_json::from_str(&content).map_err(|e| {
            StoreError::Backend(format!("Invalid snapshot {}: {}", path.display(), e))
        })?;

        Ok(Self::from_snapshot(snapshot))
    }

    /// Registers an agent, replacing any previous one with the same id
    pub fn add_agent(&mut self, id: impl Into<AgentId>, platform: Option<&str>) -> &mut Self {
        let id = id.into();
        self.agents.retain(|agent| agent.id != id);
        self.agents.push(AgentSnapshot {
            id,
            platform: platform.map(str::to_string),
            tables: BTreeMap::new(),
        });
        self
    }

    /// Appends rows to one of an agent's tables.
    ///
    /// Rows for unknown agents are ignored.
    pub fn insert_rows<I>(&mut self, id: &AgentId, table: Table, rows: I) -> &mut Self
    where
        I: IntoIterator<Item = Record>,
    {
        if let Some(agent) = self.agents.iter_mut().find(|agent| &agent.id == id) {
            agent
                .tables
                .entry(table.name().to_string())
                .or_default()
                .extend(rows);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn agent(&self, id: &AgentId) -> StoreResult<&AgentSnapshot> {
        self.agents
            .iter()
            .find(|agent| &agent.id == id)
            .ok_or_else(|| StoreError::UnknownAgent(id.clone()))
    }
}

impl AgentDirectory for MemoryInventory {
    fn list_agent_ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|agent| agent.id.clone()).collect()
    }

    fn platform(&self, agent: &AgentId) -> StoreResult<Option<Platform>> {
        let snapshot = self.agent(agent)?;
        Ok(snapshot.platform.as_deref().and_then(Platform::from_family))
    }
}

impl InventoryStore for MemoryInventory {
    fn load(&self, agent: &AgentId, request: &LoadRequest<'_>) -> StoreResult<Loaded> {
        let snapshot = self.agent(agent)?;
        let rows = snapshot
            .tables
            .get(request.table.name())
            .ok_or_else(|| StoreError::NoRows {
                agent: agent.clone(),
                table: request.table,
            })?;

        let search_fields: Vec<String> = match request.search {
            Some(search) if !search.fields.is_empty() => search.fields.clone(),
            _ => request.select.iter().cloned().collect(),
        };

        let mut matched: Vec<Record> = rows
            .iter()
            .filter(|row| FilterPredicate::matches_all(row, request.filters))
            .map(|row| {
                row.iter()
                    .filter(|(field, _)| request.select.contains(*field))
                    .map(|(field, value)| (field.clone(), value.clone()))
                    .collect::<Record>()
            })
            .filter(|row| {
                request
                    .search
                    .map_or(true, |search| SearchFilter::matches_record(row, search, &search_fields))
            })
            .collect();

        if let Some(sort) = request.sort {
            RecordSorter::sort(&mut matched, sort);
        }

        let page = Page::cut(matched, request.offset, request.limit.unwrap_or(usize::MAX));

        Ok(Loaded {
            total: request.count.then_some(page.total_items),
            rows: page.items,
        })
    }
}
