//! Fleet-wide fan-out over the agent directory

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::agent::AgentId;
use crate::executor::QueryExecutor;
use crate::query::QueryResult;
use crate::storage::{AgentDirectory, InventoryStore};

/// Runs per-agent queries across every known agent and folds the results
pub struct FleetAggregator<'a, D: AgentDirectory, S: InventoryStore> {
    pub(super) executor: QueryExecutor<'a, D, S>,
}

impl<'a, D: AgentDirectory, S: InventoryStore> FleetAggregator<'a, D, S> {
    pub fn new(directory: &'a D, store: &'a S) -> Self {
        Self::with_executor(QueryExecutor::new(directory, store))
    }

    /// Aggregates through a preconfigured executor
    pub fn with_executor(executor: QueryExecutor<'a, D, S>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &QueryExecutor<'a, D, S> {
        &self.executor
    }

    /// Calls `fetch` for every agent in directory order.
    ///
    /// Each agent is visited once even if the directory repeats it. Agents
    /// that disappeared between enumeration and fetch are skipped; any other
    /// error aborts the whole aggregation.
    pub(super) fn per_agent<T>(
        &self,
        mut fetch: impl FnMut(&AgentId) -> QueryResult<T>,
    ) -> QueryResult<Vec<(AgentId, T)>> {
        let agents = self.executor.directory().list_agent_ids();
        let mut results = Vec::with_capacity(agents.len());
        let mut visited: HashSet<AgentId> = HashSet::with_capacity(agents.len());

        for agent in agents {
            if !visited.insert(agent.clone()) {
                debug!(agent = %agent, "duplicate directory entry, skipping");
                continue;
            }
            match fetch(&agent) {
                Ok(value) => results.push((agent, value)),
                Err(err) if err.is_unknown_agent() => {
                    warn!(agent = %agent, "agent vanished during aggregation, skipping");
                }
                Err(err) => return Err(err),
            }
        }

        debug!(agents = results.len(), "fleet fan-out complete");
        Ok(results)
    }
}
