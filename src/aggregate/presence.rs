//! Presence aggregation: which agents have at least one matching row

use std::collections::BTreeSet;

use crate::agent::AgentId;
use crate::executor::{RecordSorter, SearchFilter};
use crate::query::{Page, Query, QueryError, QueryResult, SortSpec};
use crate::schema::{SelectionValidator, Table};
use crate::storage::{AgentDirectory, InventoryStore};

use super::fleet::FleetAggregator;

/// Only sortable field of an agent identifier list
pub const AGENT_ID_FIELD: &str = "id";

impl<'a, D: AgentDirectory, S: InventoryStore> FleetAggregator<'a, D, S> {
    /// Agents with at least one row in `table` matching the query's
    /// projection and filters.
    ///
    /// Search, sort and pagination apply to the resulting identifier list.
    pub fn presence(&self, table: Table, query: &Query) -> QueryResult<Page<AgentId>> {
        self.executor.check_limit(query.limit)?;

        let schema = self.executor.registry().schema_for(table, None);
        let select = SelectionValidator::resolve_select(&query.requested_fields(), &schema)?;
        SelectionValidator::validate_filters(&query.filters, &schema)?;
        validate_identifier_sort(query.sort.as_ref())?;

        let probe = Query {
            select: Some(select),
            filters: query.filters.clone(),
            limit: 1,
            ..Query::default()
        };

        let mut agents: Vec<AgentId> = self
            .per_agent(|agent| self.executor.execute(agent, table, &probe))?
            .into_iter()
            .filter(|(_, page)| page.total_items > 0)
            .map(|(agent, _)| agent)
            .collect();

        if let Some(search) = &query.search {
            agents.retain(|agent| SearchFilter::matches_text(agent.as_str(), search));
        }

        if let Some(sort) = &query.sort {
            RecordSorter::sort_by_self(&mut agents, sort.order);
        }

        Ok(Page::cut(agents, query.offset, query.limit))
    }

    /// Agents with at least one installed program matching the query
    pub fn programs_presence(&self, query: &Query) -> QueryResult<Page<AgentId>> {
        self.presence(Table::Programs, query)
    }
}

fn validate_identifier_sort(sort: Option<&SortSpec>) -> QueryResult<()> {
    let offending: BTreeSet<String> = sort
        .map(|sort| {
            sort.fields
                .iter()
                .filter(|field| field.as_str() != AGENT_ID_FIELD)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    if offending.is_empty() {
        Ok(())
    } else {
        Err(QueryError::InvalidSort {
            offending,
            allowed: BTreeSet::from([AGENT_ID_FIELD.to_string()]),
        })
    }
}
