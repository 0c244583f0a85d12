//! Fleet record listing: one record per agent, tagged with its identifier

use std::collections::BTreeSet;

use serde_json::Value;

use crate::executor::{FilterPredicate, RecordSorter, SearchFilter};
use crate::query::{Filters, Page, Query, QueryResult, Record};
use crate::schema::{SelectionValidator, Table};
use crate::shape::Shaper;
use crate::storage::{AgentDirectory, InventoryStore};

use super::fleet::FleetAggregator;

/// Field carrying the owning agent in listed records
pub const AGENT_ID_KEY: &str = "agent_id";

impl<'a, D: AgentDirectory, S: InventoryStore> FleetAggregator<'a, D, S> {
    /// Lists each agent's single record of `table`.
    ///
    /// Records must match every filter. Search covers the projected fields;
    /// sort ties keep directory order. Output records are nested and carry
    /// `agent_id`.
    pub fn fleet_records(&self, table: Table, query: &Query) -> QueryResult<Page<Record>> {
        self.executor.check_limit(query.limit)?;

        let schema = self.executor.registry().schema_for(table, None);
        let select = SelectionValidator::resolve_select(&query.requested_fields(), &schema)?;
        SelectionValidator::validate_sort(query.sort.as_ref(), &schema)?;
        SelectionValidator::validate_filters(&query.filters, &schema)?;

        // Filter and sort fields are fetched even when not projected
        let mut fetch: BTreeSet<String> = select.clone();
        fetch.extend(query.filters.keys().cloned());
        if let Some(sort) = &query.sort {
            fetch.extend(sort.fields.iter().cloned());
        }

        let search_fields: Vec<String> = select.iter().cloned().collect();

        let mut matched: Vec<Record> = self
            .per_agent(|agent| self.executor.first(agent, table, &fetch, &Filters::new()))?
            .into_iter()
            .filter(|(_, record)| !record.is_empty())
            .filter(|(_, record)| FilterPredicate::matches_all(record, &query.filters))
            .filter(|(_, record)| {
                query
                    .search
                    .as_ref()
                    .map_or(true, |search| SearchFilter::matches_record(record, search, &search_fields))
            })
            .map(|(agent, mut record)| {
                record.insert(AGENT_ID_KEY.to_string(), Value::String(agent.to_string()));
                record
            })
            .collect();

        if let Some(sort) = &query.sort {
            RecordSorter::sort(&mut matched, sort);
        }

        let page = Page::cut(matched, query.offset, query.limit);
        Ok(page.map(|record| {
            let projected: Record = record
                .into_iter()
                .filter(|(field, _)| field == AGENT_ID_KEY || select.contains(field))
                .collect();
            Shaper::to_nested(&projected)
        }))
    }

    /// Hardware records across the fleet
    pub fn hardware_fleet(&self, query: &Query) -> QueryResult<Page<Record>> {
        self.fleet_records(Table::HwInfo, query)
    }
}
