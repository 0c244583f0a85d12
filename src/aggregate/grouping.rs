//! Value-grouping aggregation: agents bucketed by a shared nested value
//!
//! Groups are emitted in first-seen order following the directory's agent
//! order, then paginated. Search and sort over groups are not applied.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Map, Value};
use tracing::debug;

use crate::executor::FilterPredicate;
use crate::query::{Filters, Group, GroupKey, Page, QueryResult, Record};
use crate::schema::{SelectionValidator, Table};
use crate::shape::Shaper;
use crate::storage::{AgentDirectory, InventoryStore};

use super::fleet::FleetAggregator;

/// Which flat fields form a group and the nested key they fold under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grouping {
    pub table: Table,
    /// Flat fields fetched for the key, all sharing `prefix`
    pub fields: &'static [&'static str],
    /// Nested key the fields fold under
    pub prefix: &'static str,
}

/// Operating systems across the fleet, keyed by (name, version)
pub const OS_GROUPING: Grouping = Grouping {
    table: Table::OsInfo,
    fields: &["os_name", "os_version"],
    prefix: "os",
};

impl<'a, D: AgentDirectory, S: InventoryStore> FleetAggregator<'a, D, S> {
    /// Buckets agents by the nested value described by `grouping`.
    ///
    /// An agent is kept iff every filter key present in its flat record
    /// equals the filter value. Agents without a record are left out.
    pub fn value_groups(
        &self,
        grouping: &Grouping,
        filters: &Filters,
        offset: usize,
        limit: usize,
    ) -> QueryResult<Page<Group>> {
        self.executor.check_limit(limit)?;

        let schema = self.executor.registry().schema_for(grouping.table, None);
        SelectionValidator::validate_filters(filters, &schema)?;

        let select: BTreeSet<String> = grouping
            .fields
            .iter()
            .map(|field| field.to_string())
            .chain(filters.keys().cloned())
            .collect();

        let records = self.per_agent(|agent| {
            self.executor
                .first(agent, grouping.table, &select, &Filters::new())
        })?;

        let mut groups: Vec<Group> = Vec::new();
        let mut positions: HashMap<GroupKey, usize> = HashMap::new();

        for (agent, record) in records {
            if record.is_empty() {
                debug!(agent = %agent, table = %grouping.table, "no record, not grouped");
                continue;
            }
            if !FilterPredicate::matches_present(&record, filters) {
                continue;
            }

            let nested = Shaper::to_nested_with(&record, &[grouping.prefix]);
            let value = nested
                .get(grouping.prefix)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            let key = GroupKey::from_value(&value);

            match positions.get(&key) {
                Some(&position) => groups[position].members.push(agent),
                None => {
                    positions.insert(key.clone(), groups.len());
                    let mut fields = Record::new();
                    fields.insert(grouping.prefix.to_string(), value);
                    groups.push(Group {
                        key,
                        fields,
                        members: vec![agent],
                    });
                }
            }
        }

        debug!(groups = groups.len(), table = %grouping.table, "grouping complete");
        Ok(Page::cut(groups, offset, limit))
    }

    /// Operating systems across the fleet
    pub fn os_groups(&self, filters: &Filters, offset: usize, limit: usize) -> QueryResult<Page<Group>> {
        self.value_groups(&OS_GROUPING, filters, offset, limit)
    }
}
