//! Per-agent query executor
//!
//! Execution flow (strict order):
//! 1. Check pagination bounds
//! 2. Resolve the table schema, including the agent's platform variant
//! 3. Validate projection, sort fields and filter keys
//! 4. Search the resolved projection
//! 5. Delegate filter/search/sort/pagination to storage
//! 6. Map "no rows" to an empty result
//!
//! Validation failures surface before storage is touched.

use std::collections::BTreeSet;

use tracing::debug;

use crate::agent::AgentId;
use crate::query::{Filters, Page, Query, QueryError, QueryResult, Record};
use crate::schema::{SchemaRegistry, SelectionValidator, Table, TableSchema};
use crate::shape::Shaper;
use crate::storage::{AgentDirectory, InventoryStore, LoadRequest, Loaded, StoreError};

/// Default upper bound accepted for `limit`
pub const DEFAULT_MAX_LIMIT: usize = 100_000;

/// Executes queries for one agent at a time
pub struct QueryExecutor<'a, D: AgentDirectory, S: InventoryStore> {
    registry: SchemaRegistry,
    directory: &'a D,
    store: &'a S,
    max_limit: usize,
}

impl<'a, D: AgentDirectory, S: InventoryStore> QueryExecutor<'a, D, S> {
    /// Creates an executor over the built-in schema registry
    pub fn new(directory: &'a D, store: &'a S) -> Self {
        Self {
            registry: SchemaRegistry::builtin(),
            directory,
            store,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    /// Overrides the largest accepted `limit`
    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = max_limit;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn directory(&self) -> &'a D {
        self.directory
    }

    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    /// Rejects a zero limit or one above the configured maximum
    pub fn check_limit(&self, limit: usize) -> QueryResult<()> {
        if limit == 0 || limit > self.max_limit {
            return Err(QueryError::InvalidLimit {
                limit,
                max: self.max_limit,
            });
        }
        Ok(())
    }

    /// Resolves the schema that applies to this agent.
    ///
    /// Only tables with platform variants consult the directory.
    pub fn schema_for_agent(&self, agent: &AgentId, table: Table) -> QueryResult<TableSchema> {
        let has_variants = self
            .registry
            .definition(table)
            .is_some_and(|def| def.has_variants());

        let platform = if has_variants {
            self.directory.platform(agent)?
        } else {
            None
        };

        Ok(self.registry.schema_for(table, platform))
    }

    /// Runs a paged query against one agent's table.
    ///
    /// Zero matching rows is an empty page, not an error.
    pub fn execute(&self, agent: &AgentId, table: Table, query: &Query) -> QueryResult<Page<Record>> {
        self.check_limit(query.limit)?;

        let schema = self.schema_for_agent(agent, table)?;
        let select = SelectionValidator::resolve_select(&query.requested_fields(), &schema)?;
        SelectionValidator::validate_sort(query.sort.as_ref(), &schema)?;
        SelectionValidator::validate_filters(&query.filters, &schema)?;

        let search = query.search.clone().map(|mut search| {
            search.fields = select.iter().cloned().collect();
            search
        });

        let request = LoadRequest {
            table,
            select: &select,
            offset: query.offset,
            limit: Some(query.limit),
            count: true,
            sort: query.sort.as_ref(),
            search: search.as_ref(),
            filters: &query.filters,
        };

        let loaded = self.load(agent, &request)?;
        let total_items = loaded.total.unwrap_or(loaded.rows.len());

        debug!(
            agent = %agent,
            table = %table,
            fields = select.len(),
            total = total_items,
            "query executed"
        );

        Ok(Page {
            items: loaded.rows,
            total_items,
        })
    }

    /// Returns the agent's first record, or an empty record when it has none.
    ///
    /// Only schema validation and unknown agents raise.
    pub fn first(
        &self,
        agent: &AgentId,
        table: Table,
        select: &BTreeSet<String>,
        filters: &Filters,
    ) -> QueryResult<Record> {
        let schema = self.schema_for_agent(agent, table)?;
        let select = SelectionValidator::resolve_select(select, &schema)?;
        SelectionValidator::validate_filters(filters, &schema)?;

        let request = LoadRequest {
            limit: Some(1),
            ..LoadRequest::all(table, &select, filters)
        };

        let loaded = self.load(agent, &request)?;
        Ok(loaded.rows.into_iter().next().unwrap_or_default())
    }

    /// Operating system record of one agent.
    ///
    /// The projection is narrowed to the agent's platform variant.
    pub fn os_info(
        &self,
        agent: &AgentId,
        select: &BTreeSet<String>,
        nested: bool,
    ) -> QueryResult<Record> {
        let record = self.first(agent, Table::OsInfo, select, &Filters::new())?;
        Ok(if nested { Shaper::to_nested(&record) } else { record })
    }

    /// Hardware record of one agent, nested
    pub fn hardware_info(&self, agent: &AgentId, select: &BTreeSet<String>) -> QueryResult<Record> {
        let record = self.first(agent, Table::HwInfo, select, &Filters::new())?;
        Ok(Shaper::to_nested(&record))
    }

    /// Installed programs of one agent, paged
    pub fn programs(&self, agent: &AgentId, query: &Query) -> QueryResult<Page<Record>> {
        self.execute(agent, Table::Programs, query)
    }

    fn load(&self, agent: &AgentId, request: &LoadRequest<'_>) -> QueryResult<Loaded> {
        match self.store.load(agent, request) {
            Ok(loaded) => Ok(loaded),
            Err(StoreError::NoRows { .. }) => {
                debug!(agent = %agent, table = %request.table, "no rows");
                Ok(Loaded {
                    rows: Vec::new(),
                    total: request.count.then_some(0),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Platform;
    use crate::query::{Search, SortSpec};
    use crate::storage::StoreResult;
    use serde_json::{json, Value};
    use std::cell::Cell;

    /// Mock storage that records how often it was called
    struct MockStore {
        rows: Vec<Record>,
        no_rows: bool,
        calls: Cell<usize>,
    }

    impl MockStore {
        fn with_rows(rows: Vec<Value>) -> Self {
            Self {
                rows: rows
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .collect(),
                no_rows: false,
                calls: Cell::new(0),
            }
        }

        fn empty_table() -> Self {
            Self {
                no_rows: true,
                ..Self::with_rows(Vec::new())
            }
        }
    }

    impl InventoryStore for MockStore {
        fn load(&self, agent: &AgentId, request: &LoadRequest<'_>) -> StoreResult<Loaded> {
            self.calls.set(self.calls.get() + 1);
            if agent.as_str() == "999" {
                return Err(StoreError::UnknownAgent(agent.clone()));
            }
            if self.no_rows {
                return Err(StoreError::NoRows {
                    agent: agent.clone(),
                    table: request.table,
                });
            }
            let projected: Vec<Record> = self
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .filter(|(k, _)| request.select.contains(*k))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .collect();
            let total = projected.len();
            let page = Page::cut(projected, request.offset, request.limit.unwrap_or(usize::MAX));
            Ok(Loaded {
                rows: page.items,
                total: request.count.then_some(total),
            })
        }
    }

    struct MockDirectory;

    impl AgentDirectory for MockDirectory {
        fn list_agent_ids(&self) -> Vec<AgentId> {
            vec![AgentId::new("001"), AgentId::new("002")]
        }

        fn platform(&self, agent: &AgentId) -> StoreResult<Option<Platform>> {
            match agent.as_str() {
                "001" => Ok(Some(Platform::Windows)),
                "002" => Ok(Some(Platform::Unix)),
                _ => Err(StoreError::UnknownAgent(agent.clone())),
            }
        }
    }

    fn set(fields: &[&str]) -> BTreeSet<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_invalid_select_fails_before_storage() {
        let store = MockStore::with_rows(vec![json!({"name": "curl"})]);
        let executor = QueryExecutor::new(&MockDirectory, &store);

        let query = Query::new().select(["name", "price"]);
        let err = executor.programs(&AgentId::new("001"), &query).unwrap_err();

        assert_eq!(err.code(), 1724);
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn test_invalid_sort_fails_before_storage() {
        let store = MockStore::with_rows(vec![json!({"name": "curl"})]);
        let executor = QueryExecutor::new(&MockDirectory, &store);

        let query = Query::new().with_sort(SortSpec::asc(["price"]));
        let err = executor.programs(&AgentId::new("001"), &query).unwrap_err();

        assert_eq!(err.code(), 1403);
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let store = MockStore::with_rows(Vec::new());
        let executor = QueryExecutor::new(&MockDirectory, &store);

        let err = executor
            .programs(&AgentId::new("001"), &Query::new().with_limit(0))
            .unwrap_err();
        assert_eq!(err, QueryError::InvalidLimit { limit: 0, max: DEFAULT_MAX_LIMIT });
    }

    #[test]
    fn test_no_rows_is_empty_page() {
        let store = MockStore::empty_table();
        let executor = QueryExecutor::new(&MockDirectory, &store);

        let page = executor.programs(&AgentId::new("001"), &Query::new()).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.total_items, 0);
    }

    #[test]
    fn test_no_rows_is_empty_record() {
        let store = MockStore::empty_table();
        let executor = QueryExecutor::new(&MockDirectory, &store);

        let record = executor.hardware_info(&AgentId::new("001"), &BTreeSet::new()).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_unknown_agent_surfaces_on_single_agent_path() {
        let store = MockStore::with_rows(vec![json!({"name": "curl"})]);
        let executor = QueryExecutor::new(&MockDirectory, &store);

        let err = executor.programs(&AgentId::new("999"), &Query::new()).unwrap_err();
        assert!(err.is_unknown_agent());

        let err = executor
            .os_info(&AgentId::new("999"), &BTreeSet::new(), true)
            .unwrap_err();
        assert!(err.is_unknown_agent());
    }

    #[test]
    fn test_total_is_independent_of_pagination() {
        let store = MockStore::with_rows(
            (0..7).map(|i| json!({"name": format!("p{}", i)})).collect(),
        );
        let executor = QueryExecutor::new(&MockDirectory, &store);
        let agent = AgentId::new("001");

        let first = executor.programs(&agent, &Query::new().with_limit(2)).unwrap();
        let later = executor
            .programs(&agent, &Query::new().with_offset(5).with_limit(10))
            .unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(later.len(), 2);
        assert_eq!(first.total_items, 7);
        assert_eq!(later.total_items, 7);
    }

    #[test]
    fn test_os_projection_follows_platform_variant() {
        let store = MockStore::with_rows(vec![json!({
            "hostname": "h", "os_name": "X", "os_version": "1", "sysname": "Linux"
        })]);
        let executor = QueryExecutor::new(&MockDirectory, &store);
        let select = set(&["hostname", "sysname"]);

        let windows = executor.os_info(&AgentId::new("001"), &select, false).unwrap();
        assert_eq!(windows.keys().collect::<Vec<_>>(), vec!["hostname"]);

        let unix = executor.os_info(&AgentId::new("002"), &select, false).unwrap();
        assert_eq!(unix.keys().collect::<Vec<_>>(), vec!["hostname", "sysname"]);
    }

    #[test]
    fn test_os_info_nested_output() {
        let store = MockStore::with_rows(vec![json!({
            "hostname": "h", "os_name": "Ubuntu", "os_version": "22.04"
        })]);
        let executor = QueryExecutor::new(&MockDirectory, &store);

        let record = executor
            .os_info(&AgentId::new("002"), &set(&["hostname", "os_name", "os_version"]), true)
            .unwrap();
        assert_eq!(
            Value::Object(record),
            json!({"hostname": "h", "os": {"name": "Ubuntu", "version": "22.04"}})
        );
    }

    #[test]
    fn test_search_fields_follow_projection() {
        struct SearchSpy(Cell<Vec<String>>);

        impl InventoryStore for SearchSpy {
            fn load(&self, _agent: &AgentId, request: &LoadRequest<'_>) -> StoreResult<Loaded> {
                if let Some(search) = request.search {
                    self.0.set(search.fields.clone());
                }
                Ok(Loaded::default())
            }
        }

        let spy = SearchSpy(Cell::new(Vec::new()));
        let executor = QueryExecutor::new(&MockDirectory, &spy);
        let query = Query::new()
            .select(["name", "vendor"])
            .with_search(Search::new("moz"));

        executor.programs(&AgentId::new("001"), &query).unwrap();
        assert_eq!(spy.0.take(), vec!["name".to_string(), "vendor".to_string()]);
    }
}
