//! Projection, sort and filter validation against a resolved schema
//!
//! Validation semantics:
//! - Omitted or empty projections resolve to every selectable field
//! - Strict tables reject any field outside the allow-list
//! - Intersect tables narrow the projection to the allow-list and only fail
//!   when nothing survives
//! - Sort fields must be sortable
//! - Filter keys must be selectable
//!
//! Fields are never silently dropped in strict mode. Validation runs before
//! any storage access.

use std::collections::BTreeSet;

use crate::query::{Filters, QueryError, QueryResult, SortSpec};

use super::types::{SelectMode, TableSchema};

/// Checks caller-supplied field names against a table schema
pub struct SelectionValidator;

impl SelectionValidator {
    /// Resolves the projection for a table using the table's select mode
    pub fn resolve_select(
        requested: &BTreeSet<String>,
        schema: &TableSchema,
    ) -> QueryResult<BTreeSet<String>> {
        Self::validate(requested, schema, schema.select_mode)
    }

    /// Resolves a projection with an explicit mode
    pub fn validate(
        requested: &BTreeSet<String>,
        schema: &TableSchema,
        mode: SelectMode,
    ) -> QueryResult<BTreeSet<String>> {
        if requested.is_empty() {
            return Ok(schema.selectable.clone());
        }

        let offending: BTreeSet<String> = requested.difference(&schema.selectable).cloned().collect();

        match mode {
            SelectMode::Strict if offending.is_empty() => Ok(requested.clone()),
            SelectMode::Intersect => {
                let resolved: BTreeSet<String> =
                    requested.intersection(&schema.selectable).cloned().collect();
                if resolved.is_empty() {
                    return Err(Self::invalid_field(schema, offending));
                }
                Ok(resolved)
            }
            SelectMode::Strict => Err(Self::invalid_field(schema, offending)),
        }
    }

    /// Rejects sort fields outside the sortable set
    pub fn validate_sort(sort: Option<&SortSpec>, schema: &TableSchema) -> QueryResult<()> {
        let Some(sort) = sort else {
            return Ok(());
        };

        let offending: BTreeSet<String> = sort
            .fields
            .iter()
            .filter(|field| !schema.is_sortable(field))
            .cloned()
            .collect();

        if offending.is_empty() {
            Ok(())
        } else {
            Err(QueryError::InvalidSort {
                offending,
                allowed: schema.sortable.clone(),
            })
        }
    }

    /// Rejects filter keys outside the selectable set
    pub fn validate_filters(filters: &Filters, schema: &TableSchema) -> QueryResult<()> {
        let offending: BTreeSet<String> = filters
            .keys()
            .filter(|field| !schema.is_selectable(field))
            .cloned()
            .collect();

        if offending.is_empty() {
            Ok(())
        } else {
            Err(Self::invalid_field(schema, offending))
        }
    }

    fn invalid_field(schema: &TableSchema, offending: BTreeSet<String>) -> QueryError {
        QueryError::InvalidField {
            table: schema.table,
            offending,
            allowed: schema.selectable.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Platform;
    use crate::schema::{SchemaRegistry, Table};
    use serde_json::json;

    fn set(fields: &[&str]) -> BTreeSet<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    fn name_version_schema() -> TableSchema {
        TableSchema {
            table: Table::Programs,
            select_mode: SelectMode::Strict,
            selectable: set(&["name", "version"]),
            sortable: set(&["name"]),
        }
    }

    #[test]
    fn test_empty_request_projects_everything() {
        let schema = name_version_schema();
        let resolved = SelectionValidator::resolve_select(&BTreeSet::new(), &schema).unwrap();
        assert_eq!(resolved, schema.selectable);
    }

    #[test]
    fn test_strict_rejects_unknown_field() {
        let schema = name_version_schema();
        let err = SelectionValidator::resolve_select(&set(&["name", "price"]), &schema).unwrap_err();

        assert_eq!(err.offending_fields(), Some(&set(&["price"])));
        assert_eq!(err.allowed_fields(), Some(&set(&["name", "version"])));
    }

    #[test]
    fn test_strict_accepts_subset() {
        let schema = name_version_schema();
        let resolved = SelectionValidator::resolve_select(&set(&["version"]), &schema).unwrap();
        assert_eq!(resolved, set(&["version"]));
    }

    #[test]
    fn test_intersect_accepts_partial_match() {
        let schema = SchemaRegistry::builtin().schema_for(Table::OsInfo, Some(Platform::Windows));
        let resolved =
            SelectionValidator::resolve_select(&set(&["sysname", "hostname"]), &schema).unwrap();
        assert_eq!(resolved, set(&["hostname"]));
    }

    #[test]
    fn test_intersect_rejects_disjoint_request() {
        let schema = SchemaRegistry::builtin().schema_for(Table::OsInfo, Some(Platform::Windows));
        let err =
            SelectionValidator::resolve_select(&set(&["sysname", "release"]), &schema).unwrap_err();

        assert_eq!(err.code(), 1724);
        assert_eq!(err.offending_fields(), Some(&set(&["release", "sysname"])));
        assert_eq!(err.allowed_fields(), Some(&schema.selectable));
    }

    #[test]
    fn test_sort_outside_sortable_set() {
        let schema = name_version_schema();
        let sort = SortSpec::asc(["name", "version"]);
        let err = SelectionValidator::validate_sort(Some(&sort), &schema).unwrap_err();
        assert_eq!(err.code(), 1403);
        assert_eq!(err.offending_fields(), Some(&set(&["version"])));

        assert!(SelectionValidator::validate_sort(Some(&SortSpec::asc(["name"])), &schema).is_ok());
        assert!(SelectionValidator::validate_sort(None, &schema).is_ok());
    }

    #[test]
    fn test_filter_keys_must_be_selectable() {
        let schema = name_version_schema();
        let mut filters = Filters::new();
        filters.insert("name".into(), json!("curl"));
        assert!(SelectionValidator::validate_filters(&filters, &schema).is_ok());

        filters.insert("price".into(), json!(3));
        let err = SelectionValidator::validate_filters(&filters, &schema).unwrap_err();
        assert_eq!(err.offending_fields(), Some(&set(&["price"])));
    }
}
