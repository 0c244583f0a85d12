//! Process-wide schema registry
//!
//! The table definitions are static data; the registry never changes after
//! startup and may be shared across threads without synchronization.

use crate::agent::Platform;

use super::types::{SelectMode, Table, TableDef, TableSchema};

const OS_BASE_FIELDS: &[&str] = &[
    "hostname",
    "os_version",
    "os_name",
    "architecture",
    "scan_time",
    "scan_id",
];

const OS_UNIX_FIELDS: &[&str] = &["sysname", "version", "release"];

const HARDWARE_FIELDS: &[&str] = &[
    "board_serial",
    "cpu_name",
    "cpu_cores",
    "cpu_mhz",
    "ram_total",
    "ram_free",
    "scan_id",
    "scan_time",
];

const PROGRAM_FIELDS: &[&str] = &[
    "scan_id",
    "scan_time",
    "format",
    "name",
    "vendor",
    "version",
    "architecture",
    "description",
];

static TABLES: [TableDef; 3] = [
    TableDef {
        table: Table::OsInfo,
        select_mode: SelectMode::Intersect,
        selectable: OS_BASE_FIELDS,
        sortable: OS_BASE_FIELDS,
        variants: &[(Platform::Windows, &[]), (Platform::Unix, OS_UNIX_FIELDS)],
    },
    TableDef {
        table: Table::HwInfo,
        select_mode: SelectMode::Strict,
        selectable: HARDWARE_FIELDS,
        sortable: HARDWARE_FIELDS,
        variants: &[],
    },
    TableDef {
        table: Table::Programs,
        select_mode: SelectMode::Strict,
        selectable: PROGRAM_FIELDS,
        sortable: PROGRAM_FIELDS,
        variants: &[],
    },
];

/// Read-only lookup of table definitions
#[derive(Debug, Clone, Copy)]
pub struct SchemaRegistry {
    tables: &'static [TableDef],
}

impl SchemaRegistry {
    /// Registry of the built-in inventory tables
    pub const fn builtin() -> Self {
        Self { tables: &TABLES }
    }

    /// Returns the static definition of a table
    pub fn definition(&self, table: Table) -> Option<&'static TableDef> {
        self.tables.iter().find(|def| def.table == table)
    }

    /// Resolves the selectable and sortable sets for a table.
    ///
    /// `variant` only matters for tables that declare variants; `None` and
    /// undeclared variants resolve to the broadest variant.
    pub fn schema_for(&self, table: Table, variant: Option<Platform>) -> TableSchema {
        match self.definition(table) {
            Some(def) => def.resolve(variant),
            None => TableSchema {
                table,
                select_mode: SelectMode::Strict,
                selectable: Default::default(),
                sortable: Default::default(),
            },
        }
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_is_registered() {
        let registry = SchemaRegistry::builtin();
        for table in Table::ALL {
            assert!(registry.definition(table).is_some(), "{} missing", table);
        }
    }

    #[test]
    fn test_os_windows_variant_is_base_only() {
        let schema = SchemaRegistry::builtin().schema_for(Table::OsInfo, Some(Platform::Windows));
        let expected: Vec<&str> = vec![
            "architecture",
            "hostname",
            "os_name",
            "os_version",
            "scan_id",
            "scan_time",
        ];
        assert_eq!(schema.selectable.iter().map(String::as_str).collect::<Vec<_>>(), expected);
        assert_eq!(schema.select_mode, SelectMode::Intersect);
    }

    #[test]
    fn test_os_unspecified_variant_falls_back_to_unix() {
        let registry = SchemaRegistry::builtin();
        let broad = registry.schema_for(Table::OsInfo, None);
        let unix = registry.schema_for(Table::OsInfo, Some(Platform::Unix));
        assert_eq!(broad, unix);
        assert!(broad.is_selectable("sysname"));
        assert!(broad.is_selectable("release"));
    }

    #[test]
    fn test_variant_ignored_for_flat_tables() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(
            registry.schema_for(Table::Programs, Some(Platform::Windows)),
            registry.schema_for(Table::Programs, None)
        );
        assert_eq!(registry.schema_for(Table::HwInfo, None).select_mode, SelectMode::Strict);
    }
}
