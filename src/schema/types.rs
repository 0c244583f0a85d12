//! Table schema definitions
//!
//! Each inventory table declares which fields a caller may project and which
//! it may sort by. Tables whose columns depend on the agent's platform carry
//! per-variant extensions on top of a shared base set.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::agent::Platform;

/// Logical inventory tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    /// Operating system information
    #[serde(rename = "sys_osinfo")]
    OsInfo,
    /// Hardware information
    #[serde(rename = "sys_hwinfo")]
    HwInfo,
    /// Installed programs
    #[serde(rename = "sys_programs")]
    Programs,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::OsInfo, Table::HwInfo, Table::Programs];

    /// Storage name of the table
    pub fn name(&self) -> &'static str {
        match self {
            Table::OsInfo => "sys_osinfo",
            Table::HwInfo => "sys_hwinfo",
            Table::Programs => "sys_programs",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown table: {}", s))
    }
}

/// How a requested projection is reconciled with the allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Every requested field must be allowed
    Strict,
    /// Requested fields are narrowed to the allowed ones; fails only when
    /// nothing survives
    Intersect,
}

/// Static description of one table.
///
/// `variants` extends both the selectable and the sortable base sets.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub table: Table,
    pub select_mode: SelectMode,
    pub selectable: &'static [&'static str],
    pub sortable: &'static [&'static str],
    pub variants: &'static [(Platform, &'static [&'static str])],
}

impl TableDef {
    /// Returns true if the table's columns depend on the agent platform
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Extension fields for the requested variant.
    ///
    /// An unspecified or undeclared variant yields the union of every
    /// declared extension, i.e. the broadest schema.
    fn extension(&self, variant: Option<Platform>) -> BTreeSet<&'static str> {
        let declared = variant.and_then(|p| {
            self.variants
                .iter()
                .find(|(platform, _)| *platform == p)
                .map(|(_, fields)| *fields)
        });

        match declared {
            Some(fields) => fields.iter().copied().collect(),
            None => self
                .variants
                .iter()
                .flat_map(|(_, fields)| fields.iter().copied())
                .collect(),
        }
    }

    /// Resolves the allow-lists for the given variant
    pub fn resolve(&self, variant: Option<Platform>) -> TableSchema {
        let extension = self.extension(variant);
        let widen = |base: &[&str]| -> BTreeSet<String> {
            base.iter()
                .copied()
                .chain(extension.iter().copied())
                .map(str::to_string)
                .collect()
        };

        TableSchema {
            table: self.table,
            select_mode: self.select_mode,
            selectable: widen(self.selectable),
            sortable: widen(self.sortable),
        }
    }
}

/// Allow-lists for one table after variant resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: Table,
    pub select_mode: SelectMode,
    pub selectable: BTreeSet<String>,
    pub sortable: BTreeSet<String>,
}

impl TableSchema {
    pub fn is_selectable(&self, field: &str) -> bool {
        self.selectable.contains(field)
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.contains(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEF: TableDef = TableDef {
        table: Table::OsInfo,
        select_mode: SelectMode::Intersect,
        selectable: &["a", "b"],
        sortable: &["a"],
        variants: &[(Platform::Windows, &[]), (Platform::Unix, &["c"])],
    };

    #[test]
    fn test_declared_variant_extends_base() {
        let schema = DEF.resolve(Some(Platform::Unix));
        assert!(schema.is_selectable("c"));
        assert!(schema.is_sortable("c"));

        let schema = DEF.resolve(Some(Platform::Windows));
        assert!(!schema.is_selectable("c"));
        assert_eq!(schema.selectable.len(), 2);
    }

    #[test]
    fn test_unknown_variant_is_broadest() {
        let schema = DEF.resolve(None);
        assert_eq!(schema.selectable, DEF.resolve(Some(Platform::Unix)).selectable);
    }

    #[test]
    fn test_table_names_roundtrip() {
        for table in Table::ALL {
            assert_eq!(table.name().parse::<Table>().unwrap(), table);
        }
        assert!("sys_ports".parse::<Table>().is_err());
    }
}
