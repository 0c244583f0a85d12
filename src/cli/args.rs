//! CLI argument definitions using clap
//!
//! Commands:
//! - syscollector os --agent <id> [--select a,b] [--flat]
//! - syscollector hardware --agent <id> [--select a,b]
//! - syscollector programs --agent <id> [query options]
//! - syscollector os-groups [--filter k=v]... [--offset n] [--limit n]
//! - syscollector program-agents [query options]
//! - syscollector hardware-fleet [query options]

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::query::{Filters, Query, Search, SortOrder, SortSpec};

use super::errors::{CliError, CliResult};

/// syscollector - query per-agent inventory
#[derive(Parser, Debug)]
#[command(name = "syscollector")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Fleet snapshot to query (overrides the configuration file)
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Operating system of one agent
    Os {
        #[arg(long)]
        agent: String,
        /// Fields to project (comma separated)
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
        /// Return flat field names instead of nested output
        #[arg(long)]
        flat: bool,
    },

    /// Hardware of one agent
    Hardware {
        #[arg(long)]
        agent: String,
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
    },

    /// Installed programs of one agent
    Programs {
        #[arg(long)]
        agent: String,
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Operating systems across the fleet, grouped by name and version
    OsGroups {
        /// Exact-match filter (repeatable)
        #[arg(long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Agents with at least one matching installed program
    ProgramAgents {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Hardware records across the fleet
    HardwareFleet {
        #[command(flatten)]
        query: QueryArgs,
    },
}

/// Query surface shared by paged commands
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Fields to project (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Exact-match filter (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Case-insensitive substring search
    #[arg(long)]
    pub search: Option<String>,

    /// Invert the search
    #[arg(long, requires = "search")]
    pub negate: bool,

    /// Sort fields (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub sort: Vec<String>,

    /// Sort direction: asc or desc
    #[arg(long, default_value = "asc")]
    pub order: String,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    #[arg(long)]
    pub limit: Option<usize>,
}

impl Default for QueryArgs {
    fn default() -> Self {
        Self {
            select: Vec::new(),
            filters: Vec::new(),
            search: None,
            negate: false,
            sort: Vec::new(),
            order: SortOrder::Asc.as_str().to_string(),
            offset: 0,
            limit: None,
        }
    }
}

impl QueryArgs {
    /// Builds the query, using `default_limit` when no --limit was given
    pub fn to_query(&self, default_limit: usize) -> CliResult<Query> {
        let mut query = Query::new()
            .with_offset(self.offset)
            .with_limit(self.limit.unwrap_or(default_limit));

        if !self.select.is_empty() {
            query.select = Some(self.select.iter().cloned().collect::<BTreeSet<_>>());
        }

        query.filters = parse_filters(&self.filters)?;

        if let Some(value) = &self.search {
            query.search = Some(Search {
                value: value.clone(),
                negate: self.negate,
                fields: Vec::new(),
            });
        }

        if !self.sort.is_empty() {
            let order = SortOrder::parse(&self.order)
                .ok_or_else(|| CliError::usage(format!("Invalid sort order: {}", self.order)))?;
            query.sort = Some(SortSpec {
                fields: self.sort.clone(),
                order,
            });
        }

        Ok(query)
    }
}

/// Parses KEY=VALUE filters. Values are kept as text; numeric columns still
/// match through the filter predicate's textual comparison.
pub fn parse_filters(raw: &[String]) -> CliResult<Filters> {
    let mut filters = Filters::new();
    for item in raw {
        let (key, value) = item
            .split_once('=')
            .filter(|(key, _)| !key.trim().is_empty())
            .ok_or_else(|| CliError::usage(format!("Filter must be KEY=VALUE: {}", item)))?;

        filters.insert(key.trim().to_string(), Value::String(value.to_string()));
    }
    Ok(filters)
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
