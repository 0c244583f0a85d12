//! CLI command implementations
//!
//! Every command runs against a snapshot loaded once at startup. Output is
//! produced by [`run`]; [`execute`] returns the response payload so it can be
//! driven without touching stdout.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::agent::AgentId;
use crate::aggregate::FleetAggregator;
use crate::executor::QueryExecutor;
use crate::storage::MemoryInventory;

use super::args::{parse_filters, Cli, Command};
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments, run the command and write its response
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = Config::resolve(cli.config.as_deref())?;

    init_logging(&config);

    let snapshot = snapshot_path(cli.snapshot, &config)?;
    info!(snapshot = %snapshot.display(), "loading inventory snapshot");
    let inventory = MemoryInventory::load_file(&snapshot)?;
    debug!(agents = inventory.len(), "inventory loaded");

    let data = execute(cli.command, &config, &inventory)?;
    write_response(&data)
}

/// Logs go to stderr so stdout stays a single JSON document.
/// RUST_LOG wins over the configured level.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A subscriber may already be installed when driven from tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn snapshot_path(flag: Option<PathBuf>, config: &Config) -> CliResult<PathBuf> {
    flag.or_else(|| config.snapshot.clone())
        .ok_or_else(|| CliError::usage("No snapshot given: pass --snapshot or set it in the config"))
}

fn selection(fields: Vec<String>) -> BTreeSet<String> {
    fields.into_iter().collect()
}

/// Run one command against `inventory` and return its response payload
pub fn execute(command: Command, config: &Config, inventory: &MemoryInventory) -> CliResult<Value> {
    let executor = QueryExecutor::new(inventory, inventory).with_max_limit(config.max_limit);
    let default_limit = config.database_limit;

    let data = match command {
        Command::Os {
            agent,
            select,
            flat,
        } => {
            info!(agent = %agent, "os");
            let record = executor.os_info(&AgentId::new(agent), &selection(select), !flat)?;
            serde_json::to_value(record)?
        }

        Command::Hardware { agent, select } => {
            info!(agent = %agent, "hardware");
            let record = executor.hardware_info(&AgentId::new(agent), &selection(select))?;
            serde_json::to_value(record)?
        }

        Command::Programs { agent, query } => {
            info!(agent = %agent, "programs");
            let query = query.to_query(default_limit)?;
            let page = executor.programs(&AgentId::new(agent), &query)?;
            serde_json::to_value(page)?
        }

        Command::OsGroups {
            filters,
            offset,
            limit,
        } => {
            info!("os-groups");
            let filters = parse_filters(&filters)?;
            let aggregator = FleetAggregator::with_executor(executor);
            let page = aggregator.os_groups(&filters, offset, limit.unwrap_or(default_limit))?;
            serde_json::to_value(page)?
        }

        Command::ProgramAgents { query } => {
            info!("program-agents");
            let query = query.to_query(default_limit)?;
            let aggregator = FleetAggregator::with_executor(executor);
            let page = aggregator.programs_presence(&query)?;
            serde_json::to_value(page)?
        }

        Command::HardwareFleet { query } => {
            info!("hardware-fleet");
            let query = query.to_query(default_limit)?;
            let aggregator = FleetAggregator::with_executor(executor);
            let page = aggregator.hardware_fleet(&query)?;
            serde_json::to_value(page)?
        }
    };

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::QueryArgs;
    use crate::query::Record;
    use crate::schema::Table;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn inventory() -> MemoryInventory {
        let mut inventory = MemoryInventory::new();
        inventory
            .add_agent("001", Some("windows"))
            .add_agent("002", Some("ubuntu"));
        inventory.insert_rows(
            &AgentId::new("001"),
            Table::OsInfo,
            vec![record(json!({
                "os_name": "Microsoft Windows 10",
                "os_version": "10.0",
                "sysname": "ignored"
            }))],
        );
        inventory.insert_rows(
            &AgentId::new("002"),
            Table::OsInfo,
            vec![record(json!({"os_name": "Ubuntu", "os_version": "22.04", "sysname": "Linux"}))],
        );
        inventory.insert_rows(
            &AgentId::new("002"),
            Table::Programs,
            vec![
                record(json!({"name": "bash", "version": "5.1"})),
                record(json!({"name": "curl", "version": "7.81"})),
            ],
        );
        inventory
    }

    #[test]
    fn test_os_command_nests_by_default() {
        let inventory = inventory();
        let command = Command::Os {
            agent: "002".into(),
            select: vec![],
            flat: false,
        };
        let data = execute(command, &Config::default(), &inventory).unwrap();
        assert_eq!(data["os"], json!({"name": "Ubuntu", "version": "22.04"}));
        assert_eq!(data["sysname"], json!("Linux"));
    }

    #[test]
    fn test_os_command_flat_windows_variant() {
        let inventory = inventory();
        let command = Command::Os {
            agent: "001".into(),
            select: vec![],
            flat: true,
        };
        let data = execute(command, &Config::default(), &inventory).unwrap();
        assert_eq!(data["os_name"], json!("Microsoft Windows 10"));
        assert!(data.get("sysname").is_none());
    }

    #[test]
    fn test_programs_command_uses_configured_default_limit() {
        let inventory = inventory();
        let config = Config {
            database_limit: 1,
            ..Config::default()
        };
        let command = Command::Programs {
            agent: "002".into(),
            query: QueryArgs::default(),
        };
        let data = execute(command, &config, &inventory).unwrap();
        assert_eq!(data["totalItems"], json!(2));
        assert_eq!(data["items"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_limit_above_configured_maximum() {
        let inventory = inventory();
        let config = Config {
            max_limit: 10,
            database_limit: 5,
            ..Config::default()
        };
        let command = Command::ProgramAgents {
            query: QueryArgs {
                limit: Some(11),
                ..QueryArgs::default()
            },
        };
        let err = execute(command, &config, &inventory).unwrap_err();
        assert_eq!(err.code(), 1406);
    }

    #[test]
    fn test_unknown_agent_code() {
        let inventory = inventory();
        let command = Command::Hardware {
            agent: "999".into(),
            select: vec![],
        };
        let err = execute(command, &Config::default(), &inventory).unwrap_err();
        assert_eq!(err.code(), 1701);
    }

    #[test]
    fn test_snapshot_flag_overrides_config() {
        let config = Config {
            snapshot: Some(PathBuf::from("from-config.json")),
            ..Config::default()
        };
        let path = snapshot_path(Some(PathBuf::from("flag.json")), &config).unwrap();
        assert_eq!(path, PathBuf::from("flag.json"));

        let path = snapshot_path(None, &config).unwrap();
        assert_eq!(path, PathBuf::from("from-config.json"));

        assert!(snapshot_path(None, &Config::default()).is_err());
    }
}
