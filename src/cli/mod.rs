//! Command line front end
//!
//! - os / hardware / programs: single-agent queries
//! - os-groups / program-agents / hardware-fleet: fleet aggregation

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{parse_filters, Cli, Command, QueryArgs};
pub use commands::{execute, run};
pub use config::Config;
pub use errors::{CliError, CliResult};
pub use io::{write_error, write_response};
