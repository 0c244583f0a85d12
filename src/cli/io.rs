//! JSON output for the CLI
//!
//! Every invocation writes exactly one JSON object to stdout:
//! `{"error":0,"data":...}` on success, `{"error":<code>,"message":...}`
//! on failure.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::json;

use super::errors::CliResult;

/// Write a success response to `out`
pub fn write_response_to<W: Write, T: Serialize>(out: &mut W, data: &T) -> CliResult<()> {
    let response = json!({
        "error": 0,
        "data": data,
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

/// Write an error response to `out`
pub fn write_error_to<W: Write>(out: &mut W, code: u16, message: &str) -> CliResult<()> {
    let response = json!({
        "error": code,
        "message": message,
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

/// Write a success response to stdout
pub fn write_response<T: Serialize>(data: &T) -> CliResult<()> {
    write_response_to(&mut io::stdout().lock(), data)
}

/// Write an error response to stdout
pub fn write_error(code: u16, message: &str) -> CliResult<()> {
    write_error_to(&mut io::stdout().lock(), code, message)
}
