//! JSON I/O handling for CLI
//!
//! - Input: one JSON document on stdin
//! - Output: one JSON object per command on stdout
//! - Logs never go to stdout

use std::io::{self, Read, Write};

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read one JSON document from stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    parse_request(&input)
}

fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Err(CliError::invalid_request("empty input"));
    }
    serde_json::from_str(input).map_err(|e| CliError::invalid_request(format!("invalid JSON: {}", e)))
}

/// Write `{"status": "ok", "data": ...}` to stdout
pub fn write_response<T: Serialize + ?Sized>(data: &T) -> CliResult<()> {
    let data = serde_json::to_value(data)
        .map_err(|e| CliError::io_error(format!("failed to serialize response: {}", e)))?;
    write_line(&serde_json::json!({
        "status": "ok",
        "data": data
    }))
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)
        .map_err(|e| CliError::io_error(format!("failed to write response: {}", e)))?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
