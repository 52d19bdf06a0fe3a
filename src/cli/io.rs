//! JSON I/O handling for CLI
//!
//! - Input: JSON values, one per line on stdin, or a whole file
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read a single JSON value from one line of stdin
pub fn read_request() -> CliResult<Value> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    parse_line(&line)?.ok_or_else(|| CliError::io_error("Empty input"))
}

/// Read JSON values from stdin until EOF, skipping blank lines.
///
/// Unparseable lines yield `CLI_BAD_REQUEST`; read failures yield `CLI_IO_ERROR`.
pub fn read_requests() -> impl Iterator<Item = CliResult<Value>> {
    io::stdin()
        .lock()
        .lines()
        .filter_map(|line| match line {
            Ok(line) => parse_line(&line).transpose(),
            Err(e) => Some(Err(CliError::from(e))),
        })
}

/// Read a JSON value from a file
pub fn read_value_file(path: &Path) -> CliResult<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::bad_request(format!("Invalid JSON in {}: {}", path.display(), e)))
}

fn parse_line(line: &str) -> CliResult<Option<Value>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| CliError::bad_request(format!("Invalid JSON: {}", e)))
}

/// Success envelope
pub fn response_json(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

/// Error envelope
pub fn error_json(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&mut io::stdout(), &response_json(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&mut io::stdout(), &error_json(code, message))
}

/// Write one JSON value as a single line
pub(crate) fn write_line<W: Write>(writer: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value)
        .map_err(|e| CliError::io_error(format!("Failed to write response: {}", e)))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;

    #[test]
    fn test_parse_line_skips_blank() {
        assert!(parse_line("   \n").unwrap().is_none());
        assert_eq!(parse_line("{\"a\":1}\n").unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn test_parse_line_bad_json() {
        let err = parse_line("{oops").unwrap_err();
        assert_eq!(err.code(), CliErrorCode::BadRequest);
    }

    #[test]
    fn test_write_line_is_one_line() {
        let mut buffer = Vec::new();
        write_line(&mut buffer, &response_json(json!({"valid": true}))).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.ends_with('\n'));
        assert_eq!(text.matches('\n').count(), 1);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["data"]["valid"], true);
    }

    #[test]
    fn test_error_envelope() {
        let value = error_json("CLI_BAD_REQUEST", "nope");
        assert_eq!(value["status"], "error");
        assert_eq!(value["code"], "CLI_BAD_REQUEST");
        assert_eq!(value["message"], "nope");
    }

    #[test]
    fn test_read_value_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("value.json");
        fs::write(&path, "[1, 2,\n 3]").unwrap();
        assert_eq!(read_value_file(&path).unwrap(), json!([1, 2, 3]));
    }
}
