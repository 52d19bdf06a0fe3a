//! CLI command implementations
//!
//! Commands are thin: they load schemas, hand values to the validation
//! engine, and print its verdict. Invalid data is a normal response, not
//! a command failure.

use std::io::{self, Write};
use std::path::Path;

use serde_json::{json, Value};

use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::schema::{self, SchemaError, SchemaLoader, ValidationReport};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{
    error_json, read_request, read_requests, read_value_file, response_json, write_error,
    write_line, write_response,
};

/// Parse arguments and run the selected command
///
/// A failing command still answers on stdout with an error envelope
/// before the error is handed back to `main`.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command).map_err(|e| {
        let _ = write_error(e.code_str(), e.message());
        e
    })
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check { schema } => check(&schema),
        Command::Validate { schema, input } => validate(&schema, input.as_deref()),
        Command::Serve { config } => serve(&config),
    }
}

/// Parse a schema document and report success
pub fn check(schema_path: &Path) -> CliResult<()> {
    load_schema(schema_path)?;
    write_response(json!({ "schema": schema_path.display().to_string() }))
}

/// Validate one value read from `input`, or from one line of stdin
pub fn validate(schema_path: &Path, input: Option<&Path>) -> CliResult<()> {
    let schema = load_schema(schema_path)?;
    let value = match input {
        Some(path) => read_value_file(path)?,
        None => read_request()?,
    };

    let report = schema::validate(&schema, &value);
    let schema_display = schema_path.display().to_string();
    log_outcome(&schema_display, &report);
    write_response(report_json(&report))
}

/// Serve `{"schema": <name>, "value": <any>}` requests from stdin
///
/// Each request gets exactly one response line. A request that cannot be
/// served gets an error response and the loop continues, unless
/// `fail_fast_batch` is set. Read failures on stdin end the loop.
pub fn serve(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity());
    let config_display = config_path.display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("path", config_display.as_str())]);

    let schema_dir = config.schema_path(config_path);
    let mut loader = SchemaLoader::new();
    let count = loader.load_dir(&schema_dir).map_err(reject_schema)?;

    let count_text = count.to_string();
    let dir_display = schema_dir.display().to_string();
    log_event_with_fields(
        Event::SchemasLoaded,
        &[("count", count_text.as_str()), ("dir", dir_display.as_str())],
    );

    log_event(Event::Serving);
    let served = serve_requests(
        &loader,
        read_requests(),
        config.fail_fast_batch,
        &mut io::stdout(),
    )?;

    let served_text = served.to_string();
    log_event_with_fields(Event::ShutdownComplete, &[("served", served_text.as_str())]);
    Ok(())
}

/// Answer each request with one line on `out`; returns how many were answered
///
/// A rejected request is answered with an error line and counts as served.
/// Read failures end the loop, as does the first rejection under
/// `fail_fast`.
pub fn serve_requests<I, W>(
    loader: &SchemaLoader,
    requests: I,
    fail_fast: bool,
    out: &mut W,
) -> CliResult<usize>
where
    I: IntoIterator<Item = CliResult<Value>>,
    W: Write,
{
    let mut served = 0usize;

    for request in requests {
        let outcome = match request {
            Ok(request) => handle_request(loader, &request),
            Err(e) if e.code() == CliErrorCode::IoError => {
                write_line(out, &error_json(e.code_str(), e.message()))?;
                break;
            }
            Err(e) => Err(e),
        };

        served += 1;
        match outcome {
            Ok(data) => write_line(out, &response_json(data))?,
            Err(e) => {
                log_event_with_fields(Event::RequestRejected, &[("reason", e.message())]);
                write_line(out, &error_json(e.code_str(), e.message()))?;
                if fail_fast {
                    break;
                }
            }
        }
    }

    Ok(served)
}

/// Validate one request against the registry and return the response data
pub fn handle_request(loader: &SchemaLoader, request: &Value) -> CliResult<Value> {
    let request = request
        .as_object()
        .ok_or_else(|| CliError::bad_request("Request must be a JSON object"))?;

    let name = request
        .get("schema")
        .and_then(Value::as_str)
        .ok_or_else(|| CliError::bad_request("Request must name a 'schema'"))?;

    // An explicit null is a value to check; an absent key is not.
    let value = request
        .get("value")
        .ok_or_else(|| CliError::bad_request("Request must carry a 'value'"))?;

    let schema = loader.require(name)?;
    let report = schema::validate(schema, value);
    log_outcome(name, &report);

    let mut data = report_json(&report);
    data["schema"] = json!(name);
    Ok(data)
}

/// Render a report as response data
pub fn report_json(report: &ValidationReport) -> Value {
    let errors: Vec<Value> = report
        .errors()
        .iter()
        .map(|error| {
            json!({
                "code": error.code(),
                "message": error.message(),
                "path": error.path(),
            })
        })
        .collect();

    json!({
        "valid": report.is_valid(),
        "errors": errors,
    })
}

fn load_schema(path: &Path) -> CliResult<schema::SchemaNode> {
    SchemaLoader::load_file(path).map_err(reject_schema)
}

fn reject_schema(e: SchemaError) -> CliError {
    let reason = e.to_string();
    log_event_with_fields(Event::SchemaRejected, &[("reason", reason.as_str())]);
    CliError::from(e)
}

fn log_outcome(schema_name: &str, report: &ValidationReport) {
    match report.first_error() {
        None => log_event_with_fields(Event::ValidationPassed, &[("schema", schema_name)]),
        Some(error) => log_event_with_fields(
            Event::ValidationFailed,
            &[
                ("code", error.code()),
                ("path", error.path()),
                ("schema", schema_name),
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaNode;

    fn registry() -> SchemaLoader {
        let mut loader = SchemaLoader::new();
        loader
            .register(
                "user",
                SchemaNode::object()
                    .with_required(["name"])
                    .with_property("name", SchemaNode::string()),
            )
            .unwrap();
        loader
    }

    #[test]
    fn test_handle_valid_request() {
        let data = handle_request(&registry(), &json!({"schema": "user", "value": {"name": "A"}}))
            .unwrap();
        assert_eq!(data["valid"], true);
        assert_eq!(data["schema"], "user");
        assert_eq!(data["errors"], json!([]));
    }

    #[test]
    fn test_handle_invalid_value() {
        let data =
            handle_request(&registry(), &json!({"schema": "user", "value": {"name": 1}})).unwrap();
        assert_eq!(data["valid"], false);
        assert_eq!(data["errors"][0]["message"], "Type is incorrect");
        assert_eq!(data["errors"][0]["code"], "TYPE_MISMATCH");
        assert_eq!(data["errors"][0]["path"], "/name");
    }

    #[test]
    fn test_handle_null_value_is_checked() {
        let data = handle_request(&registry(), &json!({"schema": "user", "value": null})).unwrap();
        assert_eq!(data["errors"][0]["message"], "Value is null, but nullable false");
    }

    #[test]
    fn test_handle_missing_value() {
        let err = handle_request(&registry(), &json!({"schema": "user"})).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::BadRequest);
    }

    #[test]
    fn test_handle_unknown_schema() {
        let err = handle_request(&registry(), &json!({"schema": "ghost", "value": 1})).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::SchemaError);
    }

    #[test]
    fn test_handle_non_object_request() {
        let err = handle_request(&registry(), &json!([1])).unwrap_err();
        assert_eq!(err.code(), CliErrorCode::BadRequest);
    }

    fn batch() -> Vec<CliResult<Value>> {
        vec![
            Ok(json!({"schema": "user", "value": {"name": "A"}})),
            Err(CliError::bad_request("Invalid JSON")),
            Ok(json!({"schema": "user", "value": {"name": 1}})),
        ]
    }

    fn response_lines(out: &[u8]) -> Vec<Value> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_serve_requests_answers_every_line() {
        let mut out = Vec::new();
        let served = serve_requests(&registry(), batch(), false, &mut out).unwrap();

        let lines = response_lines(&out);
        assert_eq!(served, 3);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["data"]["valid"], true);
        assert_eq!(lines[1]["code"], "CLI_BAD_REQUEST");
        assert_eq!(lines[2]["data"]["valid"], false);
    }

    #[test]
    fn test_serve_requests_fail_fast_counts_rejected_line() {
        let mut out = Vec::new();
        let served = serve_requests(&registry(), batch(), true, &mut out).unwrap();

        let lines = response_lines(&out);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["status"], "error");
        assert_eq!(served, lines.len());
    }

    #[test]
    fn test_serve_requests_stops_on_read_failure() {
        let requests = vec![
            Err(CliError::io_error("stdin closed")),
            Ok(json!({"schema": "user", "value": {"name": "A"}})),
        ];
        let mut out = Vec::new();
        let served = serve_requests(&registry(), requests, false, &mut out).unwrap();

        assert_eq!(served, 0);
        assert_eq!(response_lines(&out)[0]["code"], "CLI_IO_ERROR");
    }
}
