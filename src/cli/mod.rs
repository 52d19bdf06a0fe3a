//! CLI module for shapecheck
//!
//! Provides command-line interface for:
//! - check: Parse a schema document and report whether it is well formed
//! - validate: One-shot validation of a single value
//! - serve: Validate JSON-lines requests from stdin against a schema directory

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    check, handle_request, report_json, run, run_command, serve, serve_requests, validate,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_json, response_json, write_error, write_response};
