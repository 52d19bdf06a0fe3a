//! CLI argument definitions using clap
//!
//! Commands:
//! - shapecheck check --schema <path>
//! - shapecheck validate --schema <path> [--input <path>]
//! - shapecheck serve --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shapecheck - validate JSON values against declarative schemas
#[derive(Parser, Debug)]
#[command(name = "shapecheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a schema document without validating anything
    Check {
        /// Path to the schema document
        #[arg(long)]
        schema: PathBuf,
    },

    /// Validate one value and exit
    Validate {
        /// Path to the schema document
        #[arg(long)]
        schema: PathBuf,

        /// Path to the value; one line of stdin when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Serve validation requests from stdin, one JSON object per line
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./shapecheck.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
