//! Observable events
//!
//! Events are explicit and typed. The validation engine itself emits
//! nothing; these are raised by the command-line front end.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file read and accepted
    ConfigLoaded,
    /// Schema registry populated
    SchemasLoaded,
    /// A schema document could not be parsed
    SchemaRejected,
    /// A value conformed to its schema
    ValidationPassed,
    /// A value violated its schema
    ValidationFailed,
    /// A request line could not be served
    RequestRejected,
    /// Ready to read requests
    Serving,
    /// Input exhausted, exiting
    ShutdownComplete,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::ValidationPassed => "VALIDATION_PASSED",
            Event::ValidationFailed => "VALIDATION_FAILED",
            Event::RequestRejected => "REQUEST_REJECTED",
            Event::Serving => "SERVING",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
        }
    }

    /// Per-value outcomes are high volume and logged at trace level.
    pub fn is_per_value(&self) -> bool {
        matches!(self, Event::ValidationPassed | Event::ValidationFailed)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SchemaRejected | Event::RequestRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
