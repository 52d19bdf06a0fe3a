//! Schema subsystem for shapecheck
//!
//! A schema is a tree of `SchemaNode`s. `validate` checks one value
//! against one tree and reports the first violation it meets.
//!
//! # Design Principles
//!
//! - Schemas are immutable once built
//! - Construction validates nothing; malformed nodes surface as
//!   validation failures
//! - Validation never panics and never performs I/O
//! - Deterministic validation

mod equality;
mod errors;
mod format;
mod loader;
mod sink;
mod types;
mod validator;

pub use equality::deep_equal;
pub use errors::{
    SchemaError, SchemaErrorCode, SchemaResult, ValidationError, ValidationErrorKind,
};
pub use format::{check_format, is_date, is_email};
pub use loader::SchemaLoader;
pub use sink::ErrorSink;
pub use types::{Format, Items, Pattern, Properties, SchemaNode, SchemaType};
pub use validator::{validate, ValidationReport, Validator};
