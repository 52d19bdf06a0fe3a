//! shapecheck - a focused, deterministic schema validator for JSON values
//!
//! ```ignore
//! use serde_json::json;
//! use shapecheck::schema::{SchemaLoader, Validator};
//!
//! let schema = SchemaLoader::parse(&json!({"type": "number", "minimum": 5}))?;
//! let mut validator = Validator::new();
//! assert!(!validator.is_valid(&schema, &json!(1)));
//! assert_eq!(validator.errors()[0].to_string(), "Value is less than it can be");
//! ```

pub mod cli;
pub mod observability;
pub mod schema;
