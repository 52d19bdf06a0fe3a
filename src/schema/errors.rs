//! Schema error types
//!
//! Two families:
//! - `ValidationError`: a value violates a schema. Never a Rust failure;
//!   it is recorded in a report and the caller gets `false`.
//! - `SchemaError`: a schema *document* could not be read or parsed, or a
//!   registry operation was refused.
//!
//! Error codes:
//! - SCHEMA_MALFORMED
//! - SCHEMA_INVALID_PATTERN
//! - SCHEMA_UNKNOWN
//! - SCHEMA_DUPLICATE
//! - SCHEMA_IO

use std::fmt;
use std::io;

use thiserror::Error;

/// One violated rule. `Display` yields the fixed message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationErrorKind {
    #[error("Value is null, but nullable false")]
    NullNotAllowed,

    #[error("None schemas are valid")]
    NoSchemaMatched,

    #[error("More than one shema valid for this data")]
    MultipleSchemasMatched,

    #[error("Type is incorrect")]
    TypeMismatch,

    #[error("Unknown type")]
    UnknownType,

    // number
    #[error("Value is less than it can be")]
    BelowMinimum,

    #[error("Value is greater than it can be")]
    AboveMaximum,

    #[error("The enum does not support value")]
    NotInEnum,

    // string
    #[error("Too long string")]
    StringTooLong,

    #[error("Too short string")]
    StringTooShort,

    #[error("String does not match pattern")]
    PatternMismatch,

    #[error("Format of string is not valid")]
    InvalidFormat,

    // array
    #[error("Items count more than can be")]
    TooManyItems,

    #[error("Items count less than can be")]
    TooFewItems,

    #[error("Must contain a value, but does not")]
    MissingContainedValue,

    #[error("Elements of array not unique")]
    DuplicateItems,

    #[error("The enum does not support one of array elements")]
    ArrayNotInEnum,

    // object
    #[error("Too many properties in object")]
    TooManyProperties,

    #[error("Too few properties in object")]
    TooFewProperties,

    #[error("Property required, but value is undefined")]
    MissingRequiredProperty,

    #[error("An object cant have additional properties")]
    AdditionalProperty,
}

impl ValidationErrorKind {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NullNotAllowed => "NULL_NOT_ALLOWED",
            Self::NoSchemaMatched => "NO_SCHEMA_MATCHED",
            Self::MultipleSchemasMatched => "MULTIPLE_SCHEMAS_MATCHED",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::UnknownType => "UNKNOWN_TYPE",
            Self::BelowMinimum => "BELOW_MINIMUM",
            Self::AboveMaximum => "ABOVE_MAXIMUM",
            Self::NotInEnum => "NOT_IN_ENUM",
            Self::StringTooLong => "STRING_TOO_LONG",
            Self::StringTooShort => "STRING_TOO_SHORT",
            Self::PatternMismatch => "PATTERN_MISMATCH",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::TooManyItems => "TOO_MANY_ITEMS",
            Self::TooFewItems => "TOO_FEW_ITEMS",
            Self::MissingContainedValue => "MISSING_CONTAINED_VALUE",
            Self::DuplicateItems => "DUPLICATE_ITEMS",
            Self::ArrayNotInEnum => "ARRAY_NOT_IN_ENUM",
            Self::TooManyProperties => "TOO_MANY_PROPERTIES",
            Self::TooFewProperties => "TOO_FEW_PROPERTIES",
            Self::MissingRequiredProperty => "MISSING_REQUIRED_PROPERTY",
            Self::AdditionalProperty => "ADDITIONAL_PROPERTY",
        }
    }
}

/// A violation together with where in the value it was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ValidationError {
    kind: ValidationErrorKind,
    /// JSON pointer to the offending value; empty for the root
    path: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// Schema document and registry error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Document is not a valid schema
    Malformed,
    /// A `pattern` keyword does not compile
    InvalidPattern,
    /// No schema registered under the name
    Unknown,
    /// Name already registered
    Duplicate,
    /// File could not be read
    Io,
}

impl SchemaErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::Malformed => "SCHEMA_MALFORMED",
            SchemaErrorCode::InvalidPattern => "SCHEMA_INVALID_PATTERN",
            SchemaErrorCode::Unknown => "SCHEMA_UNKNOWN",
            SchemaErrorCode::Duplicate => "SCHEMA_DUPLICATE",
            SchemaErrorCode::Io => "SCHEMA_IO",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Schema error with context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Where the schema came from, if it came from a file
    origin: Option<String>,
}

impl SchemaError {
    /// Create a malformed schema error
    pub fn malformed(origin: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::Malformed,
            message: reason.into(),
            origin: origin.map(str::to_string),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(origin: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::InvalidPattern,
            message: reason.into(),
            origin: origin.map(str::to_string),
        }
    }

    pub fn unknown(name: &str) -> Self {
        Self {
            code: SchemaErrorCode::Unknown,
            message: format!("Schema '{}' not found", name),
            origin: None,
        }
    }

    pub fn duplicate(name: &str) -> Self {
        Self {
            code: SchemaErrorCode::Duplicate,
            message: format!("Schema '{}' is already registered", name),
            origin: None,
        }
    }

    pub fn io(origin: &str, err: &io::Error) -> Self {
        Self {
            code: SchemaErrorCode::Io,
            message: err.to_string(),
            origin: Some(origin.to_string()),
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(origin) = &self.origin {
            write!(f, " ({})", origin)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema document operations
pub type SchemaResult<T> = Result<T, SchemaError>;
