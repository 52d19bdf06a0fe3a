//! Validation engine
//!
//! Walks a `SchemaNode` and a `serde_json::Value` in lock-step.
//!
//! Evaluation order per node:
//! 1. null: valid iff `nullable`
//! 2. `anyOf`: at least one member valid
//! 3. `oneOf`: exactly one member valid (every member is evaluated)
//! 4. `type` dispatch; rules are checked in a fixed order and the first
//!    failing rule ends the node
//!
//! A failure inside an array element or an object property is the
//! failure of the enclosing node. Failures inside combinator members are
//! discarded; only the combinator verdict is reported.
//!
//! Validation is deterministic and never mutates its inputs.

use serde_json::{Map, Value};

use super::equality::{all_unique, contains_equal};
use super::errors::{ValidationError, ValidationErrorKind};
use super::format::check_format;
use super::sink::ErrorSink;
use super::types::{Items, SchemaNode, SchemaType};

type Check = Result<(), ValidationError>;

/// Result of validating one value against one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    valid: bool,
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Violations in detection order
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn first_error(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

/// Validates `value` against `schema`.
pub fn validate(schema: &SchemaNode, value: &Value) -> ValidationReport {
    match check(schema, value, "") {
        Ok(()) => ValidationReport {
            valid: true,
            errors: Vec::new(),
        },
        Err(error) => ValidationReport {
            valid: false,
            errors: vec![error],
        },
    }
}

/// Validator that keeps the errors of its most recent pass.
///
/// Use one instance per caller; concurrent callers sharing an instance
/// need external locking around `is_valid` + `errors`.
#[derive(Debug, Default)]
pub struct Validator {
    errors: ErrorSink,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears previous errors, validates, and records any violation.
    pub fn is_valid(&mut self, schema: &SchemaNode, value: &Value) -> bool {
        self.errors.clear();
        let report = validate(schema, value);
        let valid = report.is_valid();
        self.errors.extend(report.into_errors());
        valid
    }

    /// Errors from the most recent `is_valid` call
    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }
}

fn check(schema: &SchemaNode, value: &Value, path: &str) -> Check {
    if value.is_null() {
        return if schema.nullable {
            Ok(())
        } else {
            fail(ValidationErrorKind::NullNotAllowed, path)
        };
    }

    if !schema.any_of.is_empty() {
        return check_any_of(&schema.any_of, value, path);
    }

    if !schema.one_of.is_empty() {
        return check_one_of(&schema.one_of, value, path);
    }

    match &schema.schema_type {
        Some(SchemaType::Number) => check_number(schema, value, path),
        Some(SchemaType::String) => check_string(schema, value, path),
        Some(SchemaType::Boolean) => check_boolean(value, path),
        Some(SchemaType::Array) => check_array(schema, value, path),
        Some(SchemaType::Object) => check_object(schema, value, path),
        Some(SchemaType::Unknown(_)) | None => fail(ValidationErrorKind::UnknownType, path),
    }
}

fn check_any_of(members: &[SchemaNode], value: &Value, path: &str) -> Check {
    if members.iter().any(|member| check(member, value, path).is_ok()) {
        Ok(())
    } else {
        fail(ValidationErrorKind::NoSchemaMatched, path)
    }
}

fn check_one_of(members: &[SchemaNode], value: &Value, path: &str) -> Check {
    let matched = members
        .iter()
        .filter(|member| check(member, value, path).is_ok())
        .count();

    match matched {
        0 => fail(ValidationErrorKind::NoSchemaMatched, path),
        1 => Ok(()),
        _ => fail(ValidationErrorKind::MultipleSchemasMatched, path),
    }
}

fn check_number(schema: &SchemaNode, value: &Value, path: &str) -> Check {
    let Some(number) = value.as_f64() else {
        return fail(ValidationErrorKind::TypeMismatch, path);
    };

    if let Some(minimum) = schema.minimum {
        if number < minimum {
            return fail(ValidationErrorKind::BelowMinimum, path);
        }
    }

    if let Some(maximum) = schema.maximum {
        if number > maximum {
            return fail(ValidationErrorKind::AboveMaximum, path);
        }
    }

    check_enum(schema, value, ValidationErrorKind::NotInEnum, path)
}

fn check_string(schema: &SchemaNode, value: &Value, path: &str) -> Check {
    let Some(s) = value.as_str() else {
        return fail(ValidationErrorKind::TypeMismatch, path);
    };

    // Lengths count Unicode scalar values, not bytes.
    let length = s.chars().count() as u64;

    if let Some(max_length) = schema.max_length {
        if length > max_length {
            return fail(ValidationErrorKind::StringTooLong, path);
        }
    }

    if let Some(min_length) = schema.min_length {
        if length < min_length {
            return fail(ValidationErrorKind::StringTooShort, path);
        }
    }

    if let Some(pattern) = &schema.pattern {
        if !pattern.is_match(s) {
            return fail(ValidationErrorKind::PatternMismatch, path);
        }
    }

    if let Some(format) = &schema.format {
        if !check_format(format, s) {
            return fail(ValidationErrorKind::InvalidFormat, path);
        }
    }

    check_enum(schema, value, ValidationErrorKind::NotInEnum, path)
}

fn check_boolean(value: &Value, path: &str) -> Check {
    if value.is_boolean() {
        Ok(())
    } else {
        fail(ValidationErrorKind::TypeMismatch, path)
    }
}

fn check_array(schema: &SchemaNode, value: &Value, path: &str) -> Check {
    let Some(elements) = value.as_array() else {
        return fail(ValidationErrorKind::TypeMismatch, path);
    };
    let count = elements.len() as u64;

    if let Some(max_items) = schema.max_items {
        if count > max_items {
            return fail(ValidationErrorKind::TooManyItems, path);
        }
    }

    if let Some(min_items) = schema.min_items {
        if count < min_items {
            return fail(ValidationErrorKind::TooFewItems, path);
        }
    }

    match &schema.items {
        Some(Items::Single(item_schema)) => {
            for (i, element) in elements.iter().enumerate() {
                check(item_schema, element, &index_path(path, i))?;
            }
        }
        // Positions past the end of a shorter value are not checked, and
        // elements past the end of the schema list are unconstrained.
        Some(Items::Positional(item_schemas)) => {
            for (i, (item_schema, element)) in item_schemas.iter().zip(elements).enumerate() {
                check(item_schema, element, &index_path(path, i))?;
            }
        }
        None => {}
    }

    if let Some(needle) = &schema.contains {
        if !contains_equal(elements, needle) {
            return fail(ValidationErrorKind::MissingContainedValue, path);
        }
    }

    if schema.unique_items && !all_unique(elements) {
        return fail(ValidationErrorKind::DuplicateItems, path);
    }

    // The whole array must equal one candidate; elements are not matched individually.
    check_enum(schema, value, ValidationErrorKind::ArrayNotInEnum, path)
}

fn check_object(schema: &SchemaNode, value: &Value, path: &str) -> Check {
    let Some(object) = value.as_object() else {
        return fail(ValidationErrorKind::TypeMismatch, path);
    };
    let count = object.len() as u64;

    if let Some(max_properties) = schema.max_properties {
        if count > max_properties {
            return fail(ValidationErrorKind::TooManyProperties, path);
        }
    }

    if let Some(min_properties) = schema.min_properties {
        if count < min_properties {
            return fail(ValidationErrorKind::TooFewProperties, path);
        }
    }

    if let Some(missing) = schema.required.iter().find(|key| !object.contains_key(*key)) {
        return fail(ValidationErrorKind::MissingRequiredProperty, &key_path(path, missing));
    }

    for (key, property_schema) in schema.properties.iter() {
        if let Some(property) = object.get(key) {
            check(property_schema, property, &key_path(path, key))?;
        }
    }

    if !schema.additional_properties {
        if let Some(extra) = first_additional_key(object, schema) {
            return fail(ValidationErrorKind::AdditionalProperty, &key_path(path, extra));
        }
    }

    Ok(())
}

fn check_enum(schema: &SchemaNode, value: &Value, kind: ValidationErrorKind, path: &str) -> Check {
    match &schema.enum_values {
        Some(candidates) if !contains_equal(candidates, value) => fail(kind, path),
        _ => Ok(()),
    }
}

fn first_additional_key<'a>(object: &'a Map<String, Value>, schema: &SchemaNode) -> Option<&'a str> {
    object
        .keys()
        .find(|key| !schema.properties.contains_key(key.as_str()))
        .map(String::as_str)
}

fn fail(kind: ValidationErrorKind, path: &str) -> Check {
    Err(ValidationError::new(kind, path))
}

/// Appends an array index to a JSON pointer.
fn index_path(prefix: &str, index: usize) -> String {
    format!("{}/{}", prefix, index)
}

/// Appends an object key to a JSON pointer, escaping `~` and `/`.
fn key_path(prefix: &str, key: &str) -> String {
    format!("{}/{}", prefix, key.replace('~', "~0").replace('/', "~1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{Format, Pattern};
    use serde_json::json;

    fn first_kind(schema: &SchemaNode, value: &Value) -> Option<ValidationErrorKind> {
        validate(schema, value).first_error().map(ValidationError::kind)
    }

    #[test]
    fn test_nullable_skips_all_checks() {
        let schema = SchemaNode::string().with_nullable(true).with_min_length(3);
        assert!(validate(&schema, &Value::Null).is_valid());
    }

    #[test]
    fn test_null_rejected_by_default() {
        let report = validate(&SchemaNode::number(), &Value::Null);
        assert!(!report.is_valid());
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].to_string(), "Value is null, but nullable false");
    }

    #[test]
    fn test_null_checked_before_unknown_type() {
        let schema = SchemaNode::default().with_nullable(true);
        assert!(validate(&schema, &Value::Null).is_valid());
    }

    #[test]
    fn test_node_without_type_is_unknown() {
        assert_eq!(
            first_kind(&SchemaNode::default(), &json!(1)),
            Some(ValidationErrorKind::UnknownType)
        );
    }

    #[test]
    fn test_any_of_takes_precedence_over_type() {
        let schema = SchemaNode {
            schema_type: Some(SchemaType::Boolean),
            any_of: vec![SchemaNode::number()],
            ..SchemaNode::default()
        };
        assert!(validate(&schema, &json!(3)).is_valid());
    }

    #[test]
    fn test_one_of_evaluates_every_member() {
        let schema = SchemaNode::one_of(vec![
            SchemaNode::number(),
            SchemaNode::number().with_maximum(10.0),
            SchemaNode::string(),
        ]);
        assert_eq!(
            first_kind(&schema, &json!(5)),
            Some(ValidationErrorKind::MultipleSchemasMatched)
        );
        assert!(validate(&schema, &json!(50)).is_valid());
    }

    #[test]
    fn test_combinator_member_errors_are_discarded() {
        let schema = SchemaNode::any_of(vec![SchemaNode::number(), SchemaNode::boolean()]);
        let report = validate(&schema, &json!("x"));
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.errors()[0].kind(), ValidationErrorKind::NoSchemaMatched);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let schema = SchemaNode::number().with_minimum(1.0).with_maximum(2.0);
        assert!(validate(&schema, &json!(1)).is_valid());
        assert!(validate(&schema, &json!(2.0)).is_valid());
        assert_eq!(first_kind(&schema, &json!(0.5)), Some(ValidationErrorKind::BelowMinimum));
        assert_eq!(first_kind(&schema, &json!(3)), Some(ValidationErrorKind::AboveMaximum));
    }

    #[test]
    fn test_minimum_checked_before_enum() {
        let schema = SchemaNode::number().with_minimum(5.0).with_enum(vec![json!(7)]);
        assert_eq!(first_kind(&schema, &json!(1)), Some(ValidationErrorKind::BelowMinimum));
    }

    #[test]
    fn test_string_rule_order() {
        // maxLength is checked before minLength
        let schema = SchemaNode::string().with_max_length(2).with_min_length(5);
        assert_eq!(first_kind(&schema, &json!("abc")), Some(ValidationErrorKind::StringTooLong));

        // pattern before format
        let schema = SchemaNode::string()
            .with_pattern(Pattern::new("^x").unwrap())
            .with_format(Format::Date);
        assert_eq!(first_kind(&schema, &json!("abc")), Some(ValidationErrorKind::PatternMismatch));
        assert_eq!(first_kind(&schema, &json!("xabc")), Some(ValidationErrorKind::InvalidFormat));
    }

    #[test]
    fn test_string_length_counts_characters() {
        let schema = SchemaNode::string().with_max_length(3);
        assert!(!validate(&schema, &json!("ёжик")).is_valid());
        assert!(validate(&schema, &json!("ёж")).is_valid());
    }

    #[test]
    fn test_unknown_format_fails() {
        let schema = SchemaNode::string().with_format(Format::Other("uuid".into()));
        assert_eq!(first_kind(&schema, &json!("x")), Some(ValidationErrorKind::InvalidFormat));
    }

    #[test]
    fn test_keywords_of_other_types_are_ignored() {
        let schema = SchemaNode::number()
            .with_pattern(Pattern::new("^never$").unwrap())
            .with_min_items(10);
        assert!(validate(&schema, &json!(4)).is_valid());
    }

    #[test]
    fn test_item_error_carries_path() {
        let schema = SchemaNode::object().with_property(
            "t",
            SchemaNode::array().with_items(SchemaNode::number()),
        );
        let report = validate(&schema, &json!({"a": "qwe", "t": [1, []]}));
        let error = report.first_error().unwrap();
        assert_eq!(error.kind(), ValidationErrorKind::TypeMismatch);
        assert_eq!(error.path(), "/t/1");
    }

    #[test]
    fn test_null_array_element_needs_nullable_items() {
        let schema = SchemaNode::array().with_items(SchemaNode::number());
        assert_eq!(
            first_kind(&schema, &json!([1, null])),
            Some(ValidationErrorKind::NullNotAllowed)
        );

        let schema = SchemaNode::array().with_items(SchemaNode::number().with_nullable(true));
        assert!(validate(&schema, &json!([1, null])).is_valid());
    }

    #[test]
    fn test_positional_items_shorter_value_is_valid() {
        let schema = SchemaNode::array()
            .with_positional_items(vec![SchemaNode::number(), SchemaNode::string()]);
        assert!(validate(&schema, &json!([1])).is_valid());
        assert!(validate(&schema, &json!([])).is_valid());
    }

    #[test]
    fn test_positional_items_extra_elements_unconstrained() {
        let schema = SchemaNode::array()
            .with_positional_items(vec![SchemaNode::number(), SchemaNode::string()]);
        assert!(validate(&schema, &json!([1, "a", true, {}])).is_valid());
        assert_eq!(
            first_kind(&schema, &json!(["a", "b"])),
            Some(ValidationErrorKind::TypeMismatch)
        );
    }

    #[test]
    fn test_items_checked_before_contains() {
        let schema = SchemaNode::array()
            .with_items(SchemaNode::string())
            .with_contains(json!("z"));
        assert_eq!(first_kind(&schema, &json!([1])), Some(ValidationErrorKind::TypeMismatch));
        assert_eq!(
            first_kind(&schema, &json!(["a"])),
            Some(ValidationErrorKind::MissingContainedValue)
        );
    }

    #[test]
    fn test_contains_null() {
        let schema = SchemaNode::array().with_contains(Value::Null);
        assert!(validate(&schema, &json!([1, null])).is_valid());
        assert!(!validate(&schema, &json!([1])).is_valid());
    }

    #[test]
    fn test_array_enum_matches_whole_array() {
        let schema = SchemaNode::array().with_enum(vec![json!([1, 2])]);
        assert!(validate(&schema, &json!([1, 2])).is_valid());
        assert_eq!(
            first_kind(&schema, &json!([1])),
            Some(ValidationErrorKind::ArrayNotInEnum)
        );
    }

    #[test]
    fn test_required_reports_missing_key_path() {
        let schema = SchemaNode::object().with_required(["e", "a"]);
        let report = validate(&schema, &json!({"e": 1}));
        let error = report.first_error().unwrap();
        assert_eq!(error.kind(), ValidationErrorKind::MissingRequiredProperty);
        assert_eq!(error.path(), "/a");
    }

    #[test]
    fn test_additional_properties_checked_after_properties() {
        let schema = SchemaNode::object()
            .with_additional_properties(false)
            .with_property("e", SchemaNode::number());
        assert_eq!(
            first_kind(&schema, &json!({"e": "x", "a": 1})),
            Some(ValidationErrorKind::TypeMismatch)
        );
        assert_eq!(
            first_kind(&schema, &json!({"e": 1, "a": 1})),
            Some(ValidationErrorKind::AdditionalProperty)
        );
    }

    #[test]
    fn test_properties_checked_in_declaration_order() {
        let schema = crate::schema::SchemaLoader::parse(&json!({
            "type": "object",
            "properties": {
                "b": {"type": "number"},
                "a": {"type": "string", "minLength": 5}
            }
        }))
        .unwrap();

        let report = validate(&schema, &json!({"b": "x", "a": "y"}));
        let error = report.first_error().unwrap();
        assert_eq!(error.to_string(), "Type is incorrect");
        assert_eq!(error.path(), "/b");
    }

    #[test]
    fn test_additional_key_reported_in_value_order() {
        let schema = SchemaNode::object()
            .with_additional_properties(false)
            .with_property("k", SchemaNode::number());
        let report = validate(&schema, &json!({"k": 1, "z": 1, "a": 1}));
        assert_eq!(report.first_error().unwrap().path(), "/z");
    }

    #[test]
    fn test_object_rejects_array() {
        assert_eq!(
            first_kind(&SchemaNode::object(), &json!([])),
            Some(ValidationErrorKind::TypeMismatch)
        );
    }

    #[test]
    fn test_key_path_escaping() {
        assert_eq!(key_path("", "a/b"), "/a~1b");
        assert_eq!(key_path("/x", "m~n"), "/x/m~0n");
        assert_eq!(index_path("/x", 3), "/x/3");
    }

    #[test]
    fn test_validator_clears_between_calls() {
        let mut validator = Validator::new();
        assert!(!validator.is_valid(&SchemaNode::number(), &json!("1")));
        assert_eq!(validator.errors().len(), 1);

        assert!(validator.is_valid(&SchemaNode::number(), &json!(1)));
        assert!(validator.errors().is_empty());
    }
}
