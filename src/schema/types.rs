//! Schema node definitions
//!
//! A `SchemaNode` is an immutable, declarative rule. Nodes nest through
//! `anyOf`/`oneOf`, `items` and `properties`. Construction validates
//! nothing: a node with neither `type` nor a combinator is only reported
//! when a value is checked against it.
//!
//! Supported types:
//! - number: any JSON number (integers and floats alike)
//! - string: UTF-8 string
//! - boolean
//! - array: ordered sequence
//! - object: mapping from string keys to values

use std::fmt;
use std::ops::Index;

use regex::Regex;
use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Prefix of the deserialization error raised for a `pattern` that does not compile.
pub(crate) const INVALID_PATTERN_PREFIX: &str = "invalid pattern";

/// Value categories a schema can require via its `type` keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SchemaType {
    Number,
    String,
    Boolean,
    Array,
    Object,
    /// Any other name; kept so that validation can report it.
    Unknown(String),
}

impl SchemaType {
    /// Returns the keyword spelling of this type.
    pub fn type_name(&self) -> &str {
        match self {
            SchemaType::Number => "number",
            SchemaType::String => "string",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Unknown(name) => name,
        }
    }
}

impl From<String> for SchemaType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "number" => SchemaType::Number,
            "string" => SchemaType::String,
            "boolean" => SchemaType::Boolean,
            "array" => SchemaType::Array,
            "object" => SchemaType::Object,
            _ => SchemaType::Unknown(name),
        }
    }
}

impl From<SchemaType> for String {
    fn from(schema_type: SchemaType) -> Self {
        schema_type.type_name().to_string()
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Named string formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Format {
    /// `local@domain` shape
    Email,
    /// `YYYY-MM-DD`
    Date,
    /// Unrecognised name; never matches.
    Other(String),
}

impl Format {
    pub fn name(&self) -> &str {
        match self {
            Format::Email => "email",
            Format::Date => "date",
            Format::Other(name) => name,
        }
    }
}

impl From<String> for Format {
    fn from(name: String) -> Self {
        match name.as_str() {
            "email" => Format::Email,
            "date" => Format::Date,
            _ => Format::Other(name),
        }
    }
}

impl From<Format> for String {
    fn from(format: Format) -> Self {
        format.name().to_string()
    }
}

/// A compiled regular expression for the `pattern` keyword.
///
/// Matching is unanchored: `\d{1,2}` accepts any string containing one or
/// two consecutive digits. Anchor explicitly with `^...$` for a full match.
///
/// Patterns use `regex` syntax, where the Perl classes `\d`, `\w` and `\b`
/// are Unicode-aware: `\d` also matches digits such as `١٢`. For ASCII-only
/// classes write `[0-9]` or disable Unicode locally with `(?-u:\d)`.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` into a pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(source)?,
        })
    }

    /// Returns the source text the pattern was compiled from.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns true if the pattern matches anywhere in `s`.
    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(|e| {
            serde::de::Error::custom(format!("{} '{}': {}", INVALID_PATTERN_PREFIX, source, e))
        })
    }
}

/// The `items` keyword: one schema for every element, or one per position.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Items {
    Positional(Vec<SchemaNode>),
    Single(Box<SchemaNode>),
}

// Dispatch on the token so errors inside a nested schema reach the caller as-is.
impl<'de> Deserialize<'de> for Items {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ItemsVisitor;

        impl<'de> Visitor<'de> for ItemsVisitor {
            type Value = Items;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a schema object or an array of schema objects")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Items, A::Error> {
                Vec::deserialize(SeqAccessDeserializer::new(seq)).map(Items::Positional)
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Items, A::Error> {
                SchemaNode::deserialize(MapAccessDeserializer::new(map))
                    .map(|node| Items::Single(Box::new(node)))
            }
        }

        deserializer.deserialize_any(ItemsVisitor)
    }
}

/// The `properties` keyword: property schemas in declaration order.
///
/// Order matters because properties are checked in the order the schema
/// lists them and the first failure is the one reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, SchemaNode)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property, replacing an earlier declaration in place.
    pub fn insert(&mut self, key: impl Into<String>, schema: SchemaNode) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = schema,
            None => self.entries.push((key, schema)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, schema)| schema)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.entries.iter().map(|(k, schema)| (k.as_str(), schema))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<&str> for Properties {
    type Output = SchemaNode;

    fn index(&self, key: &str) -> &SchemaNode {
        match self.get(key) {
            Some(schema) => schema,
            None => panic!("no property schema for '{}'", key),
        }
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = Properties;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of property schemas")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Properties, A::Error> {
                let mut properties = Properties::new();
                while let Some((key, schema)) = map.next_entry::<String, SchemaNode>()? {
                    properties.insert(key, schema);
                }
                Ok(properties)
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

/// One validation rule, possibly containing nested rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// Accept null without any further checks
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,

    /// Valid if at least one member is valid; empty means absent
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaNode>,

    /// Valid if exactly one member is valid; empty means absent
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,

    // number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    // string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,

    // array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    /// Literal that must appear in the array. `Some(Value::Null)` requires a null element.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub contains: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique_items: bool,

    // object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub additional_properties: bool,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Maps a present key to `Some`, even when its value is null.
fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Default for SchemaNode {
    fn default() -> Self {
        Self {
            nullable: false,
            schema_type: None,
            any_of: Vec::new(),
            one_of: Vec::new(),
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            pattern: None,
            format: None,
            min_items: None,
            max_items: None,
            items: None,
            contains: None,
            unique_items: false,
            min_properties: None,
            max_properties: None,
            required: Vec::new(),
            properties: Properties::new(),
            additional_properties: true,
            enum_values: None,
        }
    }
}

impl SchemaNode {
    /// Create a node requiring the given type
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    pub fn number() -> Self {
        Self::of_type(SchemaType::Number)
    }

    pub fn string() -> Self {
        Self::of_type(SchemaType::String)
    }

    pub fn boolean() -> Self {
        Self::of_type(SchemaType::Boolean)
    }

    pub fn array() -> Self {
        Self::of_type(SchemaType::Array)
    }

    pub fn object() -> Self {
        Self::of_type(SchemaType::Object)
    }

    /// Create an `anyOf` combinator node
    pub fn any_of(members: Vec<SchemaNode>) -> Self {
        Self {
            any_of: members,
            ..Self::default()
        }
    }

    /// Create a `oneOf` combinator node
    pub fn one_of(members: Vec<SchemaNode>) -> Self {
        Self {
            one_of: members,
            ..Self::default()
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    pub fn with_min_length(mut self, min_length: u64) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn with_max_length(mut self, max_length: u64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_min_items(mut self, min_items: u64) -> Self {
        self.min_items = Some(min_items);
        self
    }

    pub fn with_max_items(mut self, max_items: u64) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Apply `items` to every element
    pub fn with_items(mut self, items: SchemaNode) -> Self {
        self.items = Some(Items::Single(Box::new(items)));
        self
    }

    /// Apply `items[i]` to element `i`
    pub fn with_positional_items(mut self, items: Vec<SchemaNode>) -> Self {
        self.items = Some(Items::Positional(items));
        self
    }

    pub fn with_contains(mut self, contains: Value) -> Self {
        self.contains = Some(contains);
        self
    }

    pub fn with_unique_items(mut self, unique_items: bool) -> Self {
        self.unique_items = unique_items;
        self
    }

    pub fn with_min_properties(mut self, min_properties: u64) -> Self {
        self.min_properties = Some(min_properties);
        self
    }

    pub fn with_max_properties(mut self, max_properties: u64) -> Self {
        self.max_properties = Some(max_properties);
        self
    }

    pub fn with_required<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, schema: SchemaNode) -> Self {
        self.properties.insert(key, schema);
        self
    }

    pub fn with_additional_properties(mut self, allowed: bool) -> Self {
        self.additional_properties = allowed;
        self
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }
}
