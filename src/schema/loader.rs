//! Schema loader and named registry
//!
//! - Schema documents are JSON files, one schema per file
//! - `load_dir` registers every `*.json` file under its file stem
//! - Registered schemas are immutable; re-registering a name is refused

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::types::{SchemaNode, INVALID_PATTERN_PREFIX};

/// Registry of named schemas, kept in name order.
#[derive(Debug, Default)]
pub struct SchemaLoader {
    schemas: BTreeMap<String, SchemaNode>,
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema tree from an already parsed JSON document.
    pub fn parse(document: &Value) -> SchemaResult<SchemaNode> {
        deserialize_document(document.clone(), None)
    }

    /// Builds a schema tree from JSON text.
    pub fn parse_str(text: &str) -> SchemaResult<SchemaNode> {
        let document: Value = serde_json::from_str(text)
            .map_err(|e| SchemaError::malformed(None, format!("Invalid JSON: {}", e)))?;
        deserialize_document(document, None)
    }

    /// Reads and parses one schema file.
    pub fn load_file(path: &Path) -> SchemaResult<SchemaNode> {
        let origin = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| SchemaError::io(&origin, &e))?;
        let document: Value = serde_json::from_str(&content)
            .map_err(|e| SchemaError::malformed(Some(&origin), format!("Invalid JSON: {}", e)))?;
        deserialize_document(document, Some(&origin))
    }

    /// Registers every `*.json` file in `dir`, named by file stem.
    ///
    /// A missing directory leaves the registry unchanged. Returns the
    /// number of schemas registered.
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let origin = dir.display().to_string();
        let entries = fs::read_dir(dir).map_err(|e| SchemaError::io(&origin, &e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| SchemaError::io(&origin, &e))?.path();
            if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        // read_dir order is platform dependent
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let name = name.to_string();
            let schema = Self::load_file(&path)?;
            self.register(name, schema)?;
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Registers a schema under `name`.
    pub fn register(&mut self, name: impl Into<String>, schema: SchemaNode) -> SchemaResult<()> {
        let name = name.into();
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::duplicate(&name));
        }
        self.schemas.insert(name, schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    /// Like `get`, but a missing name is an error.
    pub fn require(&self, name: &str) -> SchemaResult<&SchemaNode> {
        self.get(name).ok_or_else(|| SchemaError::unknown(name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn deserialize_document(document: Value, origin: Option<&str>) -> SchemaResult<SchemaNode> {
    if !document.is_object() {
        return Err(SchemaError::malformed(origin, "Schema document must be a JSON object"));
    }

    serde_json::from_value(document).map_err(|e| {
        let reason = e.to_string();
        if reason.starts_with(INVALID_PATTERN_PREFIX) {
            SchemaError::invalid_pattern(origin, reason)
        } else {
            SchemaError::malformed(origin, reason)
        }
    })
}
