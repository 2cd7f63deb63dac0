//! The gateway's JSON configuration document.
//!
//! Only the handful of paths the boot sequence touches are given meaning
//! here; everything else in the document is carried through untouched.

use super::io::{parse_document_text, resolve_config_snapshot_hash, write_config_file};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

/// Owned configuration document. The root is always a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a parsed value. A non-object root is replaced by an empty object.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(root) => Self { root },
            other => {
                warn!(
                    "Config root is {}, not an object; starting with empty config",
                    json_kind(&other)
                );
                Self::default()
            }
        }
    }

    /// Load the document at `path`.
    ///
    /// A missing or unparsable file yields an empty document. I/O errors
    /// other than "not found" are propagated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read '{}'", path.display()))
            }
        };

        match parse_document_text(&content) {
            Ok(value) => Ok(Self::from_value(value)),
            Err(e) => {
                warn!(
                    "Config at '{}' is unparsable ({e:#}); starting with empty config",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Atomically replace the file at `path` with this document.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_config_file(path, &self.to_value())
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Hex SHA-256 of the document.
    pub fn digest(&self) -> String {
        resolve_config_snapshot_hash(&self.to_value())
    }

    /// Value at a dotted path given as segments.
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.root.get(*first)?, |value, key| value.get(*key))
    }

    /// Object at `path`, creating it (and any parent) as needed. Non-object
    /// values found along the way are replaced by empty objects.
    pub fn object_mut(&mut self, path: &[&str]) -> &mut Map<String, Value> {
        let mut current = &mut self.root;
        for key in path {
            let slot = current
                .entry((*key).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = ensure_object(slot);
        }
        current
    }

    /// Set `path` to `value`, creating parents.
    pub fn set(&mut self, path: &[&str], value: Value) {
        if let Some((last, parents)) = path.split_last() {
            self.object_mut(parents).insert((*last).to_string(), value);
        }
    }

    /// Remove and return the value at `path`.
    pub fn remove(&mut self, path: &[&str]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut current = &mut self.root;
        for key in parents {
            current = current.get_mut(*key)?.as_object_mut()?;
        }
        current.remove(*last)
    }
}

fn ensure_object(slot: &mut Value) -> &mut Map<String, Value> {
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced with an object"),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
