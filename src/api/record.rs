//! Map-backed JSON documents.
//!
//! A [`Record`] wraps an arbitrary JSON object as returned by the JIRA REST API.
//! Values are addressed either by exact key or by a dotted path such as
//! `"fields.status.name"`. Key order is insertion order, so a record decoded
//! from the wire encodes back to equivalent JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{JiraError, Result};

/// A JSON object with dotted-path accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    map: Map<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a decoded JSON value.
    ///
    /// Fails with [`JiraError::Decode`] if the value is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { map }),
            other => Err(JiraError::decode(
                format!("expected a JSON object, found {}", kind_of(&other)),
                other.to_string(),
            )),
        }
    }

    /// Get a value by dotted path.
    ///
    /// Returns `None` if any segment along the path is missing or is not an object.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.map.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Strict variant of [`Record::get`]: a missing path is an error.
    pub fn fetch(&self, path: &str) -> Result<&Value> {
        self.get(path)
            .ok_or_else(|| JiraError::KeyNotFound(path.to_string()))
    }

    /// Get a value by its exact key, without splitting on dots.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// Get a string value by dotted path.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Get an unsigned integer by dotted path.
    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(Value::as_u64)
    }

    /// Get a boolean by dotted path.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Get a nested object as a record of its own.
    pub fn get_record(&self, path: &str) -> Option<Record> {
        self.get(path)
            .and_then(Value::as_object)
            .map(|map| Record { map: map.clone() })
    }

    /// Get an array of objects as records, skipping elements that are not objects.
    ///
    /// Returns an empty vector if the path is missing or is not an array.
    pub fn get_records(&self, path: &str) -> Vec<Record> {
        self.get(path)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|map| Record { map: map.clone() })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Set a value by dotted path.
    ///
    /// Intermediate objects are created as needed; a non-object value standing
    /// in the way of the path is replaced by an object. New keys are appended
    /// after existing ones.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split('.').collect();
        set_path(&mut self.map, &segments, value.into());
    }

    /// Set a value under an exact key, without splitting on dots.
    pub fn set_key(&mut self, key: &str, value: impl Into<Value>) {
        self.map.insert(key.to_string(), value.into());
    }

    /// Remove a top-level key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.map.shift_remove(key)
    }

    /// Check whether a top-level key is present (exact match).
    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Top-level keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Top-level entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check whether the record has no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Shallow merge: every key of `other` overwrites the same key here.
    ///
    /// Nested objects are replaced wholesale, not merged.
    pub fn merge(&mut self, other: &Record) {
        for (key, value) in &other.map {
            self.map.insert(key.clone(), value.clone());
        }
    }

    /// Encode the record as compact JSON text.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.map.clone()).to_string()
    }

    /// Borrow the underlying JSON map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.map
    }

    /// Convert into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.map)
    }
}

impl FromStr for Record {
    type Err = JiraError;

    fn from_str(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| JiraError::decode(e.to_string(), text))?;
        match value {
            Value::Object(map) => Ok(Self { map }),
            other => Err(JiraError::decode(
                format!("expected a JSON object, found {}", kind_of(&other)),
                text,
            )),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self { map }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_string())
    }
}

fn set_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_string(), value);
        }
        [head, rest @ ..] => {
            let entry = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = entry {
                set_path(child, rest, value);
            } else {
                let mut child = Map::new();
                set_path(&mut child, rest, value);
                *entry = Value::Object(child);
            }
        }
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
