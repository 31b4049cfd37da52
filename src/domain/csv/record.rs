// ============================================================
// RECORD TYPES
// ============================================================
// Parsed rows after header assembly

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::CsvValue;

/// A named field in a record
#[derive(Debug, Clone, PartialEq)]
pub struct CsvField {
    /// Field name (header)
    pub name: String,

    /// Field value
    pub value: CsvValue,
}

impl CsvField {
    /// Create a new CSV field
    pub fn new(name: impl Into<String>, value: impl Into<CsvValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One record of a parse result.
///
/// Named records keep fields in header order and may repeat a name when the
/// header row does.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Named(Vec<CsvField>),
    Positional(Vec<CsvValue>),
}

impl Record {
    /// Number of keys (named) or values (positional)
    pub fn key_count(&self) -> usize {
        match self {
            Record::Named(fields) => fields.len(),
            Record::Positional(values) => values.len(),
        }
    }

    /// First value stored under `name`
    pub fn get(&self, name: &str) -> Option<&CsvValue> {
        match self {
            Record::Named(fields) => fields.iter().find(|f| f.name == name).map(|f| &f.value),
            Record::Positional(_) => None,
        }
    }

    /// Value at a column position
    pub fn get_index(&self, index: usize) -> Option<&CsvValue> {
        match self {
            Record::Named(fields) => fields.get(index).map(|f| &f.value),
            Record::Positional(values) => values.get(index),
        }
    }

    /// Field names in record order; empty for positional records
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Record::Named(fields) => fields.iter().map(|f| f.name.as_str()).collect(),
            Record::Positional(_) => Vec::new(),
        }
    }

    /// Build a named record from a JSON object, keeping its key order
    pub fn from_json(value: &Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Record::Named(
                map.iter()
                    .map(|(name, value)| CsvField {
                        name: name.clone(),
                        value: CsvValue::from_json(value),
                    })
                    .collect(),
            )),
            other => Err(format!("expected an object, got {}", json_type_name(other))),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Record::Named(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for field in fields {
                    map.serialize_entry(&field.name, &field.value)?;
                }
                map.end()
            }
            Record::Positional(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

/// JSON type name used in error messages
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
