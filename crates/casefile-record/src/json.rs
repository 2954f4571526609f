//! JSON conversion for record trees
//!
//! Output follows shape order with every scalar as a string. Input is lenient
//! about missing branches so a partially populated server record still loads.

use crate::record::{Collection, FieldValue, SubRecord};
use crate::shape::{FieldKind, RecordShape};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::sync::Arc;

impl SubRecord {
    /// Wire representation: object in shape order, scalars as strings
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map = Map::with_capacity(self.shape().fields().len());
        for (name, value) in self.fields() {
            let json = match value {
                FieldValue::Scalar(text) => Value::String(text.clone()),
                FieldValue::Collection(collection) => collection.to_json(),
            };
            map.insert(name.to_string(), json);
        }
        Value::Object(map)
    }

    /// Build a record of `shape` from a server representation
    ///
    /// - missing, `null` or empty collections become the default collection
    /// - numbers and booleans are kept in their textual form
    /// - missing or `null` scalars become empty strings
    /// - fields the shape does not declare are ignored
    ///
    /// # Errors
    /// Returns [`LoadError`] when the value's structure cannot fit the shape.
    pub fn from_json(shape: &Arc<RecordShape>, value: &Value) -> Result<Self, LoadError> {
        load_record(shape, value, "")
    }
}

impl Collection {
    /// Wire representation: array of element objects
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.iter().map(SubRecord::to_json).collect())
    }
}

impl Serialize for SubRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.shape().fields().len()))?;
        for (name, value) in self.fields() {
            match value {
                FieldValue::Scalar(text) => map.serialize_entry(name, text)?,
                FieldValue::Collection(collection) => map.serialize_entry(name, collection)?,
            }
        }
        map.end()
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

fn load_record(shape: &Arc<RecordShape>, value: &Value, at: &str) -> Result<SubRecord, LoadError> {
    let Value::Object(object) = value else {
        return Err(LoadError::NotAnObject {
            path: display_at(at, shape.name()),
        });
    };

    let values = shape
        .fields()
        .iter()
        .map(|spec| {
            let raw = object.get(spec.name()).unwrap_or(&Value::Null);
            let here = join(at, spec.name());
            match spec.kind() {
                FieldKind::Collection(nested) => {
                    load_collection(nested, raw, &here).map(FieldValue::Collection)
                }
                _ => load_scalar(raw, &here).map(FieldValue::Scalar),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SubRecord::from_parts(shape, values))
}

fn load_collection(
    shape: &Arc<RecordShape>,
    value: &Value,
    at: &str,
) -> Result<Collection, LoadError> {
    let items = match value {
        Value::Null => {
            tracing::debug!(path = at, "server record omits collection, using default");
            return Ok(Collection::with_default(shape));
        }
        Value::Array(items) => items,
        _ => {
            return Err(LoadError::NotAnArray {
                path: at.to_string(),
            })
        }
    };

    let records = items
        .iter()
        .enumerate()
        .map(|(index, item)| load_record(shape, item, &format!("{at}[{index}]")))
        .collect::<Result<Vec<_>, _>>()?;

    // Shapes come from the same Arc, so this cannot mismatch.
    Collection::from_records(shape, records).map_err(|e| LoadError::Structure(e.to_string()))
}

fn load_scalar(value: &Value, at: &str) -> Result<String, LoadError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) | Value::Object(_) => Err(LoadError::UnsupportedScalar {
            path: at.to_string(),
        }),
    }
}

fn join(at: &str, name: &str) -> String {
    if at.is_empty() {
        name.to_string()
    } else {
        format!("{at}.{name}")
    }
}

fn display_at(at: &str, shape: &str) -> String {
    if at.is_empty() {
        format!("<{shape}>")
    } else {
        at.to_string()
    }
}

/// Errors loading a server representation into a record tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Record position holds something other than an object
    #[error("expected object at '{path}'")]
    NotAnObject { path: String },

    /// Collection position holds something other than an array
    #[error("expected array at '{path}'")]
    NotAnArray { path: String },

    /// Scalar position holds an array or object
    #[error("expected scalar at '{path}'")]
    UnsupportedScalar { path: String },

    /// Structural invariant violated while assembling the tree
    #[error("structure error: {0}")]
    Structure(String),
}
