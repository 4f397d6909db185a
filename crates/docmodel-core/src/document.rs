//! Ordered document representation.

use crate::error::{Error, Result};
use crate::oid::ObjectId;
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A stored document: an insertion-ordered map of field names to values.
///
/// Field order is preserved through round-trips, which is what keeps
/// relationship entries in their original order when a stored value is
/// loaded and written back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: IndexMap<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Insert a field, returning the previous value if present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Remove a field, returning its value if present.
    ///
    /// Order of the remaining fields is preserved.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    /// Check if a field exists.
    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve a dotted path through nested documents.
    ///
    /// `"a.b"` reads field `a`, then field `b` of the nested document.
    /// Returns `None` as soon as a segment is missing or the value at a
    /// non-final segment is not a document.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = self.get(path.split('.').next()?)?;
        for segment in path.split('.').skip(1) {
            current = current.as_document()?.get(segment)?;
        }
        Some(current)
    }

    /// Get a typed value by field name.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| Error::custom(format!("field '{}' not found", name)))?;
        T::from_value(value).map_err(|e| match e {
            Error::Document(mut de) => {
                de.field = Some(name.to_string());
                Error::Document(de)
            }
            e => e,
        })
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Document {
    fn from(pairs: [(&str, Value); N]) -> Self {
        let mut doc = Document::new();
        for (name, value) in pairs {
            doc.insert(name, value);
        }
        doc
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Trait for converting from a stored [`Value`] to a typed value.
pub trait FromValue: Sized {
    /// Convert from a Value, returning an error if the conversion fails.
    fn from_value(value: &Value) -> Result<Self>;
}

fn type_error(expected: &'static str, value: &Value) -> Error {
    Error::Document(crate::error::DocumentError {
        collection: "",
        field: None,
        expected,
        actual: value.type_name().to_string(),
    })
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| type_error("bool", value))
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_i64().ok_or_else(|| type_error("int", value))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_f64().ok_or_else(|| type_error("double", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| type_error("text", value))
    }
}

impl FromValue for ObjectId {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::ObjectId(id) => Ok(*id),
            Value::Text(s) => ObjectId::parse_str(s),
            other => Err(type_error("objectid", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
