//! The typed record container
//!
//! A [`Record`] is an ordered mapping from field name to [`FieldValue`]. It
//! replaces duck-typed access by string key: projection, default-value
//! merging and token-field extraction all go through typed accessors, and an
//! absent field is an explicit error where the caller requires one.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::error::{Error, Result};
use crate::core::field::FieldValue;

/// An ordered, flat collection of named field values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Typed access that fails loudly on an absent or null field
    pub fn require(&self, name: &str) -> Result<&FieldValue> {
        match self.fields.get(name) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(Error::unknown_field(name)),
        }
    }

    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The identity field, when present and well-formed
    pub fn id(&self) -> Option<Uuid> {
        self.fields.get("id").and_then(|v| v.as_uuid())
    }

    pub fn set_id(&mut self, id: Uuid) {
        // Identity sits first so serialized records lead with it
        self.fields.shift_remove("id");
        self.fields
            .shift_insert(0, "id".to_string(), FieldValue::Uuid(id));
    }

    /// Keep only the requested fields, in the requested order
    ///
    /// An empty selection means "all columns". Requested fields absent from
    /// the record are skipped rather than materialized as nulls.
    pub fn project(&self, select: &[String]) -> Record {
        if select.is_empty() {
            return self.clone();
        }
        let mut projected = Record::new();
        for field in select {
            if let Some(value) = self.fields.get(field) {
                projected.set(field, value.clone());
            }
        }
        projected
    }

    /// Overlay every field of `other` onto this record
    pub fn merge(&mut self, other: &Record) {
        for (name, value) in other.iter() {
            self.set(name, value.clone());
        }
    }

    /// Parse a JSON object into a record; non-objects are client errors
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::BadRequest("Request body must be a JSON object".into()))?;
        let mut record = Record::new();
        for (name, raw) in object {
            record.set(name, FieldValue::from_json(raw)?);
        }
        Ok(record)
    }

    /// Parse raw JSON bytes into a record; malformed JSON is a client error
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| Error::BadRequest(format!("Invalid JSON body: {e}")))?;
        Self::from_json(&value)
    }

    /// Serialize into a JSON object; infallible
    pub fn to_json(&self) -> Value {
        let mut map = serde_json::Map::with_capacity(self.fields.len());
        for (name, value) in self.iter() {
            map.insert(name.to_string(), value.to_json());
        }
        Value::Object(map)
    }
}
