//! Structured records.
//!
//! A record holds one value per schema field, positionally. Values are
//! `serde_json::Value`s checked against the declared field type when the
//! record is built.

use crate::schema::{json_kind, FieldType, Schema};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// A single data instance conforming to a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<JsonValue>,
}

impl Record {
    /// Start building a record for the given schema.
    pub fn builder(schema: Arc<Schema>) -> RecordBuilder {
        RecordBuilder::new(schema)
    }

    /// Build a record from a JSON object whose keys are field names.
    ///
    /// Missing keys of nullable fields are null; a missing non-nullable
    /// field fails with [`RecordError::MissingField`].
    pub fn from_json(schema: Arc<Schema>, json: &JsonValue) -> Result<Self, RecordError> {
        let object = json.as_object().ok_or(RecordError::NotAnObject {
            kind: json_kind(json),
        })?;

        let mut builder = Self::builder(schema);
        for (name, value) in object {
            builder = builder.set(name, value.clone())?;
        }
        builder.build()
    }

    /// Render the record as a JSON object with keys in schema order.
    pub fn to_json(&self) -> JsonValue {
        let map = self
            .schema
            .fields()
            .iter()
            .zip(&self.values)
            .map(|(field, value)| (field.name.clone(), value.clone()))
            .collect();
        JsonValue::Object(map)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Value of a field; `None` if the schema has no such field.
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.schema.index_of(name).map(|idx| &self.values[idx])
    }

    /// Field names paired with their values, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(&self.values)
    }
}

/// Builder for [`Record`], checking values against the schema.
#[derive(Debug)]
pub struct RecordBuilder {
    schema: Arc<Schema>,
    values: Vec<Option<JsonValue>>,
}

impl RecordBuilder {
    fn new(schema: Arc<Schema>) -> Self {
        let values = vec![None; schema.len()];
        Self { schema, values }
    }

    /// Set a field value.
    pub fn set(mut self, name: &str, value: JsonValue) -> Result<Self, RecordError> {
        let idx = self
            .schema
            .index_of(name)
            .ok_or_else(|| RecordError::UnknownField(name.to_string()))?;

        let field_type = &self.schema.fields()[idx].field_type;
        if !field_type.accepts(&value) {
            return Err(RecordError::TypeMismatch {
                field: name.to_string(),
                expected: field_type.clone(),
                actual: json_kind(&value),
            });
        }

        self.values[idx] = Some(value);
        Ok(self)
    }

    /// Finish the record. Unset nullable fields become null.
    pub fn build(self) -> Result<Record, RecordError> {
        let values = self
            .schema
            .fields()
            .iter()
            .zip(self.values)
            .map(|(field, value)| match value {
                Some(v) => Ok(v),
                None if field.field_type.is_nullable() => Ok(JsonValue::Null),
                None => Err(RecordError::MissingField(field.name.clone())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Record {
            schema: self.schema,
            values,
        })
    }
}

/// Errors raised while building a record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Field '{0}' does not exist in the record schema")]
    UnknownField(String),

    #[error("Field '{field}' expects type {expected} but got a JSON {actual}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: &'static str,
    },

    #[error("Non-nullable field '{0}' has no value")]
    MissingField(String),

    #[error("Expected a JSON object for a record, got a JSON {kind}")]
    NotAnObject { kind: &'static str },
}
