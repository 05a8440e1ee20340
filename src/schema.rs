//! Record schemas.
//!
//! A schema is an ordered list of uniquely named, typed fields. Types can be
//! wrapped once as nullable. Schemas deserialize from YAML or JSON:
//!
//! ```yaml
//! fields:
//!   - name: name
//!     type: string
//!   - name: nickname
//!     type: { nullable: string }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fmt;

/// Declared type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FieldTypeRepr", into = "FieldTypeRepr")]
pub enum FieldType {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    String,
    /// Raw bytes, carried in JSON as an array of integers in `0..=255`
    Bytes,
    /// The wrapped type, or null
    Nullable(Box<FieldType>),
}

impl FieldType {
    /// Wrap a type as nullable.
    pub fn nullable(inner: FieldType) -> Self {
        FieldType::Nullable(Box::new(inner))
    }

    /// Whether null is an allowed value.
    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldType::Nullable(_))
    }

    /// The type with one level of nullability removed.
    pub fn non_nullable(&self) -> &FieldType {
        match self {
            FieldType::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Check whether a value conforms to this type.
    pub fn accepts(&self, value: &JsonValue) -> bool {
        match self {
            FieldType::Nullable(inner) => value.is_null() || inner.accepts(value),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Int => value
                .as_i64()
                .is_some_and(|n| i32::try_from(n).is_ok()),
            FieldType::Long => value.is_i64(),
            FieldType::Float => value
                .as_f64()
                .is_some_and(|f| f.abs() <= f32::MAX as f64),
            FieldType::Double => value.is_number(),
            FieldType::String => value.is_string(),
            FieldType::Bytes => value.as_array().is_some_and(|items| {
                items
                    .iter()
                    .all(|b| b.as_u64().is_some_and(|n| n <= u8::MAX as u64))
            }),
        }
    }

    fn simple_name(&self) -> Option<&'static str> {
        let name = match self {
            FieldType::Boolean => "boolean",
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::Float => "float",
            FieldType::Double => "double",
            FieldType::String => "string",
            FieldType::Bytes => "bytes",
            FieldType::Nullable(_) => return None,
        };
        Some(name)
    }

    fn from_simple_name(name: &str) -> Option<Self> {
        let ty = match name {
            "boolean" => FieldType::Boolean,
            "int" => FieldType::Int,
            "long" => FieldType::Long,
            "float" => FieldType::Float,
            "double" => FieldType::Double,
            "string" => FieldType::String,
            "bytes" => FieldType::Bytes,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Nullable(inner) => write!(f, "nullable<{}>", inner),
            other => f.write_str(other.simple_name().unwrap_or_default()),
        }
    }
}

/// Wire form of a field type: a bare name or `{ nullable: <type> }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum FieldTypeRepr {
    Simple(String),
    Nullable { nullable: Box<FieldTypeRepr> },
}

impl TryFrom<FieldTypeRepr> for FieldType {
    type Error = SchemaError;

    fn try_from(repr: FieldTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            FieldTypeRepr::Simple(name) => {
                FieldType::from_simple_name(&name).ok_or(SchemaError::UnknownType(name))
            }
            FieldTypeRepr::Nullable { nullable } => match FieldType::try_from(*nullable)? {
                FieldType::Nullable(_) => Err(SchemaError::NestedNullable),
                inner => Ok(FieldType::nullable(inner)),
            },
        }
    }
}

impl From<FieldType> for FieldTypeRepr {
    fn from(ty: FieldType) -> Self {
        match ty {
            FieldType::Nullable(inner) => FieldTypeRepr::Nullable {
                nullable: Box::new(FieldTypeRepr::from(*inner)),
            },
            other => FieldTypeRepr::Simple(other.to_string()),
        }
    }
}

/// A named, typed slot in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, unique within its schema
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered set of field definitions describing a record's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct Schema {
    fields: Vec<Field>,
}

#[derive(Deserialize)]
struct RawSchema {
    fields: Vec<Field>,
}

impl TryFrom<RawSchema> for Schema {
    type Error = SchemaError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        Schema::new(raw.fields)
    }
}

impl Schema {
    /// Build a schema, rejecting duplicate field names.
    pub fn new(fields: Vec<Field>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    /// Infer a schema from a single JSON object.
    ///
    /// Used when the input schema is only known at runtime. Integers map to
    /// `long`, other numbers to `double`, and null to `nullable<string>`.
    pub fn infer(object: &serde_json::Map<String, JsonValue>) -> Result<Self, SchemaError> {
        let fields = object
            .iter()
            .map(|(name, value)| {
                let field_type = match value {
                    JsonValue::Null => FieldType::nullable(FieldType::String),
                    JsonValue::Bool(_) => FieldType::Boolean,
                    JsonValue::Number(n) if n.is_i64() => FieldType::Long,
                    JsonValue::Number(_) => FieldType::Double,
                    JsonValue::String(_) => FieldType::String,
                    JsonValue::Array(_) | JsonValue::Object(_) => {
                        return Err(SchemaError::UnsupportedValue {
                            field: name.clone(),
                            kind: json_kind(value),
                        })
                    }
                };
                Ok(Field::new(name.clone(), field_type))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(fields)
    }

    /// Fields in declared order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", field.name, field.field_type)?;
        }
        f.write_str("}")
    }
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Errors raised while building a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Duplicate field '{0}' in schema")]
    DuplicateField(String),

    #[error("Unknown field type '{0}'")]
    UnknownType(String),

    #[error("Nullable types cannot be nested")]
    NestedNullable,

    #[error("Cannot infer a type for field '{field}' holding a JSON {kind}")]
    UnsupportedValue { field: String, kind: &'static str },
}
