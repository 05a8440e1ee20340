//! Record transformers.

mod case;

pub use case::CaseTransformer;

use crate::record::{Record, RecordError};
use crate::schema::{FieldType, Schema};

/// A pipeline step that maps one record to exactly one record.
pub trait Transformer: Send + Sync {
    /// Transform a record. The input is left untouched.
    fn transform(&self, record: &Record) -> Result<Record, TransformError>;

    /// Get the transformer name for logging.
    fn name(&self) -> &'static str;
}

/// Errors raised while transforming a single record.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Field '{field}' is null and cannot be case-converted")]
    NullValue { field: String },

    #[error("Field '{field}' holds a JSON {actual}, expected a string")]
    NotAString { field: String, actual: &'static str },

    #[error("Failed to build output record: {0}")]
    Record(#[from] RecordError),
}

/// Errors raised when configuration does not fit a known input schema.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Field '{field}' does not exist in input schema {schema}.")]
    FieldNotFound { field: String, schema: Schema },

    #[error("Field '{field}' is of illegal type {actual}. Must be of type {expected}.")]
    IllegalType {
        field: String,
        actual: FieldType,
        expected: FieldType,
    },
}

impl ConfigurationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ConfigurationError::FieldNotFound { field, .. }
            | ConfigurationError::IllegalType { field, .. } => field,
        }
    }
}
