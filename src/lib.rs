//! StringCase transform stage.
//!
//! A pipeline step that upper-cases or lower-cases configured string fields
//! of structured records and passes every other field through unchanged.
//! The output schema is always the input schema.
//!
//! ## Configuration Example
//!
//! ```yaml
//! upperFields: "name, code"
//! lowerFields: city
//! ```
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use stringcase_transform::{Record, Schema, StringCaseStage, Transformer};
//! use stringcase_transform::schema::{Field, FieldType};
//!
//! let stage = StringCaseStage::from_yaml("upperFields: name\nlowerFields: city").unwrap();
//!
//! let schema = Schema::new(vec![
//!     Field::new("name", FieldType::String),
//!     Field::new("city", FieldType::String),
//!     Field::new("age", FieldType::Int),
//! ])
//! .unwrap();
//! stage.configure(Some(&schema)).unwrap();
//!
//! let transformer = stage.initialize();
//! let record = Record::from_json(
//!     Arc::new(schema),
//!     &json!({"name": "Ana", "city": "LONDON", "age": 30}),
//! )
//! .unwrap();
//!
//! let output = transformer.transform(&record).unwrap();
//! assert_eq!(output.to_json(), json!({"name": "ANA", "city": "london", "age": 30}));
//! ```

pub mod config;
pub mod record;
pub mod schema;
pub mod stage;
pub mod transformer;

pub use config::StringCaseConfig;
pub use record::{Record, RecordError};
pub use schema::{Schema, SchemaError};
pub use stage::{StageError, StringCaseStage};
pub use transformer::{CaseTransformer, ConfigurationError, TransformError, Transformer};
