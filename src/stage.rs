//! StringCase stage lifecycle.
//!
//! A host drives the stage in three phases:
//!
//! 1. [`StringCaseStage::configure`] once at deployment, with the input schema
//!    if it is known. Rejects configuration that names missing or non-string
//!    fields.
//! 2. [`StringCaseStage::initialize`] once per run, producing a
//!    [`CaseTransformer`].
//! 3. [`Transformer::transform`](crate::Transformer::transform) once per
//!    record.

use crate::config::StringCaseConfig;
use crate::schema::Schema;
use crate::transformer::{CaseTransformer, ConfigurationError};
use tracing::{info, warn};

/// A configured StringCase stage that has not been initialized yet.
#[derive(Debug, Clone, Default)]
pub struct StringCaseStage {
    config: StringCaseConfig,
}

impl StringCaseStage {
    /// Stage name as registered with a pipeline host.
    pub const NAME: &'static str = "StringCase";

    /// Create a new stage from configuration.
    pub fn new(config: StringCaseConfig) -> Self {
        Self { config }
    }

    /// Create from a YAML configuration string.
    pub fn from_yaml(yaml: &str) -> Result<Self, StageError> {
        let config: StringCaseConfig = serde_yaml::from_str(yaml)?;
        Ok(Self::new(config))
    }

    /// Create from a JSON configuration string.
    pub fn from_json(json: &str) -> Result<Self, StageError> {
        let config: StringCaseConfig = serde_json::from_str(json)?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &StringCaseConfig {
        &self.config
    }

    /// Deployment-time validation.
    ///
    /// With a known input schema, every configured field must exist and be a
    /// string. The output schema is always the input schema; `None` means it
    /// is only known at runtime.
    pub fn configure(
        &self,
        input_schema: Option<&Schema>,
    ) -> Result<Option<Schema>, ConfigurationError> {
        match input_schema {
            Some(schema) => {
                CaseTransformer::new(&self.config).validate_against_schema(schema)?;
                info!(stage = Self::NAME, schema = %schema, "Stage configured");
            }
            None => {
                info!(
                    stage = Self::NAME,
                    "Input schema unknown until runtime, skipping field validation"
                );
            }
        }
        Ok(input_schema.cloned())
    }

    /// Derive the working field sets for a run.
    pub fn initialize(&self) -> CaseTransformer {
        let transformer = CaseTransformer::new(&self.config);

        let conflicts = transformer.conflicting_fields();
        if !conflicts.is_empty() {
            warn!(
                stage = Self::NAME,
                fields = ?conflicts,
                "Fields configured for both upper and lower case, upper case wins"
            );
        }

        info!(
            stage = Self::NAME,
            upper_fields = transformer.upper_fields().len(),
            lower_fields = transformer.lower_fields().len(),
            "Stage initialized"
        );

        transformer
    }
}

/// Stage construction errors.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}
