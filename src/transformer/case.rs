//! Upper/lower-case field transformer.

use super::{ConfigurationError, TransformError, Transformer};
use crate::config::StringCaseConfig;
use crate::record::Record;
use crate::schema::{json_kind, FieldType, Schema};
use serde_json::Value as JsonValue;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, trace, Span};

/// Case applied to a targeted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Upper,
    Lower,
}

/// Converts configured string fields to upper or lower case.
///
/// The field sets are fixed at construction, so one instance can be shared
/// across threads and called concurrently on disjoint records. A field named
/// in both sets is upper-cased.
#[derive(Debug, Clone)]
pub struct CaseTransformer {
    /// Fields to upper-case
    upper: HashSet<String>,
    /// Fields to lower-case
    lower: HashSet<String>,
    /// Span all log events are recorded under
    span: Span,
}

impl CaseTransformer {
    /// Create a new case transformer from configuration.
    pub fn new(config: &StringCaseConfig) -> Self {
        Self::from_sets(config.upper_field_set(), config.lower_field_set())
    }

    /// Create a case transformer from already-parsed field sets.
    pub fn from_sets(upper: HashSet<String>, lower: HashSet<String>) -> Self {
        Self {
            upper,
            lower,
            span: tracing::info_span!("string_case"),
        }
    }

    /// Record log events under the given span instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Fields configured for upper case.
    pub fn upper_fields(&self) -> &HashSet<String> {
        &self.upper
    }

    /// Fields configured for lower case.
    pub fn lower_fields(&self) -> &HashSet<String> {
        &self.lower
    }

    /// Fields named in both sets, sorted. These are upper-cased.
    pub fn conflicting_fields(&self) -> Vec<&str> {
        let mut conflicts: Vec<&str> = self
            .upper
            .intersection(&self.lower)
            .map(String::as_str)
            .collect();
        conflicts.sort_unstable();
        conflicts
    }

    /// Check that every configured field exists in `schema` and is a
    /// (possibly nullable) string.
    ///
    /// Fields are checked in name order, so the first failure is stable.
    pub fn validate_against_schema(&self, schema: &Schema) -> Result<(), ConfigurationError> {
        let _guard = self.span.enter();

        let names: BTreeSet<&String> = self.upper.iter().chain(&self.lower).collect();
        let checked = names.len();
        for name in names {
            let field = schema
                .field(name)
                .ok_or_else(|| ConfigurationError::FieldNotFound {
                    field: name.clone(),
                    schema: schema.clone(),
                })?;

            let actual = field.field_type.non_nullable();
            if *actual != FieldType::String {
                return Err(ConfigurationError::IllegalType {
                    field: name.clone(),
                    actual: actual.clone(),
                    expected: FieldType::String,
                });
            }
        }

        debug!(fields = checked, "Configured fields validated against schema");
        Ok(())
    }

    fn case_for(&self, name: &str) -> Option<Case> {
        if self.upper.contains(name) {
            Some(Case::Upper)
        } else if self.lower.contains(name) {
            Some(Case::Lower)
        } else {
            None
        }
    }
}

/// Case-convert a targeted value, which must be a non-null string.
fn convert(name: &str, value: &JsonValue, case: Case) -> Result<JsonValue, TransformError> {
    match value {
        JsonValue::String(s) => {
            let converted = match case {
                Case::Upper => s.to_uppercase(),
                Case::Lower => s.to_lowercase(),
            };
            Ok(JsonValue::String(converted))
        }
        JsonValue::Null => Err(TransformError::NullValue {
            field: name.to_string(),
        }),
        other => Err(TransformError::NotAString {
            field: name.to_string(),
            actual: json_kind(other),
        }),
    }
}

impl Transformer for CaseTransformer {
    fn transform(&self, record: &Record) -> Result<Record, TransformError> {
        let _guard = self.span.enter();
        trace!(fields = record.schema().len(), "Transforming record");

        let mut builder = Record::builder(record.schema().clone());
        for (name, value) in record.iter() {
            let output = match self.case_for(name) {
                Some(case) => convert(name, value, case)?,
                None => value.clone(),
            };
            builder = builder.set(name, output)?;
        }

        Ok(builder.build()?)
    }

    fn name(&self) -> &'static str {
        "string_case"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn make_schema() -> Arc<Schema> {
        Arc::new(
            Schema::new(vec![
                Field::new("name", FieldType::String),
                Field::new("city", FieldType::String),
                Field::new("nickname", FieldType::nullable(FieldType::String)),
                Field::new("age", FieldType::Int),
            ])
            .unwrap(),
        )
    }

    fn make_record(value: JsonValue) -> Record {
        Record::from_json(make_schema(), &value).unwrap()
    }

    fn transformer(upper: &str, lower: &str) -> CaseTransformer {
        CaseTransformer::new(&StringCaseConfig::from_delimited(upper, lower))
    }

    #[test]
    fn test_upper_and_lower() {
        let t = transformer("name", "city");
        let record = make_record(json!({"name": "Ana", "city": "LONDON", "age": 30}));

        let output = t.transform(&record).unwrap();

        assert_eq!(output.get("name"), Some(&json!("ANA")));
        assert_eq!(output.get("city"), Some(&json!("london")));
        assert_eq!(output.get("age"), Some(&json!(30)));
        assert_eq!(output.get("nickname"), Some(&JsonValue::Null));
    }

    #[test]
    fn test_input_not_mutated() {
        let t = transformer("name", "");
        let record = make_record(json!({"name": "Ana", "city": "x", "age": 1}));
        let before = record.clone();

        let _ = t.transform(&record).unwrap();

        assert_eq!(record, before);
    }

    #[test]
    fn test_upper_wins_on_conflict() {
        let t = transformer("name", "name");
        assert_eq!(t.conflicting_fields(), vec!["name"]);

        let record = make_record(json!({"name": "Ana", "city": "x", "age": 1}));
        let output = t.transform(&record).unwrap();

        assert_eq!(output.get("name"), Some(&json!("ANA")));
    }

    #[test]
    fn test_unicode_case_conversion() {
        let t = transformer("name", "city");
        let record = make_record(json!({"name": "straße", "city": "ÉCOLE", "age": 1}));

        let output = t.transform(&record).unwrap();

        assert_eq!(output.get("name"), Some(&json!("STRASSE")));
        assert_eq!(output.get("city"), Some(&json!("école")));
    }

    #[test]
    fn test_null_target_fails() {
        let t = transformer("nickname", "");
        let record = make_record(json!({"name": "Ana", "city": "x", "age": 1}));

        let err = t.transform(&record).unwrap_err();

        assert!(matches!(err, TransformError::NullValue { ref field } if field == "nickname"));
    }

    #[test]
    fn test_non_string_target_fails() {
        // Validation skipped, so the int field reaches transform
        let t = transformer("", "age");
        let record = make_record(json!({"name": "Ana", "city": "x", "age": 1}));

        let err = t.transform(&record).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Field 'age' holds a JSON number, expected a string"
        );
    }

    #[test]
    fn test_unknown_configured_field_ignored_at_transform() {
        let t = transformer("missing", "");
        let record = make_record(json!({"name": "Ana", "city": "x", "age": 1}));

        let output = t.transform(&record).unwrap();

        assert_eq!(output, record);
    }

    #[test]
    fn test_validate_ok_with_nullable_string() {
        let t = transformer("name, nickname", "city");
        assert!(t.validate_against_schema(&make_schema()).is_ok());
    }

    #[test]
    fn test_validate_missing_field() {
        let t = transformer("missing", "");
        let err = t.validate_against_schema(&make_schema()).unwrap_err();

        assert_eq!(err.field(), "missing");
        assert!(matches!(err, ConfigurationError::FieldNotFound { .. }));
        assert!(err.to_string().contains("'missing' does not exist"));
    }

    #[test]
    fn test_validate_illegal_type() {
        let t = transformer("", "age");
        let err = t.validate_against_schema(&make_schema()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Field 'age' is of illegal type int. Must be of type string."
        );
    }

    #[test]
    fn test_validate_unwraps_nullable_type_in_message() {
        let schema = Schema::new(vec![Field::new(
            "score",
            FieldType::nullable(FieldType::Double),
        )])
        .unwrap();
        let t = transformer("score", "");

        let err = t.validate_against_schema(&schema).unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::IllegalType { actual: FieldType::Double, .. }
        ));
    }

    #[test]
    fn test_validate_reports_first_name_in_order() {
        let t = transformer("zeta, alpha", "");
        let err = t.validate_against_schema(&make_schema()).unwrap_err();
        assert_eq!(err.field(), "alpha");
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_validate_logs_configured_field_count() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        // Four schema fields, two configured names
        let t = transformer("name", "city");
        tracing::subscriber::with_default(subscriber, || {
            t.validate_against_schema(&make_schema()).unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("fields=2"), "unexpected log output: {output}");
    }

    #[test]
    fn test_with_span() {
        let t = transformer("name", "").with_span(tracing::info_span!("pipeline", stage = "case"));
        let record = make_record(json!({"name": "Ana", "city": "x", "age": 1}));
        assert_eq!(t.transform(&record).unwrap().get("name"), Some(&json!("ANA")));
    }

    #[test]
    fn test_transformer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CaseTransformer>();
    }
}
