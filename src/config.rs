//! Configuration types for the StringCase stage.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Separator between names in a delimited field list: a comma with optional
/// surrounding whitespace.
static SPLIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());

/// Stage configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StringCaseConfig {
    /// Fields to upper-case. Each must be of type string.
    pub upper_fields: Option<FieldList>,
    /// Fields to lower-case. Each must be of type string.
    pub lower_fields: Option<FieldList>,
}

impl StringCaseConfig {
    /// Build a configuration from two comma-separated lists.
    pub fn from_delimited(upper: impl Into<String>, lower: impl Into<String>) -> Self {
        Self {
            upper_fields: Some(FieldList::Delimited(upper.into())),
            lower_fields: Some(FieldList::Delimited(lower.into())),
        }
    }

    /// Parsed set of fields to upper-case.
    pub fn upper_field_set(&self) -> HashSet<String> {
        self.upper_fields
            .as_ref()
            .map(FieldList::to_set)
            .unwrap_or_default()
    }

    /// Parsed set of fields to lower-case.
    pub fn lower_field_set(&self) -> HashSet<String> {
        self.lower_fields
            .as_ref()
            .map(FieldList::to_set)
            .unwrap_or_default()
    }
}

/// A list of field names, either comma-separated or already split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldList {
    /// `"name, city"`
    Delimited(String),
    /// `["name", "city"]`
    Names(Vec<String>),
}

impl FieldList {
    /// Collect the names into a set, dropping empty entries.
    pub fn to_set(&self) -> HashSet<String> {
        match self {
            FieldList::Delimited(s) => parse_field_list(s),
            FieldList::Names(names) => names
                .iter()
                .filter(|n| !n.is_empty())
                .cloned()
                .collect(),
        }
    }
}

/// Split a comma-separated list of field names.
///
/// Whitespace next to a comma is stripped; whitespace elsewhere is kept.
pub fn parse_field_list(s: &str) -> HashSet<String> {
    if s.is_empty() {
        return HashSet::new();
    }
    SPLIT_PATTERN
        .split(s)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_default_config() {
        let config = StringCaseConfig::default();
        assert!(config.upper_field_set().is_empty());
        assert!(config.lower_field_set().is_empty());
    }

    #[test]
    fn test_parse_field_list() {
        assert_eq!(parse_field_list("name,city"), set(&["name", "city"]));
        assert_eq!(parse_field_list("name , city"), set(&["name", "city"]));
        assert_eq!(parse_field_list("name"), set(&["name"]));
        assert!(parse_field_list("").is_empty());
    }

    #[test]
    fn test_parse_keeps_outer_whitespace() {
        // Only whitespace around commas is part of the separator
        assert_eq!(parse_field_list(" name , city "), set(&[" name", "city "]));
        assert_eq!(parse_field_list("first name,city"), set(&["first name", "city"]));
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        assert_eq!(parse_field_list("name,,city,"), set(&["name", "city"]));
        assert!(parse_field_list(" , ").is_empty());
    }

    #[test]
    fn test_parse_deduplicates() {
        assert_eq!(parse_field_list("a, a ,a"), set(&["a"]));
    }

    #[test]
    fn test_config_parsing_yaml() {
        let yaml = r#"
upperFields: "name, code"
lowerFields: city
"#;
        let config: StringCaseConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.upper_field_set(), set(&["name", "code"]));
        assert_eq!(config.lower_field_set(), set(&["city"]));
    }

    #[test]
    fn test_config_parsing_list_form() {
        let json = r#"{"upperFields": ["name", "code"], "lowerFields": []}"#;
        let config: StringCaseConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.upper_field_set(), set(&["name", "code"]));
        assert!(config.lower_field_set().is_empty());
    }

    #[test]
    fn test_config_absent_and_null() {
        let config: StringCaseConfig = serde_json::from_str(r#"{"upperFields": null}"#).unwrap();
        assert!(config.upper_field_set().is_empty());
        assert!(config.lower_field_set().is_empty());
    }

    #[test]
    fn test_from_delimited() {
        let config = StringCaseConfig::from_delimited("name", "");
        assert_eq!(config.upper_field_set(), set(&["name"]));
        assert!(config.lower_field_set().is_empty());
    }
}
