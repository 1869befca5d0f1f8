//! Metadata schema validation
//!
//! The metadata document must match a fixed shape before any build work
//! begins; a violation here is the only failure permitted to halt the
//! pipeline before compilation. Validation collects every violation rather
//! than stopping at the first, so the user sees the full list at once.

use serde_json::{Map, Value};
use std::fmt;

/// Plugin kinds accepted in the optional `type` field
pub const PLUGIN_TYPES: &[&str] = &["component", "datasource", "automation"];

/// A single schema constraint violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A required field is absent
    MissingField { field: String },
    /// A field is present with the wrong JSON type
    WrongType {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
    /// A field holds a value outside its allowed enumeration
    UnknownValue {
        field: String,
        value: String,
        allowed: Vec<&'static str>,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingField { field } => {
                write!(f, "missing required field '{}'", field)
            }
            Violation::WrongType {
                field,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "field '{}' has wrong type: expected {}, got {}",
                    field, expected, actual
                )
            }
            Violation::UnknownValue {
                field,
                value,
                allowed,
            } => {
                write!(
                    f,
                    "field '{}' has unknown value '{}': allowed values are {}",
                    field,
                    value,
                    allowed.join(", ")
                )
            }
        }
    }
}

/// Schema validation failure, enumerating every violated constraint
#[derive(Debug, Clone, thiserror::Error)]
#[error("metadata schema validation failed: {}", format_violations(.violations))]
pub struct SchemaValidationError {
    pub violations: Vec<Violation>,
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fixed schema definition for the metadata document.
///
/// Required string fields plus an optional enumerated `type`. The default
/// shape is the plugin schema: `name` and `version` required, `type` one of
/// [`PLUGIN_TYPES`] when present.
#[derive(Debug, Clone)]
pub struct MetadataSchema {
    /// Fields that must be present as strings
    pub required_strings: Vec<&'static str>,
    /// Optional field constrained to an enumeration, as (field, allowed)
    pub enum_field: Option<(&'static str, &'static [&'static str])>,
}

impl Default for MetadataSchema {
    fn default() -> Self {
        Self {
            required_strings: vec!["name", "version"],
            enum_field: Some(("type", PLUGIN_TYPES)),
        }
    }
}

impl MetadataSchema {
    /// Validate a metadata document against this schema.
    ///
    /// Returns `Ok(())` when the document conforms, or a
    /// `SchemaValidationError` listing every violated constraint.
    pub fn validate(&self, document: &Value) -> Result<(), SchemaValidationError> {
        let mut violations = Vec::new();

        let Some(object) = document.as_object() else {
            return Err(SchemaValidationError {
                violations: vec![Violation::WrongType {
                    field: "(document)".to_string(),
                    expected: "object",
                    actual: json_type_name(document),
                }],
            });
        };

        for field in &self.required_strings {
            check_required_string(object, field, &mut violations);
        }

        if let Some((field, allowed)) = self.enum_field {
            match object.get(field) {
                None => {}
                Some(Value::String(value)) => {
                    if !allowed.contains(&value.as_str()) {
                        violations.push(Violation::UnknownValue {
                            field: field.to_string(),
                            value: value.clone(),
                            allowed: allowed.to_vec(),
                        });
                    }
                }
                Some(other) => {
                    violations.push(Violation::WrongType {
                        field: field.to_string(),
                        expected: "string",
                        actual: json_type_name(other),
                    });
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError { violations })
        }
    }
}

fn check_required_string(object: &Map<String, Value>, field: &str, out: &mut Vec<Violation>) {
    match object.get(field) {
        None => out.push(Violation::MissingField {
            field: field.to_string(),
        }),
        Some(Value::String(_)) => {}
        Some(other) => out.push(Violation::WrongType {
            field: field.to_string(),
            expected: "string",
            actual: json_type_name(other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_document() {
        let schema = MetadataSchema::default();
        let doc = json!({"name": "p", "version": "1.0.0", "type": "component"});
        assert!(schema.validate(&doc).is_ok());
    }

    #[test]
    fn test_valid_without_optional_type() {
        let schema = MetadataSchema::default();
        let doc = json!({"name": "p", "version": "1.0.0"});
        assert!(schema.validate(&doc).is_ok());
    }

    #[test]
    fn test_missing_name() {
        let schema = MetadataSchema::default();
        let doc = json!({"version": "1.0.0"});
        let err = schema.validate(&doc).unwrap_err();
        assert_eq!(
            err.violations,
            vec![Violation::MissingField {
                field: "name".to_string()
            }]
        );
    }

    #[test]
    fn test_collects_all_violations() {
        let schema = MetadataSchema::default();
        let doc = json!({"version": 2, "type": "widget"});
        let err = schema.validate(&doc).unwrap_err();
        assert_eq!(err.violations.len(), 3);
        assert!(matches!(&err.violations[0], Violation::MissingField { field } if field == "name"));
        assert!(matches!(
            &err.violations[1],
            Violation::WrongType { field, expected: "string", .. } if field == "version"
        ));
        assert!(matches!(
            &err.violations[2],
            Violation::UnknownValue { field, value, .. } if field == "type" && value == "widget"
        ));
    }

    #[test]
    fn test_non_object_document() {
        let schema = MetadataSchema::default();
        let err = schema.validate(&json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(
            &err.violations[0],
            Violation::WrongType { actual: "array", .. }
        ));
    }

    #[test]
    fn test_error_message_lists_violations() {
        let schema = MetadataSchema::default();
        let err = schema.validate(&json!({})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing required field 'name'"));
        assert!(msg.contains("missing required field 'version'"));
    }
}
