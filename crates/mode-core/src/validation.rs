//! Parameter Validation
//!
//! Entry arguments and ordinary tool arguments pass through a
//! [`ParameterValidator`] before use. [`SchemaValidator`] checks the
//! [`ParameterSchema`] lists declared by modes and tools; hosts with richer
//! schemas can plug in their own implementation.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::tool::ParameterSchema;

/// Argument rejection reason
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("arguments must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("missing required parameter `{0}`")]
    Missing(String),

    #[error("parameter `{name}` must be of type {expected}, got {actual}")]
    WrongType {
        name: String,
        expected: String,
        actual: &'static str,
    },

    #[error("parameter `{name}` must be one of {allowed}")]
    NotAllowed { name: String, allowed: String },

    #[error("unexpected parameter `{0}`")]
    Unexpected(String),
}

/// Validation collaborator: `validate(schema, raw) -> parsed | error`
pub trait ParameterValidator: Send + Sync {
    fn validate(
        &self,
        schema: &[ParameterSchema],
        raw: &Value,
    ) -> Result<Value, ValidationError>;
}

/// Default validator over [`ParameterSchema`] lists.
///
/// Fills in defaults for absent optional parameters. `null` is accepted as
/// an empty argument object.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemaValidator {
    /// Accept keys not declared in the schema
    pub allow_unknown: bool,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator that passes undeclared keys through untouched
    pub fn lenient() -> Self {
        Self {
            allow_unknown: true,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn matches_type(param_type: &str, value: &Value) -> bool {
    match param_type {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        // Unknown type names are the schema author's business
        _ => true,
    }
}

impl ParameterValidator for SchemaValidator {
    fn validate(
        &self,
        schema: &[ParameterSchema],
        raw: &Value,
    ) -> Result<Value, ValidationError> {
        let supplied = match raw {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => return Err(ValidationError::NotAnObject(type_name(other))),
        };

        if !self.allow_unknown {
            if let Some(key) = supplied
                .keys()
                .find(|key| !schema.iter().any(|p| &p.name == *key))
            {
                return Err(ValidationError::Unexpected(key.clone()));
            }
        }

        let mut parsed = supplied;
        for param in schema {
            match parsed.get(&param.name) {
                Some(value) => {
                    if !matches_type(&param.param_type, value) {
                        return Err(ValidationError::WrongType {
                            name: param.name.clone(),
                            expected: param.param_type.clone(),
                            actual: type_name(value),
                        });
                    }
                    if let Some(allowed) = &param.enum_values {
                        if !allowed.contains(value) {
                            return Err(ValidationError::NotAllowed {
                                name: param.name.clone(),
                                allowed: Value::Array(allowed.clone()).to_string(),
                            });
                        }
                    }
                }
                None if param.required => {
                    return Err(ValidationError::Missing(param.name.clone()));
                }
                None => {
                    if let Some(default) = &param.default {
                        parsed.insert(param.name.clone(), default.clone());
                    }
                }
            }
        }

        Ok(Value::Object(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn booking_schema() -> Vec<ParameterSchema> {
        vec![
            ParameterSchema::required("request", "string", "What the traveller asked for"),
            ParameterSchema::optional("passengers", "integer", "Number of travellers")
                .with_default(json!(1)),
            ParameterSchema::optional("cabin", "string", "Cabin class")
                .with_enum(vec![json!("economy"), json!("business")]),
        ]
    }

    #[test]
    fn test_valid_arguments_get_defaults() {
        let parsed = SchemaValidator::new()
            .validate(&booking_schema(), &json!({"request": "flight to Hawaii"}))
            .unwrap();
        assert_eq!(parsed, json!({"request": "flight to Hawaii", "passengers": 1}));
    }

    #[test]
    fn test_missing_required() {
        let err = SchemaValidator::new()
            .validate(&booking_schema(), &json!({}))
            .unwrap_err();
        assert_eq!(err, ValidationError::Missing("request".into()));
    }

    #[test]
    fn test_wrong_type_and_enum() {
        let validator = SchemaValidator::new();
        let err = validator
            .validate(&booking_schema(), &json!({"request": 42}))
            .unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { actual: "integer", .. }));

        let err = validator
            .validate(&booking_schema(), &json!({"request": "x", "cabin": "first"}))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_unknown_keys() {
        let args = json!({"request": "x", "seat": "12A"});
        assert_eq!(
            SchemaValidator::new().validate(&booking_schema(), &args).unwrap_err(),
            ValidationError::Unexpected("seat".into())
        );
        assert!(SchemaValidator::lenient().validate(&booking_schema(), &args).is_ok());
    }

    #[test]
    fn test_null_and_non_object() {
        let validator = SchemaValidator::new();
        assert_eq!(validator.validate(&[], &Value::Null).unwrap(), json!({}));
        assert_eq!(
            validator.validate(&[], &json!("Hawaii")).unwrap_err(),
            ValidationError::NotAnObject("string")
        );
    }
}
