//! Result contract validation.
//!
//! Checks a candidate JSON value against the result contract (see
//! [`result_contract_schema`]) using a compiled Draft 7 schema, then
//! deserializes it into a [`ProcessedResult`]. Keys outside the contract are
//! accepted and dropped.

use super::error::SchemaViolation;
use super::schema::result_contract_schema;
use crate::types::ProcessedResult;
use crate::{Error, ErrorContext, Result};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;

/// Validator for normalized results.
pub struct ResultValidator {
    schema: JSONSchema,
}

impl ResultValidator {
    /// Validator for the default result contract.
    pub fn new() -> Result<Self> {
        Self::with_schema(&result_contract_schema())
    }

    /// Validator for a stricter, caller-supplied contract.
    ///
    /// The candidate must still deserialize into a [`ProcessedResult`] afterwards.
    pub fn with_schema(schema: &Value) -> Result<Self> {
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|e| {
                Error::configuration_with_context(
                    "failed to compile result schema",
                    ErrorContext::new()
                        .with_details(e.to_string())
                        .with_source("result_validator"),
                )
            })?;
        Ok(Self { schema })
    }

    /// Whether a candidate is a raw provider response that must be normalized
    /// before it can be checked.
    pub fn is_provider_response(candidate: &Value) -> bool {
        candidate
            .get("choices")
            .and_then(|c| c.as_array())
            .is_some_and(|c| !c.is_empty())
    }

    /// Check `candidate` against the contract.
    pub fn check(&self, candidate: &Value) -> std::result::Result<ProcessedResult, Vec<SchemaViolation>> {
        if let Err(errors) = self.schema.validate(candidate) {
            return Err(errors
                .map(|e| SchemaViolation::new(e.to_string(), e.instance_path.to_string()))
                .collect());
        }

        serde_json::from_value::<ProcessedResult>(candidate.clone())
            .map_err(|e| vec![SchemaViolation::new(e.to_string(), "")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> ResultValidator {
        ResultValidator::new().unwrap()
    }

    #[test]
    fn test_accepts_minimal_result() {
        let result = validator().check(&json!({"message": "ok"})).unwrap();
        assert_eq!(result, ProcessedResult::new("ok"));
    }

    #[test]
    fn test_accepts_empty_metadata() {
        let result = validator()
            .check(&json!({"message": "ok", "metadata": {}}))
            .unwrap();
        assert_eq!(result.metadata, Some(serde_json::Map::new()));
    }

    #[test]
    fn test_rejects_non_string_message() {
        let violations = validator().check(&json!({"message": 123})).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/message");
    }

    #[test]
    fn test_rejects_missing_message_and_bad_metadata() {
        assert!(validator().check(&json!({"metadata": {}})).is_err());
        assert!(validator()
            .check(&json!({"message": "ok", "metadata": [1, 2]}))
            .is_err());
        assert!(validator()
            .check(&json!({"message": "ok", "metadata": null}))
            .is_err());
        assert!(validator().check(&json!("just text")).is_err());
    }

    #[test]
    fn test_extra_keys_are_dropped() {
        let result = validator()
            .check(&json!({"message": "ok", "mood": "cheerful"}))
            .unwrap();
        assert_eq!(result, ProcessedResult::new("ok"));
    }

    #[test]
    fn test_custom_contract() {
        let validator = ResultValidator::with_schema(&json!({
            "type": "object",
            "properties": {"message": {"type": "string", "minLength": 3}},
            "required": ["message"]
        }))
        .unwrap();
        assert!(validator.check(&json!({"message": "no"})).is_err());
        assert!(validator.check(&json!({"message": "yes"})).is_ok());
    }

    #[test]
    fn test_provider_response_detection() {
        assert!(ResultValidator::is_provider_response(
            &json!({"choices": [{"message": {"content": "x"}}]})
        ));
        assert!(!ResultValidator::is_provider_response(&json!({"choices": []})));
        assert!(!ResultValidator::is_provider_response(&json!({"message": "x"})));
    }
}
