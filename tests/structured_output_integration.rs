//! Integration tests for structured output functionality

use openrouter_chat::config::{ResponseFormat, ResponseFormatKind};
use openrouter_chat::structured::{
    degraded_result, normalize, result_contract_schema, Normalized, ResultValidator,
    SchemaGenerator, DEGRADED_MESSAGE,
};
use openrouter_chat::types::ProviderResponse;
use openrouter_chat::ProcessedResult;
use schemars::JsonSchema;
use serde_json::json;

#[test]
fn test_end_to_end_normalize_then_validate() {
    let raw = ProviderResponse::from_value(json!({
        "id": "gen-7",
        "model": "openai/gpt-4o-mini",
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "{\"message\": \"Shakshuka\", \"metadata\": {\"minutes\": 25}}"
            },
            "finish_reason": "stop"
        }]
    }));

    let normalized = normalize(&raw).unwrap();
    assert!(normalized.is_structured());

    let validator = ResultValidator::new().unwrap();
    let result = validator.check(&normalized.into_value()).unwrap();
    assert_eq!(result.message, "Shakshuka");
    assert_eq!(result.metadata_value("minutes"), Some(&json!(25)));
}

#[test]
fn test_plain_text_result_satisfies_contract() {
    let raw = ProviderResponse::from_value(json!({
        "model": "openai/gpt-4o-mini",
        "choices": [{"message": {"role": "assistant", "content": "Grill the halloumi."}}]
    }));

    let Normalized::PlainText(result) = normalize(&raw).unwrap() else {
        panic!("expected plain text");
    };
    let validator = ResultValidator::new().unwrap();
    let checked = validator
        .check(&serde_json::to_value(&result).unwrap())
        .unwrap();
    assert_eq!(checked, result);
}

#[test]
fn test_degraded_result_satisfies_contract() {
    let raw = ProviderResponse::from_value(json!({"choices": []}));
    let reason = normalize(&raw).unwrap_err();
    let result = degraded_result(&reason, &raw);

    let validator = ResultValidator::new().unwrap();
    let checked = validator
        .check(&serde_json::to_value(&result).unwrap())
        .unwrap();
    assert_eq!(checked.message, DEGRADED_MESSAGE);
}

#[test]
fn test_invalid_data_validation() {
    let validator = ResultValidator::new().unwrap();

    // Test with wrong type
    let violations = validator.check(&json!({"message": 123})).unwrap_err();
    assert!(!violations.is_empty());
    assert_eq!(violations[0].path, "/message");

    let violations = validator
        .check(&json!({"message": "ok", "metadata": "none"}))
        .unwrap_err();
    assert_eq!(violations[0].path, "/metadata");
}

#[test]
fn test_stricter_contract_from_generator() {
    let schema = SchemaGenerator::new()
        .title("Recipe")
        .add_property("message", json!({"type": "string"}))
        .add_property(
            "metadata",
            json!({
                "type": "object",
                "properties": {"servings": {"type": "integer"}},
                "required": ["servings"]
            }),
        )
        .set_required(&["message".to_string(), "metadata".to_string()])
        .build();

    let validator = ResultValidator::with_schema(&schema).unwrap();
    assert!(validator
        .check(&json!({"message": "Pasta", "metadata": {"servings": 4}}))
        .is_ok());
    assert!(validator.check(&json!({"message": "Pasta"})).is_err());
    assert!(validator
        .check(&json!({"message": "Pasta", "metadata": {"servings": "four"}}))
        .is_err());
}

#[derive(JsonSchema)]
#[allow(dead_code)]
struct Recipe {
    title: String,
    minutes: u32,
}

#[test]
fn test_response_format_from_type() {
    let format = ResponseFormat::for_type::<Recipe>("Recipe", true);
    let value = serde_json::to_value(&format).unwrap();

    assert_eq!(format.kind, ResponseFormatKind::JsonSchema);
    assert_eq!(value["type"], "json_schema");
    assert_eq!(value["json_schema"]["name"], "Recipe");
    assert_eq!(value["json_schema"]["strict"], true);
    assert_eq!(
        value["json_schema"]["schema"]["properties"]["minutes"]["type"],
        "integer"
    );
}

#[test]
fn test_default_response_format_matches_result_contract() {
    let format = ResponseFormat::default();
    let contract = result_contract_schema();

    assert_eq!(format.json_schema.name, "ChatResponse");
    assert_eq!(
        format.json_schema.schema["properties"]["message"],
        contract["properties"]["message"]
    );

    let validator = ResultValidator::with_schema(&format.json_schema.schema).unwrap();
    assert_eq!(
        validator.check(&json!({"message": "hi"})).unwrap(),
        ProcessedResult::new("hi")
    );
}
