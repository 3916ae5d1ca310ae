//! Turning a provider response into a result.
//!
//! Only the first choice is consulted. Its content is tried as JSON first; if
//! that fails the raw text becomes the message and response metadata is
//! attached. Responses without a usable choice produce a [`NormalizeError`],
//! which callers turn into [`degraded_result`].

use super::error::NormalizeError;
use crate::types::{ProcessedResult, ProviderResponse};
use serde_json::{json, Map, Value};

/// Message shown to the user when a reply arrived but could not be shaped.
pub const DEGRADED_MESSAGE: &str = "A problem occurred while processing the response.";

/// How the first choice's content was interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// Content parsed as JSON. Not yet checked against the result contract.
    Structured(Value),
    /// Content was free text; wrapped with model, usage and finish reason.
    PlainText(ProcessedResult),
}

impl Normalized {
    pub fn is_structured(&self) -> bool {
        matches!(self, Normalized::Structured(_))
    }

    /// JSON form, as the validator sees it.
    pub fn into_value(self) -> Value {
        match self {
            Normalized::Structured(value) => value,
            Normalized::PlainText(result) => serde_json::to_value(result).unwrap_or(Value::Null),
        }
    }
}

/// Interpret the first choice of `raw`.
pub fn normalize(raw: &ProviderResponse) -> Result<Normalized, NormalizeError> {
    let (content, finish_reason) = first_content(raw)?;

    if let Some(value) = parse_json(content) {
        return Ok(Normalized::Structured(value));
    }

    Ok(Normalized::PlainText(wrap_plain_text(raw, content, finish_reason)))
}

/// The plain-text interpretation of the first choice, even if it is valid JSON.
///
/// Used when structured content turns out not to satisfy the result contract.
pub fn plain_text(raw: &ProviderResponse) -> Result<ProcessedResult, NormalizeError> {
    let (content, finish_reason) = first_content(raw)?;
    Ok(wrap_plain_text(raw, content, finish_reason))
}

fn first_content(raw: &ProviderResponse) -> Result<(&str, Option<&str>), NormalizeError> {
    let choice = raw.first_choice().ok_or(NormalizeError::EmptyChoices)?;
    let content = choice.content().ok_or(NormalizeError::EmptyContent)?;
    Ok((content, choice.finish_reason.as_deref()))
}

fn wrap_plain_text(
    raw: &ProviderResponse,
    content: &str,
    finish_reason: Option<&str>,
) -> ProcessedResult {
    let mut metadata = Map::new();
    metadata.insert("model".into(), json!(raw.model));
    metadata.insert(
        "usage".into(),
        raw.raw.get("usage").cloned().unwrap_or(Value::Null),
    );
    metadata.insert("finish_reason".into(), json!(finish_reason));
    ProcessedResult::new(content).with_metadata(metadata)
}

/// Apologetic stand-in carrying the reason and the raw body for diagnostics.
pub fn degraded_result(error: &NormalizeError, raw: &ProviderResponse) -> ProcessedResult {
    let mut metadata = Map::new();
    metadata.insert("error".into(), json!(error.to_string()));
    metadata.insert("raw_data".into(), raw.raw.clone());
    ProcessedResult::new(DEGRADED_MESSAGE).with_metadata(metadata)
}

/// Parse JSON content, unwrapping a single surrounding ```json fence.
fn parse_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let inner = trimmed.strip_prefix("```")?.strip_suffix("```")?;
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    serde_json::from_str(inner.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(content: Value) -> ProviderResponse {
        ProviderResponse::from_value(json!({
            "id": "gen-42",
            "model": "meta-llama/llama-3-8b-instruct",
            "choices": [{
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        }))
    }

    #[test]
    fn test_json_content_is_taken_as_is() {
        let raw = response(json!(r#"{"message":"hi","metadata":{"a":1}}"#));
        let normalized = normalize(&raw).unwrap();
        assert_eq!(
            normalized,
            Normalized::Structured(json!({"message": "hi", "metadata": {"a": 1}}))
        );
    }

    #[test]
    fn test_plain_text_falls_back_with_metadata() {
        let raw = response(json!("hello"));
        let Normalized::PlainText(result) = normalize(&raw).unwrap() else {
            panic!("expected plain text");
        };
        assert_eq!(result.message, "hello");
        assert_eq!(
            result.metadata_value("model"),
            Some(&json!("meta-llama/llama-3-8b-instruct"))
        );
        assert_eq!(
            result.metadata_value("usage"),
            Some(&json!({"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}))
        );
        assert_eq!(result.metadata_value("finish_reason"), Some(&json!("stop")));
    }

    #[test]
    fn test_plain_text_forces_fallback_for_json() {
        let raw = response(json!(r#"{"text":"hi"}"#));
        let result = plain_text(&raw).unwrap();
        assert_eq!(result.message, r#"{"text":"hi"}"#);
        assert_eq!(result.metadata_value("finish_reason"), Some(&json!("stop")));
    }

    #[test]
    fn test_usage_is_passed_through_unchanged() {
        let raw = ProviderResponse::from_value(json!({
            "model": "openai/gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "hello"}}],
            "usage": {"total_tokens": 16, "cost": 0.002}
        }));
        let Normalized::PlainText(result) = normalize(&raw).unwrap() else {
            panic!("expected plain text");
        };
        assert_eq!(
            result.metadata_value("usage"),
            Some(&json!({"total_tokens": 16, "cost": 0.002}))
        );
    }

    #[test]
    fn test_malformed_siblings_do_not_degrade() {
        let raw = ProviderResponse::from_value(json!({
            "id": 42,
            "choices": [{"message": {"content": "hello"}}],
            "usage": {"prompt_tokens": 12.0, "completion_tokens": 4, "total_tokens": 16}
        }));
        let Normalized::PlainText(result) = normalize(&raw).unwrap() else {
            panic!("expected plain text");
        };
        assert_eq!(result.message, "hello");
        assert_eq!(result.metadata_value("usage").unwrap()["prompt_tokens"], json!(12.0));

        let raw = ProviderResponse::from_value(json!({
            "id": 42,
            "choices": [{"message": {"content": "{\"message\": \"hi\"}"}}]
        }));
        assert_eq!(
            normalize(&raw).unwrap(),
            Normalized::Structured(json!({"message": "hi"}))
        );
    }

    #[test]
    fn test_fenced_json_is_structured() {
        let raw = response(json!("```json\n{\"message\": \"fenced\"}\n```"));
        assert_eq!(
            normalize(&raw).unwrap(),
            Normalized::Structured(json!({"message": "fenced"}))
        );
    }

    #[test]
    fn test_only_first_choice_counts() {
        let raw = ProviderResponse::from_value(json!({
            "choices": [
                {"message": {"role": "assistant", "content": ""}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }));
        assert_eq!(normalize(&raw), Err(NormalizeError::EmptyContent));
    }

    #[test]
    fn test_empty_choices() {
        let raw = ProviderResponse::from_value(json!({"choices": []}));
        assert_eq!(normalize(&raw), Err(NormalizeError::EmptyChoices));

        let raw = ProviderResponse::from_value(json!({"id": "x"}));
        assert_eq!(normalize(&raw), Err(NormalizeError::EmptyChoices));
    }

    #[test]
    fn test_degraded_result_keeps_raw_body() {
        let body = json!({"id": "gen-0", "choices": []});
        let raw = ProviderResponse::from_value(body.clone());
        let result = degraded_result(&NormalizeError::EmptyChoices, &raw);
        assert_eq!(result.message, DEGRADED_MESSAGE);
        assert_eq!(
            result.metadata_value("error"),
            Some(&json!("No response choices available"))
        );
        assert_eq!(result.metadata_value("raw_data"), Some(&body));
    }
}
