//! Chat-completion response as returned by the provider.
//!
//! Nothing in here is trusted. Every field is decoded on its own: a field of
//! the wrong type becomes `None` without affecting its siblings, so a stray
//! `"id": 42` never hides a usable choice. [`ProviderResponse::from_value`]
//! never fails and keeps the original JSON in [`ProviderResponse::raw`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "lenient_choices")]
    pub choices: Option<Vec<Choice>>,
    #[serde(default, deserialize_with = "lenient")]
    pub usage: Option<Usage>,
    /// The body exactly as received.
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<ChoiceMessage>,
    #[serde(default, deserialize_with = "lenient")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
}

/// Token counters. Only used for logging; result metadata carries the raw
/// `usage` object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, deserialize_with = "lenient")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub completion_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_tokens: Option<u64>,
}

/// Decode `T`, turning a type mismatch into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode the choice list element by element so positions are preserved; an
/// element that is not an object becomes an empty choice.
fn lenient_choices<'de, D>(deserializer: D) -> Result<Option<Vec<Choice>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
        ),
        _ => None,
    })
}

impl ProviderResponse {
    /// Interpret an already-parsed JSON body.
    pub fn from_value(value: Value) -> Self {
        let mut parsed = match serde_json::from_value::<ProviderResponse>(value.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "provider response is not a JSON object");
                ProviderResponse::default()
            }
        };
        parsed.raw = value;
        parsed
    }

    /// The authoritative choice. Only index 0 is ever consulted.
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.as_ref().and_then(|c| c.first())
    }
}

impl Choice {
    /// Message content, if present and non-empty.
    pub fn content(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.content.as_deref())
            .filter(|c| !c.is_empty())
    }
}
