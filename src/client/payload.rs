//! Request body assembly.

use crate::config::ServiceConfiguration;
use crate::types::Message;
use serde_json::{Map, Value};

/// Build the chat-completion body for one user message.
///
/// Precedence, lowest first: `model` and `messages`, then the sampling
/// parameters, then `response_format`, then `extra_context`. Extra context may
/// override anything except `messages`, which is always exactly
/// `[system, user]`.
pub fn build_payload(
    config: &ServiceConfiguration,
    user_message: &str,
    extra_context: Option<&Map<String, Value>>,
) -> Value {
    let messages = [
        Message::system(config.system_message.as_str()),
        Message::user(user_message),
    ];

    let mut body = Map::new();
    body.insert("model".into(), Value::String(config.model.clone()));
    body.insert(
        "messages".into(),
        serde_json::to_value(messages).unwrap_or(Value::Array(Vec::new())),
    );
    body.extend(config.parameters.to_json_map());
    if let Ok(format) = serde_json::to_value(&config.response_format) {
        body.insert("response_format".into(), format);
    }

    if let Some(extra) = extra_context {
        for (key, value) in extra {
            if key == "messages" {
                tracing::debug!("ignoring `messages` supplied as extra context");
                continue;
            }
            body.insert(key.clone(), value.clone());
        }
    }

    Value::Object(body)
}
