use super::core::OpenRouterClient;
use crate::structured::{normalize, plain_text, NormalizeError, Normalized};
use crate::telemetry::{ErrorReport, ErrorStage};
use crate::transport::TransportRequest;
use crate::types::{ProcessedResult, ProviderResponse};
use crate::{Error, Result};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

/// Answer of one chat exchange.
///
/// A reply that arrived but could not be shaped is still an answer; it comes
/// back as [`ChatOutcome::Degraded`] instead of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Completed(ProcessedResult),
    Degraded {
        result: ProcessedResult,
        reason: NormalizeError,
    },
}

impl ChatOutcome {
    pub fn result(&self) -> &ProcessedResult {
        match self {
            ChatOutcome::Completed(result) | ChatOutcome::Degraded { result, .. } => result,
        }
    }

    pub fn into_result(self) -> ProcessedResult {
        match self {
            ChatOutcome::Completed(result) | ChatOutcome::Degraded { result, .. } => result,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ChatOutcome::Degraded { .. })
    }

    pub fn reason(&self) -> Option<NormalizeError> {
        match self {
            ChatOutcome::Degraded { reason, .. } => Some(*reason),
            ChatOutcome::Completed(_) => None,
        }
    }
}

impl OpenRouterClient {
    /// Send one user message and shape the reply.
    ///
    /// `extra_context` is merged into the request body last, so it may override
    /// sampling parameters, `model` or `response_format`, but never `messages`.
    ///
    /// Fails only when no answer was obtained. Every failure is handed to the
    /// error reporter once before it is returned or absorbed.
    pub async fn send_chat_message(
        &self,
        user_message: &str,
        extra_context: Option<&Map<String, Value>>,
    ) -> Result<ChatOutcome> {
        let request_id = Uuid::new_v4().to_string();
        let config = self.config();
        let payload = self.build_payload_from(&config, user_message, extra_context);

        info!(
            request_id = %request_id,
            model = %config.model,
            endpoint = %config.endpoint,
            "sending chat message"
        );

        let request = TransportRequest {
            endpoint: &config.endpoint,
            api_key: config.api_key(),
            payload: payload.as_ref(),
            request_id: &request_id,
        };
        let raw = match self.transport.send(request).await {
            Ok(raw) => raw,
            Err(e) => {
                self.report(
                    ErrorReport::from_error(ErrorStage::Transport, &e)
                        .with_request_id(request_id.as_str())
                        .with_context(transport_context(&e, &config.endpoint, &config.model)),
                );
                return Err(e);
            }
        };

        debug!(
            request_id = %request_id,
            response_id = raw.id.as_deref().unwrap_or("-"),
            choices = raw.choices.as_ref().map_or(0, Vec::len),
            total_tokens = ?raw.usage.and_then(|u| u.total_tokens),
            "received chat completion"
        );

        Ok(self.shape(&raw, &request_id))
    }

    fn shape(&self, raw: &ProviderResponse, request_id: &str) -> ChatOutcome {
        let degraded = |reason: NormalizeError| ChatOutcome::Degraded {
            result: self.degrade(reason, raw, Some(request_id)),
            reason,
        };

        match normalize(raw) {
            Ok(Normalized::PlainText(result)) => ChatOutcome::Completed(result),
            Ok(Normalized::Structured(value)) => match self.validator.check(&value) {
                Ok(result) => ChatOutcome::Completed(result),
                Err(violations) => {
                    debug!(
                        request_id = %request_id,
                        violations = violations.len(),
                        "structured reply outside the result contract, keeping it as text"
                    );
                    match plain_text(raw) {
                        Ok(result) => ChatOutcome::Completed(result),
                        Err(reason) => degraded(reason),
                    }
                }
            },
            Err(reason) => degraded(reason),
        }
    }
}

fn transport_context(error: &Error, endpoint: &str, model: &str) -> Value {
    let (status, class) = match error {
        Error::Transport(e) => (e.status(), Some(e.class().name())),
        _ => (error.status(), None),
    };
    json!({
        "endpoint": endpoint,
        "model": model,
        "status": status,
        "class": class,
    })
}
