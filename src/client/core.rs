use crate::config::{ServiceConfiguration, ServiceOptions};
use crate::structured::{
    degraded_result, normalize, NormalizeError, ResultValidator, SchemaViolation,
};
use crate::telemetry::{ErrorReport, ErrorReporter, ErrorStage};
use crate::transport::HttpTransport;
use crate::types::{ProcessedResult, ProviderResponse};
use crate::{Error, ErrorContext, Result};
use arc_swap::{ArcSwap, ArcSwapOption};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

use super::builder::OpenRouterClientBuilder;

/// Message carried by every [`Error::Validation`]; the per-field detail only
/// reaches the error reporter.
pub(crate) const VALIDATION_FAILED: &str = "Failed to parse LLM response: invalid format";

/// Chat-completion client for one OpenRouter-compatible endpoint.
///
/// Cheap to share behind an `Arc`. Every call reads a full configuration
/// snapshot, so a concurrent [`reconfigure`](Self::reconfigure) is observed
/// either entirely or not at all.
pub struct OpenRouterClient {
    pub(crate) config: ArcSwap<ServiceConfiguration>,
    /// Serializes read-merge-store in `reconfigure`.
    pub(crate) reconfigure_lock: Mutex<()>,
    pub(crate) last_payload: ArcSwapOption<Value>,
    pub(crate) transport: HttpTransport,
    pub(crate) validator: ResultValidator,
    pub(crate) reporter: Arc<dyn ErrorReporter>,
}

impl OpenRouterClient {
    pub fn builder() -> OpenRouterClientBuilder {
        OpenRouterClientBuilder::new()
    }

    /// Client configured from the environment and the baked-in defaults.
    pub fn new() -> Result<Self> {
        OpenRouterClientBuilder::new().build()
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<ServiceConfiguration> {
        self.config.load_full()
    }

    /// Apply every field present in `options`; omitted fields keep their value.
    ///
    /// The last-payload slot is cleared even when the new options are rejected.
    pub fn reconfigure(&self, options: ServiceOptions) -> Result<()> {
        let _guard = self
            .reconfigure_lock
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        self.last_payload.store(None);

        let next = match self.config.load().merged(options) {
            Ok(next) => next,
            Err(e) => {
                self.report(ErrorReport::from_error(ErrorStage::Configure, &e));
                return Err(e);
            }
        };

        tracing::info!(
            endpoint = %next.endpoint,
            model = %next.model,
            api_key = %next.masked_api_key(),
            "OpenRouter client reconfigured"
        );
        self.config.store(Arc::new(next));
        Ok(())
    }

    /// The most recently built request body, for diagnostics.
    pub fn last_payload(&self) -> Option<Arc<Value>> {
        self.last_payload.load_full()
    }

    /// Build the request body from the current configuration and remember it
    /// as the last payload.
    pub fn build_payload(
        &self,
        user_message: &str,
        extra_context: Option<&Map<String, Value>>,
    ) -> Arc<Value> {
        self.build_payload_from(&self.config(), user_message, extra_context)
    }

    pub(crate) fn build_payload_from(
        &self,
        config: &ServiceConfiguration,
        user_message: &str,
        extra_context: Option<&Map<String, Value>>,
    ) -> Arc<Value> {
        let payload = Arc::new(super::payload::build_payload(
            config,
            user_message,
            extra_context,
        ));
        self.last_payload.store(Some(payload.clone()));
        payload
    }

    /// Check a candidate against the result contract.
    ///
    /// A raw provider response (an object with a non-empty `choices` array) is
    /// normalized first; if normalization fails the degraded result is what
    /// gets validated. Contract violations are reported and surface as a
    /// generic [`Error::Validation`].
    pub fn validate(&self, candidate: &Value) -> Result<ProcessedResult> {
        let normalized;
        let candidate = if ResultValidator::is_provider_response(candidate) {
            let raw = ProviderResponse::from_value(candidate.clone());
            normalized = match normalize(&raw) {
                Ok(n) => n.into_value(),
                Err(reason) => serde_json::to_value(self.degrade(reason, &raw, None))?,
            };
            &normalized
        } else {
            candidate
        };

        self.validator
            .check(candidate)
            .map_err(|violations| self.reject(candidate, &violations))
    }

    /// Report a normalization failure and build the stand-in result.
    pub(crate) fn degrade(
        &self,
        reason: NormalizeError,
        raw: &ProviderResponse,
        request_id: Option<&str>,
    ) -> ProcessedResult {
        let mut report = ErrorReport::from_error(ErrorStage::Normalize, &reason).with_context(
            json!({
                "response_id": raw.id,
                "model": raw.model,
            }),
        );
        if let Some(id) = request_id {
            report = report.with_request_id(id);
        }
        self.report(report);
        degraded_result(&reason, raw)
    }

    fn reject(&self, candidate: &Value, violations: &[SchemaViolation]) -> Error {
        self.report(
            ErrorReport::new(ErrorStage::Validate, VALIDATION_FAILED).with_context(json!({
                "violations": violations,
                "candidate": candidate,
            })),
        );
        Error::validation_with_context(
            VALIDATION_FAILED,
            ErrorContext::new().with_source("result_validator"),
        )
    }

    pub(crate) fn report(&self, report: ErrorReport) {
        self.reporter.report(report);
    }
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("config", &*self.config.load_full())
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
