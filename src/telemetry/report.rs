//! Error report payload and the reporter trait.

use serde::{Deserialize, Serialize};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::time::{SystemTime, UNIX_EPOCH};

fn timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Where in the request lifecycle a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorStage {
    Configure,
    Transport,
    Normalize,
    Validate,
}

impl ErrorStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStage::Configure => "configure",
            ErrorStage::Transport => "transport",
            ErrorStage::Normalize => "normalize",
            ErrorStage::Validate => "validate",
        }
    }
}

/// One captured failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub stage: ErrorStage,
    pub message: String,
    /// `source()` chain below the top-level error, outermost first.
    pub source_chain: Vec<String>,
    /// Only captured when `RUST_BACKTRACE` enables it.
    pub backtrace: Option<String>,
    pub request_id: Option<String>,
    pub context: serde_json::Value,
    pub timestamp: f64,
}

impl ErrorReport {
    pub fn new(stage: ErrorStage, message: impl Into<String>) -> Self {
        let backtrace = Backtrace::capture();
        Self {
            stage,
            message: message.into(),
            source_chain: Vec::new(),
            backtrace: (backtrace.status() == BacktraceStatus::Captured)
                .then(|| backtrace.to_string()),
            request_id: None,
            context: serde_json::Value::Null,
            timestamp: timestamp(),
        }
    }

    pub fn from_error(stage: ErrorStage, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut report = Self::new(stage, error.to_string());
        let mut source = error.source();
        while let Some(e) = source {
            report.source_chain.push(e.to_string());
            source = e.source();
        }
        report
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }
}

/// Destination for error reports.
///
/// Implementations must not panic: reporting happens on failure paths that are
/// already returning an error or a degraded answer.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, report: ErrorReport);
}

/// Discards every report.
pub struct NoopErrorReporter;

impl ErrorReporter for NoopErrorReporter {
    fn report(&self, _: ErrorReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn test_source_chain_is_collected() {
        let report = ErrorReport::from_error(ErrorStage::Transport, &Outer(Inner));
        assert_eq!(report.message, "outer");
        assert_eq!(report.source_chain, vec!["inner".to_string()]);
        assert!(report.timestamp > 0.0);
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let value = serde_json::to_value(ErrorStage::Normalize).unwrap();
        assert_eq!(value, "normalize");
    }
}
