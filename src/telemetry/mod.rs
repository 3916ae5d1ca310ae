//! Error reporting and log setup.
//!
//! Every failure path of the client produces exactly one [`ErrorReport`],
//! delivered to the configured [`ErrorReporter`].
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ErrorReporter`] | Trait for report destinations |
//! | [`TracingErrorReporter`] | Default; emits a `tracing` error event |
//! | [`InMemoryErrorReporter`] | Bounded in-memory sink for tests |
//! | [`NoopErrorReporter`] | Discards reports |
//! | [`CompositeErrorReporter`] | Fans out to several reporters |

mod report;

pub use report::{ErrorReport, ErrorReporter, ErrorStage, NoopErrorReporter};

use std::sync::{Arc, RwLock};
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Emits each report as a `tracing` error event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, report: ErrorReport) {
        tracing::error!(
            stage = report.stage.as_str(),
            request_id = report.request_id.as_deref().unwrap_or("-"),
            sources = ?report.source_chain,
            context = %report.context,
            timestamp = report.timestamp,
            backtrace = report.backtrace.as_deref().unwrap_or(""),
            "OpenRouter service error: {}",
            report.message
        );
    }
}

/// In-memory reporter for testing.
pub struct InMemoryErrorReporter {
    reports: Arc<RwLock<Vec<ErrorReport>>>,
    max_reports: usize,
}

impl InMemoryErrorReporter {
    pub fn new(max: usize) -> Self {
        Self {
            reports: Arc::new(RwLock::new(Vec::new())),
            max_reports: max.max(1),
        }
    }

    pub fn reports(&self) -> Vec<ErrorReport> {
        self.reports
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn reports_by_stage(&self, stage: ErrorStage) -> Vec<ErrorReport> {
        self.reports()
            .into_iter()
            .filter(|r| r.stage == stage)
            .collect()
    }

    pub fn clear(&self) {
        self.reports
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.reports.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryErrorReporter {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ErrorReporter for InMemoryErrorReporter {
    fn report(&self, report: ErrorReport) {
        let mut reports = self.reports.write().unwrap_or_else(|e| e.into_inner());
        reports.push(report);
        if reports.len() > self.max_reports {
            reports.remove(0);
        }
    }
}

/// Delivers each report to every inner reporter.
#[derive(Default)]
pub struct CompositeErrorReporter {
    reporters: Vec<Arc<dyn ErrorReporter>>,
}

impl CompositeErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }
}

impl ErrorReporter for CompositeErrorReporter {
    fn report(&self, report: ErrorReport) {
        for r in &self.reporters {
            r.report(report.clone());
        }
    }
}
