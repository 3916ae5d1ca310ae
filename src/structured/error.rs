//! Failure types for normalization and schema checks.

use serde::Serialize;
use std::fmt;

/// A single schema violation with location information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    /// Error message describing what went wrong
    pub message: String,
    /// JSON pointer to the offending value (e.g., "/metadata"); empty for the root
    pub path: String,
}

impl SchemaViolation {
    pub fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Why a successful provider answer could not be interpreted.
///
/// Never returned from the chat entry point; it is carried inside
/// [`ChatOutcome::Degraded`](crate::client::ChatOutcome::Degraded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("No response choices available")]
    EmptyChoices,

    #[error("Empty message content")]
    EmptyContent,
}
