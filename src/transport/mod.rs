//! HTTP transport for the chat-completion exchange.

mod http;

pub use http::{HttpTransport, TransportRequest};

use crate::error_code::ErrorClass;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer. `body` is the parsed error body, or `{}` when it was not JSON.
    #[error("{status} {status_text}. {body}")]
    Status {
        status: u16,
        status_text: String,
        body: serde_json::Value,
        class: ErrorClass,
    },

    /// 2xx answer whose body is not JSON.
    #[error("malformed response (HTTP {status}): {details}")]
    MalformedResponse { status: u16, details: String },

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. }
            | TransportError::MalformedResponse { status, .. } => Some(*status),
            TransportError::Http(e) => e.status().map(|s| s.as_u16()),
            TransportError::Other(_) => None,
        }
    }

    /// Error class of a non-success answer; network failures without a status
    /// are reported as timeouts when reqwest says so.
    pub fn class(&self) -> ErrorClass {
        match self {
            TransportError::Status { class, .. } => *class,
            TransportError::Http(e) if e.is_timeout() => ErrorClass::Timeout,
            TransportError::Http(e) => e
                .status()
                .map(|s| ErrorClass::from_http_status(s.as_u16()))
                .unwrap_or(ErrorClass::Unknown),
            _ => ErrorClass::Unknown,
        }
    }
}
