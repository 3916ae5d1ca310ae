//! Classification of failed provider exchanges.
//!
//! OpenRouter reports failures through the HTTP status and, usually, an error
//! body of the form `{"error": {"code": 402, "message": "..."}}`. This module
//! maps both onto a small set of error classes so callers can decide what to
//! show the user or whether an external retry makes sense.
//!
//! ```rust
//! use openrouter_chat::error_code::ErrorClass;
//!
//! let class = ErrorClass::from_http_status(429);
//! assert_eq!(class.name(), "rate_limited");
//! assert!(class.retryable());
//! ```

use std::fmt;

/// Error class of a non-success provider response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed request, invalid parameters, or missing required fields
    InvalidRequest,
    /// Invalid, expired, or missing API key
    Authentication,
    /// Account has run out of credits
    QuotaExhausted,
    /// Valid credentials but insufficient permissions (also moderation blocks)
    PermissionDenied,
    /// Requested model or endpoint does not exist
    NotFound,
    /// Input exceeds context window or payload size limit
    RequestTooLarge,
    /// Request rate limit exceeded
    RateLimited,
    /// Internal server error on provider side
    ServerError,
    /// Chosen model is down or no provider can serve the request
    Overloaded,
    /// Request timed out before a response was produced
    Timeout,
    /// Could not be classified
    Unknown,
}

impl ErrorClass {
    /// Returns the standard name (e.g., `"invalid_request"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Authentication => "authentication",
            Self::QuotaExhausted => "quota_exhausted",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::RequestTooLarge => "request_too_large",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::Overloaded => "overloaded",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }

    /// Whether repeating the same request later may succeed.
    ///
    /// The client never retries on its own; this is a hint for callers.
    #[inline]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::ServerError | Self::Overloaded | Self::Timeout
        )
    }

    /// Maps an HTTP status code to the most likely class.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Authentication,
            402 => Self::QuotaExhausted,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            408 | 504 => Self::Timeout,
            413 => Self::RequestTooLarge,
            429 => Self::RateLimited,
            502 | 503 | 529 => Self::Overloaded,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Maps a provider error code/type string (e.g. `"rate_limit_exceeded"`).
    pub fn from_provider_code(code: &str) -> Option<Self> {
        let class = match code {
            "invalid_request" | "invalid_request_error" => Self::InvalidRequest,
            "authentication" | "invalid_api_key" | "authentication_error" => Self::Authentication,
            "quota_exhausted" | "insufficient_quota" | "insufficient_credits" => {
                Self::QuotaExhausted
            }
            "permission_denied" | "permission_error" | "moderation" => Self::PermissionDenied,
            "not_found" | "model_not_found" => Self::NotFound,
            "request_too_large" | "context_length_exceeded" => Self::RequestTooLarge,
            "rate_limited" | "rate_limit_exceeded" => Self::RateLimited,
            "server_error" => Self::ServerError,
            "overloaded" | "overloaded_error" | "no_provider_available" => Self::Overloaded,
            "timeout" => Self::Timeout,
            _ => return None,
        };
        Some(class)
    }

    /// Classifies a failed response, preferring what the error body says over the status.
    ///
    /// Understands `{"error": {"code": 429}}`, `{"error": {"type": "rate_limit_exceeded"}}`
    /// and `{"error": {"code": "insufficient_quota"}}`. Anything else falls back to the status.
    pub fn classify(status: u16, body: &serde_json::Value) -> Self {
        let error = body.get("error");
        let code = error.and_then(|e| e.get("code"));

        if let Some(class) = code
            .and_then(|c| c.as_str())
            .or_else(|| error.and_then(|e| e.get("type")).and_then(|t| t.as_str()))
            .and_then(Self::from_provider_code)
        {
            return class;
        }

        let numeric = code
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok());
        match numeric.map(Self::from_http_status) {
            Some(class) if class != Self::Unknown => class,
            _ => Self::from_http_status(status),
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorClass::from_http_status(400), ErrorClass::InvalidRequest);
        assert_eq!(ErrorClass::from_http_status(402), ErrorClass::QuotaExhausted);
        assert_eq!(ErrorClass::from_http_status(429), ErrorClass::RateLimited);
        assert_eq!(ErrorClass::from_http_status(502), ErrorClass::Overloaded);
        assert_eq!(ErrorClass::from_http_status(500), ErrorClass::ServerError);
        assert_eq!(ErrorClass::from_http_status(507), ErrorClass::ServerError);
        assert_eq!(ErrorClass::from_http_status(418), ErrorClass::Unknown);
    }

    #[test]
    fn test_retryable_classes() {
        assert!(ErrorClass::RateLimited.retryable());
        assert!(ErrorClass::Timeout.retryable());
        assert!(!ErrorClass::Authentication.retryable());
        assert!(!ErrorClass::QuotaExhausted.retryable());
    }

    #[test]
    fn test_body_code_wins_over_status() {
        let body = json!({"error": {"code": 402, "message": "Insufficient credits"}});
        assert_eq!(ErrorClass::classify(400, &body), ErrorClass::QuotaExhausted);

        let body = json!({"error": {"type": "rate_limit_exceeded"}});
        assert_eq!(ErrorClass::classify(400, &body), ErrorClass::RateLimited);
    }

    #[test]
    fn test_unstructured_body_falls_back_to_status() {
        assert_eq!(
            ErrorClass::classify(429, &json!({"error": "rate limited"})),
            ErrorClass::RateLimited
        );
        assert_eq!(ErrorClass::classify(503, &json!({})), ErrorClass::Overloaded);
    }
}
