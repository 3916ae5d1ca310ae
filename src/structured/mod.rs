//! Structured output handling.
//!
//! - [`normalize`]: interpret the first choice of a provider response
//! - [`ResultValidator`]: check a candidate against the result contract
//! - [`SchemaGenerator`]: build JSON schemas for response formats
//!
//! # Examples
//!
//! ```
//! use openrouter_chat::structured::{normalize, Normalized, ResultValidator};
//! use openrouter_chat::types::ProviderResponse;
//! use serde_json::json;
//!
//! let raw = ProviderResponse::from_value(json!({
//!     "model": "openai/gpt-4o-mini",
//!     "choices": [{"message": {"role": "assistant", "content": "{\"message\": \"hi\"}"}}]
//! }));
//!
//! let normalized = normalize(&raw).unwrap();
//! assert!(normalized.is_structured());
//!
//! let result = ResultValidator::new().unwrap().check(&normalized.into_value()).unwrap();
//! assert_eq!(result.message, "hi");
//! ```

pub mod error;
pub mod normalize;
pub mod schema;
pub mod validator;

pub use error::{NormalizeError, SchemaViolation};
pub use normalize::{degraded_result, normalize, plain_text, Normalized, DEGRADED_MESSAGE};
pub use schema::{json_schema_from_type, result_contract_schema, SchemaGenerator};
pub use validator::ResultValidator;
