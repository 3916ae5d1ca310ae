//! # openrouter-chat
//!
//! Chat-completion client for OpenRouter-compatible endpoints that always hands
//! back a well-formed result.
//!
//! ## Overview
//!
//! The client builds a chat-completion request from a mutable configuration,
//! performs one HTTP exchange per call, and turns the untrusted provider reply
//! into a [`ProcessedResult`](types::ProcessedResult). A reply that arrived but
//! could not be shaped is not an error: it comes back as a degraded answer.
//! Failures where no answer was obtained are returned as [`Error`].
//!
//! ## Key Features
//!
//! - **Layered configuration**: explicit options over the environment over defaults,
//!   swapped atomically on [`OpenRouterClient::reconfigure`]
//! - **Graceful degradation**: [`ChatOutcome`] makes the absorbed-failure boundary explicit
//! - **Result contract**: JSON Schema validation of results and raw provider responses
//! - **Error reporting**: every failure reaches an [`ErrorReporter`](telemetry::ErrorReporter) once
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use openrouter_chat::{ChatOutcome, OpenRouterClient};
//!
//! #[tokio::main]
//! async fn main() -> openrouter_chat::Result<()> {
//!     openrouter_chat::telemetry::init_tracing();
//!
//!     let client = OpenRouterClient::builder()
//!         .api_key("sk-or-...")
//!         .model("openai/gpt-4o-mini")
//!         .system_message("You are a friendly cooking assistant.")
//!         .build()?;
//!
//!     match client.send_chat_message("Suggest a vegan dinner", None).await? {
//!         ChatOutcome::Completed(result) => println!("{}", result.message),
//!         ChatOutcome::Degraded { result, reason } => {
//!             eprintln!("degraded ({}): {}", reason, result.message)
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder, payload assembly and orchestration |
//! | [`config`] | Service configuration and option layering |
//! | [`transport`] | HTTP exchange with the provider |
//! | [`structured`] | Response normalization and result validation |
//! | [`telemetry`] | Error reporting and log setup |
//! | [`types`] | Wire and result types |
//! | [`error_code`] | Classification of failed provider exchanges |

pub mod client;
pub mod config;
pub mod error_code;
pub mod structured;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{ChatOutcome, OpenRouterClient, OpenRouterClientBuilder};
pub use config::{ModelParameters, ResponseFormat, ServiceConfiguration, ServiceOptions};
pub use types::{
    message::{Message, MessageRole},
    result::ProcessedResult,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
