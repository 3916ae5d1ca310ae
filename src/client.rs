//! OpenRouter chat client.
//!
//! Keep the public surface small and predictable. Implementation details are
//! split into submodules under `src/client/`.

pub mod builder;
pub mod chat;
pub mod core;
pub mod payload;

pub use builder::OpenRouterClientBuilder;
pub use chat::ChatOutcome;
pub use core::OpenRouterClient;
pub use payload::build_payload;
