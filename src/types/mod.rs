//! # Types Module
//!
//! Wire and result types shared by the client, transport and normalizer.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and text content |
//! | [`MessageRole`] | Message role (system, user) |
//! | [`ProviderResponse`] | Untrusted chat-completion response from the provider |
//! | [`ProcessedResult`] | Normalized result handed back to callers |
//!
//! ## Example
//!
//! ```rust
//! use openrouter_chat::types::{Message, MessageRole, ProcessedResult};
//!
//! let system = Message::system("You are a helpful assistant");
//! assert_eq!(system.role, MessageRole::System);
//!
//! let result = ProcessedResult::new("Here is a recipe.");
//! assert!(result.metadata.is_none());
//! ```

pub mod message;
pub mod response;
pub mod result;

pub use message::{Message, MessageRole};
pub use response::{Choice, ChoiceMessage, ProviderResponse, Usage};
pub use result::ProcessedResult;
