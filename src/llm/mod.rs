//! LLM orchestration
//!
//! [`engine::ChatEngine`] wraps a mistral.rs text model configured with the
//! database query tool. The model decides on its own whether (and how many
//! times) to call the tool before answering.

pub mod config;
pub mod context;
pub mod engine;
pub mod prompts;
pub mod tools;

pub use config::LlmConfig;
pub use context::{ChatHistory, ConversationMessage, MessageRole, ToolInvocation};
pub use engine::ChatEngine;

use crate::Result;

/// Chat seam used by the conversation loop.
///
/// Production code uses [`ChatEngine`]; tests script this trait. The loop
/// owns the history and passes it in; implementations append every turn
/// they produce, intermediate tool turns included.
pub trait ChatBackend {
    fn message(&mut self, user_input: &str, history: &mut ChatHistory) -> Result<String>;
}
