//! Generation backend: prompt construction and the chat-completion client.

pub mod client;
pub mod prompts;

pub use client::{CompletionBackend, OpenAiClient};
pub use prompts::PromptBuilder;
