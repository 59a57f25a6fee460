pub mod client;
pub mod prompts;

pub use client::{ChatMessage, OpenAiChatClient, Role, TextGenerator};
