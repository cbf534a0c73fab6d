/// Chat completion provider abstraction
///
/// The recommendation pipeline talks to the language model only through
/// [`ChatProvider`], so the hosted endpoint can be swapped or stubbed.
use crate::{
    error::{AppError, AppResult},
    models::{ChatMessage, Role},
};

pub mod groq;

pub use groq::GroqProvider;

/// Persona prepended when the caller supplies no system message
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert at analyzing experience categories \
and finding similar tags. You help match user preferences with relevant experience categories.";

/// Trait for chat completion providers
///
/// A single blocking request/response exchange: no streaming, no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends the messages to `model` and returns the text of the first choice
    ///
    /// Fails with [`AppError::LlmRequestFailed`] when the endpoint answers with a
    /// non-success status. Callers decide whether to fall back.
    async fn complete(&self, messages: &[ChatMessage], model: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Validates a message list and prepends the default persona if no system message exists
pub fn with_system_persona(messages: &[ChatMessage]) -> AppResult<Vec<ChatMessage>> {
    if messages.is_empty() {
        return Err(AppError::InvalidInput(
            "Chat request must contain at least one message".to_string(),
        ));
    }

    let mut full = Vec::with_capacity(messages.len() + 1);
    if !messages.iter().any(|m| m.role == Role::System) {
        full.push(ChatMessage::system(DEFAULT_SYSTEM_PROMPT));
    }
    full.extend_from_slice(messages);

    Ok(full)
}
