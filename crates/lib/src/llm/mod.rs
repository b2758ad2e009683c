//! LLM abstraction and Gemini client.
//!
//! Everything above this module talks to [`LlmBackend`]: ordered chat messages in, text out.

mod gemini;

use async_trait::async_trait;

pub use gemini::GeminiClient;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("llm api error: {0}")]
    Api(String),
    #[error("llm returned no text")]
    Empty,
    #[error("llm call timed out after {0}s")]
    Timeout(u64),
}

/// One chat message. Role is "system", "user", or "assistant".
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Single-turn text generation.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    /// Send the messages and return the generated text. Empty output is an error.
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError>;
}

/// Run `backend.chat` bounded by `timeout`.
pub async fn chat_with_timeout(
    backend: &dyn LlmBackend,
    messages: Vec<ChatMessage>,
    timeout: std::time::Duration,
) -> Result<String, LlmError> {
    match tokio::time::timeout(timeout, backend.chat(messages)).await {
        Ok(res) => res,
        Err(_) => Err(LlmError::Timeout(timeout.as_secs())),
    }
}
