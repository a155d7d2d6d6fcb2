// Type definitions and error types

use serde::{Deserialize, Serialize};

/// Model identifier passed through to the completion endpoint (e.g. "o1-preview").
pub type ModelId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMRequest {
    pub model: ModelId,
    pub messages: Vec<LLMMessage>,
}

impl LLMRequest {
    /// Reject requests the endpoint would refuse anyway: no messages, or a
    /// message with an empty role or content.
    pub fn validate(&self) -> AppResult<()> {
        if self.messages.is_empty() {
            return Err(AppError::InvalidRequest(
                "completion request has no messages".to_string(),
            ));
        }
        for (index, message) in self.messages.iter().enumerate() {
            if message.role.trim().is_empty() {
                return Err(AppError::InvalidRequest(format!(
                    "message {} has an empty role",
                    index
                )));
            }
            if message.content.is_empty() {
                return Err(AppError::InvalidRequest(format!(
                    "message {} has empty content",
                    index
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{phase} phase failed: {reason}")]
    PhaseFailed { phase: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
