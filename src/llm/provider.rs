use crate::config::LLMConfig;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest, LLMResponse};
use async_trait::async_trait;
use tracing::debug;

/// A backend that turns one chat request into one reply.
#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// The single seam through which the pipeline talks to a language model.
///
/// Returns the text of the first reply, or a typed failure. Deciding what a
/// failure means for the pipeline is left to the caller.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, model: &str, messages: &[LLMMessage]) -> AppResult<String>;
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider_name: String,
}

impl LLM {
    pub fn new(config: &LLMConfig) -> AppResult<Self> {
        if !config.has_api_key() {
            return Err(AppError::Auth(format!(
                "no API key configured for provider '{}'",
                config.provider
            )));
        }

        let adapter: Box<dyn LLMAdapter> = match config.provider.as_str() {
            "openai" | "openrouter" | "groq" => {
                let base = match &config.api_base {
                    Some(base) => base.clone(),
                    None => crate::llm::openai::default_api_base(&config.provider).to_string(),
                };
                Box::new(crate::llm::openai::OpenAIAdapter::new_with_api_base(
                    &config.api_key,
                    &base,
                    config.request_timeout,
                )?)
            }
            other => {
                return Err(AppError::Config(format!("Unsupported provider: {}", other)));
            }
        };

        Ok(Self {
            adapter,
            provider_name: config.provider.clone(),
        })
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}

#[async_trait]
impl CompletionClient for LLM {
    async fn complete(&self, model: &str, messages: &[LLMMessage]) -> AppResult<String> {
        let request = LLMRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
        };
        request.validate()?;

        let response = self.create_chat_completion(&request).await?;
        debug!(
            provider = %self.provider_name,
            model = %model,
            response_len = response.content.len(),
            finish_reason = ?response.finish_reason,
            "Completion received"
        );
        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_auth_error() {
        let config = LLMConfig::default();
        assert!(matches!(LLM::new(&config), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let config = LLMConfig {
            provider: "carrier-pigeon".to_string(),
            api_key: "sk-test".to_string(),
            ..LLMConfig::default()
        };
        assert!(matches!(LLM::new(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_compatible_providers_construct() {
        for provider in ["openai", "openrouter", "groq"] {
            let config = LLMConfig {
                provider: provider.to_string(),
                api_key: "sk-test".to_string(),
                ..LLMConfig::default()
            };
            let llm = LLM::new(&config).unwrap();
            assert_eq!(llm.provider_name(), provider);
        }
    }

    #[tokio::test]
    async fn test_complete_rejects_empty_messages_before_sending() {
        let config = LLMConfig {
            api_key: "sk-test".to_string(),
            api_base: Some("http://127.0.0.1:9".to_string()),
            ..LLMConfig::default()
        };
        let llm = LLM::new(&config).unwrap();
        let err = llm.complete("o1-preview", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }
}
