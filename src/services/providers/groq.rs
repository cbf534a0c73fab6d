/// Groq chat completion provider
///
/// Speaks the OpenAI-compatible `/chat/completions` protocol, so any endpoint
/// implementing it can be targeted through `LLM_API_URL`.
use crate::{
    error::{AppError, AppResult},
    models::{chat::ChatCompletionRequest, chat::ChatCompletionResponse, ChatMessage},
    services::providers::{with_system_persona, ChatProvider},
};
use reqwest::Client as HttpClient;

const COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Clone)]
pub struct GroqProvider {
    http_client: HttpClient,
    api_key: String,
    url: String,
}

impl GroqProvider {
    pub fn new(api_key: String, api_url: &str) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            url: format!("{}{}", api_url.trim_end_matches('/'), COMPLETIONS_PATH),
        }
    }
}

#[async_trait::async_trait]
impl ChatProvider for GroqProvider {
    async fn complete(&self, messages: &[ChatMessage], model: &str) -> AppResult<String> {
        let messages = with_system_persona(messages)?;
        let request = ChatCompletionRequest {
            model,
            messages: &messages,
        };

        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, provider = self.name(), "Chat completion rejected");
            return Err(AppError::LlmRequestFailed { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AppError::ExternalApi("Chat completion returned no choices".to_string())
            })?;

        tracing::debug!(
            model = %model,
            provider = self.name(),
            reply_len = content.len(),
            "Chat completion received"
        );

        Ok(content)
    }

    fn name(&self) -> &'static str {
        "groq"
    }
}
