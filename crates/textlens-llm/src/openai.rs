//! OpenAI chat-completions provider

use crate::chat::ChatCompletionsClient;
use crate::provider::{Provider, ProviderResult};
use crate::types::ChatRequest;
use reqwest::Client;
use textlens_core::ProviderKind;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

pub struct OpenAiProvider {
    chat: ChatCompletionsClient,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            chat: ChatCompletionsClient::new("openai", api_key.into(), OPENAI_API_URL),
            model: OPENAI_DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.chat.set_base_url(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Use a preconfigured HTTP client, e.g. one with a timeout.
    pub fn with_client(mut self, client: Client) -> Self {
        self.chat.set_client(client);
        self
    }

    pub fn endpoint(&self) -> String {
        self.chat.endpoint()
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn models(&self) -> &[&str] {
        &["gpt-4o", "gpt-4o-mini", "gpt-4.1", "gpt-4-turbo", "o1", "o3"]
    }

    async fn complete(&self, request: ChatRequest) -> ProviderResult<String> {
        self.chat.send(&request).await
    }
}
