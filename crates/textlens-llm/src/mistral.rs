//! Mistral chat-completions provider

use crate::chat::ChatCompletionsClient;
use crate::provider::{Provider, ProviderResult};
use crate::types::ChatRequest;
use reqwest::Client;
use textlens_core::ProviderKind;

const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1";
const MISTRAL_DEFAULT_MODEL: &str = "mistral-large-latest";

pub struct MistralProvider {
    chat: ChatCompletionsClient,
    model: String,
}

impl MistralProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            chat: ChatCompletionsClient::new("mistral", api_key.into(), MISTRAL_API_URL),
            model: MISTRAL_DEFAULT_MODEL.to_string(),
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

    pub fn with_client(mut self, client: Client) -> Self {
        self.chat.set_client(client);
        self
    }

    pub fn endpoint(&self) -> String {
        self.chat.endpoint()
    }
}

#[async_trait::async_trait]
impl Provider for MistralProvider {
    fn name(&self) -> &str {
        "mistral"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Mistral
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn models(&self) -> &[&str] {
        &[
            "mistral-large-latest",
            "mistral-medium-latest",
            "mistral-small-latest",
            "open-mistral-nemo",
        ]
    }

    async fn complete(&self, request: ChatRequest) -> ProviderResult<String> {
        self.chat.send(&request).await
    }
}
