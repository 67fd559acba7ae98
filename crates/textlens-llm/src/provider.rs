//! Provider trait

use crate::mistral::MistralProvider;
use crate::openai::OpenAiProvider;
use crate::prompts;
use crate::types::{ChatMessage, ChatRequest};
use std::time::Duration;
use textlens_core::{AnalysisKind, ProviderKind};

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Provider error types. None of them is retried.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("rate limited{}", .retry_after_secs.map(|s| format!(": retry after {}s", s)).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("empty completion from {0}")]
    EmptyCompletion(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// One LLM vendor's chat-completion endpoint.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> ProviderKind;
    fn model(&self) -> &str;
    fn models(&self) -> &[&str];

    fn supports_model(&self, model: &str) -> bool {
        self.models()
            .iter()
            .any(|m| *m == model || model.starts_with(m))
    }

    /// Send one request and return the text of the first choice.
    async fn complete(&self, request: ChatRequest) -> ProviderResult<String>;

    /// Run one analysis: the kind's fixed system instruction plus the user's
    /// text, a single completion, no retries.
    async fn analyze(&self, text: &str, kind: AnalysisKind) -> ProviderResult<String> {
        let request = ChatRequest::new(
            self.model(),
            vec![
                ChatMessage::system(prompts::system_prompt(self.kind(), kind)),
                ChatMessage::user(text),
            ],
        );
        self.complete(request).await
    }
}

/// Everything needed to build an adapter, resolved by the caller.
#[derive(Clone, Debug)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout: Option<Duration>,
}

impl ProviderSettings {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            base_url: None,
            model: None,
            timeout: None,
        }
    }
}

pub fn create_provider(settings: ProviderSettings) -> ProviderResult<Box<dyn Provider>> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    let provider: Box<dyn Provider> = match settings.kind {
        ProviderKind::OpenAi => {
            let mut provider = OpenAiProvider::new(settings.api_key).with_client(client);
            if let Some(url) = settings.base_url {
                provider = provider.with_base_url(url);
            }
            if let Some(model) = settings.model {
                provider = provider.with_model(model);
            }
            Box::new(provider)
        }
        ProviderKind::Mistral => {
            let mut provider = MistralProvider::new(settings.api_key).with_client(client);
            if let Some(url) = settings.base_url {
                provider = provider.with_base_url(url);
            }
            if let Some(model) = settings.model {
                provider = provider.with_model(model);
            }
            Box::new(provider)
        }
    };
    if let Some(warning) = unknown_model_warning(provider.as_ref()) {
        tracing::warn!("{}", warning);
    }
    Ok(provider)
}

/// Unlisted models are still sent as-is; the vendor decides.
pub fn unknown_model_warning(provider: &dyn Provider) -> Option<String> {
    (!provider.supports_model(provider.model())).then(|| {
        format!(
            "{} is not a known {} model (known: {})",
            provider.model(),
            provider.name(),
            provider.models().join(", ")
        )
    })
}
