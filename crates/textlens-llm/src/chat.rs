//! OpenAI-compatible `/chat/completions` transport shared by both vendors

use crate::provider::{ProviderError, ProviderResult};
use crate::types::{ChatRequest, ChatResponse};
use reqwest::{Client, StatusCode};
use tracing::{debug, error};

pub(crate) struct ChatCompletionsClient {
    client: Client,
    api_key: String,
    base_url: String,
    vendor: &'static str,
}

impl ChatCompletionsClient {
    pub(crate) fn new(vendor: &'static str, api_key: String, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.to_string(),
            vendor,
        }
    }

    pub(crate) fn set_base_url(&mut self, url: String) {
        self.base_url = url;
    }

    pub(crate) fn set_client(&mut self, client: Client) {
        self.client = client;
    }

    pub(crate) fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub(crate) async fn send(&self, request: &ChatRequest) -> ProviderResult<String> {
        debug!(
            "{} request: model={} messages={}",
            self.vendor,
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();
            error!("{} error {}: {}", self.vendor, status, error_text);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ProviderError::AuthFailed(error_text)
                }
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { retry_after_secs },
                _ => ProviderError::RequestFailed(format!("{}: {}", status, error_text)),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::InvalidResponse(format!("{} returned unreadable JSON: {}", self.vendor, e))
        })?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "{} usage: prompt={} completion={}",
                self.vendor, usage.prompt_tokens, usage.completion_tokens
            );
        }

        let content = parsed.first_content().ok_or_else(|| {
            ProviderError::InvalidResponse(format!(
                "{} response has no choices[0].message.content",
                self.vendor
            ))
        })?;

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion(self.vendor.to_string()));
        }

        Ok(content)
    }
}
