//! Textlens config - serde structs for ~/.textlens/config.json
//!
//! Pure types and resolution only. The binary decides which file to load and
//! applies command-line overrides on top.

use crate::error::ConfigError;
use crate::types::ProviderKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextlensConfig {
    /// Default provider name, `openai` or `mistral`.
    pub provider: Option<String>,
    pub openai: ProviderSection,
    pub mistral: ProviderSection,
    #[serde(rename = "requestTimeoutSecs")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    #[serde(rename = "baseUrl")]
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl TextlensConfig {
    /// Load from a specific path. A missing file is the default config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(content)
    }

    /// Discover from ~/.textlens/config.json.
    pub fn discover() -> Result<Self, ConfigError> {
        Self::load(&Self::default_path())
    }

    /// Default path: ~/.textlens/config.json
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".textlens").join("config.json")
    }

    pub fn section(&self, provider: ProviderKind) -> &ProviderSection {
        match provider {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Mistral => &self.mistral,
        }
    }

    /// Provider to use when none is given on the command line:
    /// `TEXTLENS_PROVIDER`, then the file, then OpenAI.
    pub fn default_provider(&self) -> Result<ProviderKind, ConfigError> {
        self.default_provider_with(|name| std::env::var(name).ok())
    }

    pub fn default_provider_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ProviderKind, ConfigError> {
        match env("TEXTLENS_PROVIDER").or_else(|| self.provider.clone()) {
            Some(name) => name
                .parse()
                .map_err(|_| ConfigError::invalid_value("provider", name)),
            None => Ok(ProviderKind::default()),
        }
    }

    /// API key for `provider`: a non-blank value of the vendor's environment
    /// variable wins over the file.
    pub fn api_key(&self, provider: ProviderKind) -> Result<String, ConfigError> {
        self.api_key_with(provider, |name| std::env::var(name).ok())
    }

    pub fn api_key_with(
        &self,
        provider: ProviderKind,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        let usable = |key: String| {
            let key = key.trim().to_string();
            (!key.is_empty()).then_some(key)
        };
        env(provider.api_key_env())
            .and_then(usable)
            .or_else(|| self.section(provider).api_key.clone().and_then(usable))
            .ok_or(ConfigError::MissingApiKey {
                provider,
                env_var: provider.api_key_env(),
            })
    }

    pub fn base_url(&self, provider: ProviderKind) -> Option<&str> {
        self.section(provider).base_url.as_deref()
    }

    pub fn model(&self, provider: ProviderKind) -> Option<&str> {
        self.section(provider).model.as_deref()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
