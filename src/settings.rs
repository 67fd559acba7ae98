//! Resolves which provider to call from the config file, environment, and flags

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use textlens_core::{AnalysisKind, ConfigError, ProviderKind, TextlensConfig};
use textlens_llm::ProviderSettings;

/// Command-line overrides; anything set here beats env and file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
}

pub fn resolve_settings(
    config: &TextlensConfig,
    overrides: &Overrides,
) -> Result<ProviderSettings, ConfigError> {
    resolve_settings_with(config, overrides, |name| std::env::var(name).ok())
}

pub fn resolve_settings_with(
    config: &TextlensConfig,
    overrides: &Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ProviderSettings, ConfigError> {
    let kind = match overrides.provider {
        Some(kind) => kind,
        None => config.default_provider_with(&env)?,
    };

    let mut settings = ProviderSettings::new(kind, config.api_key_with(kind, &env)?);
    settings.base_url = config.base_url(kind).map(String::from);
    settings.model = overrides
        .model
        .clone()
        .or_else(|| config.model(kind).map(String::from));
    settings.timeout = config
        .request_timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);
    Ok(settings)
}

/// `--kind`: one analysis, or all four in a fixed order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindSelection {
    One(AnalysisKind),
    All,
}

impl KindSelection {
    pub fn kinds(&self) -> Vec<AnalysisKind> {
        match self {
            KindSelection::One(kind) => vec![*kind],
            KindSelection::All => AnalysisKind::ALL.to_vec(),
        }
    }
}

impl FromStr for KindSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(KindSelection::All);
        }
        s.parse().map(KindSelection::One)
    }
}

impl fmt::Display for KindSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindSelection::One(kind) => write!(f, "{}", kind),
            KindSelection::All => f.write_str("all"),
        }
    }
}
