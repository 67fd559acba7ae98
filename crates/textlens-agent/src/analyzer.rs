//! Single-shot analysis pipeline: one provider call, then normalization

use crate::error::AgentError;
use std::sync::Arc;
use std::time::Instant;
use textlens_core::{normalize, AnalysisKind, AnalysisResult};
use textlens_llm::Provider;
use tracing::{debug, info};

/// Raw completions are logged at most this many characters long.
const RAW_LOG_CHARS: usize = 600;

#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn Provider>,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// `provider/model`, used in logs and the CLI header.
    pub fn label(&self) -> String {
        format!("{}/{}", self.provider.name(), self.provider.model())
    }

    /// Run one analysis of `text`. The text is sent as-is; only blank input
    /// is refused.
    pub async fn run(&self, text: &str, kind: AnalysisKind) -> Result<AnalysisResult, AgentError> {
        if text.trim().is_empty() {
            return Err(AgentError::EmptyInput);
        }

        let started = Instant::now();
        let raw = self.provider.analyze(text, kind).await?;
        debug!(
            "{} completion from {} ({} chars): {}",
            kind,
            self.label(),
            raw.len(),
            truncate(&raw, RAW_LOG_CHARS)
        );

        let result = normalize(kind, &raw)?;
        info!(
            "{} analysis via {}: {} entries in {}ms",
            kind,
            self.label(),
            result.len(),
            started.elapsed().as_millis()
        );
        Ok(result)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
