//! Orchestration errors

use textlens_core::AnalysisError;
use textlens_llm::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("an analysis is already running")]
    Busy,

    #[error("no text to analyze")]
    EmptyInput,
}

impl AgentError {
    /// Whether the request never reached the provider.
    pub fn is_rejected(&self) -> bool {
        matches!(self, AgentError::Busy | AgentError::EmptyInput)
    }
}
