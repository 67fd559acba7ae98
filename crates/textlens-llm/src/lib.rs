//! Textlens LLM - Provider adapters for the chat-completion vendors

mod chat;
pub mod mistral;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod types;

pub use mistral::MistralProvider;
pub use openai::OpenAiProvider;
pub use prompts::system_prompt;
pub use provider::{create_provider, unknown_model_warning, Provider, ProviderError, ProviderResult, ProviderSettings};
pub use textlens_core::{AnalysisKind, ProviderKind};
pub use types::*;
