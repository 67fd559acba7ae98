//! Textlens Agent - analysis pipeline and per-session result cache

pub mod analyzer;
pub mod error;
pub mod session;

pub use analyzer::Analyzer;
pub use error::AgentError;
pub use session::AnalysisSession;
