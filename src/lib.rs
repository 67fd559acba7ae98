//! textlens - LLM-backed text analysis: timelines, insights, financials, parties

pub mod format;
pub mod settings;
