//! Error types for Textlens

use crate::types::{AnalysisKind, ProviderKind};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a completion into the expected shape.
///
/// Internal to the normalizer: the insights, financial and party paths
/// swallow it and degrade to an empty result, the timeline path converts it
/// into an [`AnalysisError`].
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected}, found {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl ParseError {
    pub fn shape_mismatch(expected: &'static str, found: &'static str) -> Self {
        Self::ShapeMismatch { expected, found }
    }

    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch { .. })
    }
}

/// Typed failure of the timeline path, meant to be shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("could not read the {kind} analysis: {message}")]
    InvalidJson { kind: AnalysisKind, message: String },

    #[error("the {kind} analysis must be a JSON array, got {found}")]
    NotAnArray {
        kind: AnalysisKind,
        found: &'static str,
    },
}

impl AnalysisError {
    pub fn from_parse(kind: AnalysisKind, err: ParseError) -> Self {
        match err {
            ParseError::Json(e) => Self::InvalidJson {
                kind,
                message: e.to_string(),
            },
            ParseError::ShapeMismatch { found, .. } => Self::NotAnArray { kind, found },
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::InvalidJson { kind, .. } | Self::NotAnArray { kind, .. } => *kind,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing API key for {provider}: set {env_var} or add apiKey to the config file")]
    MissingApiKey {
        provider: ProviderKind,
        env_var: &'static str,
    },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl ConfigError {
    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}
