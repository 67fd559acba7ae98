//! Textlens Core - Analysis types, response normalization, and error handling

pub mod config;
pub mod error;
pub mod normalize;
pub mod timestamp;
pub mod types;

pub use config::{ProviderSection, TextlensConfig};
pub use error::{AnalysisError, ConfigError, ParseError};
pub use normalize::{
    extract_json_span, normalize, normalize_financial, normalize_insights, normalize_parties,
    normalize_timeline, parse_and_validate, strip_markdown_fence, Shape,
};
pub use timestamp::{parse_timestamp, sort_by_timestamp, timestamp_millis_or_epoch, Chronological};
pub use types::*;
