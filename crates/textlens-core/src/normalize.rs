//! Response normalizer - turns raw model completions into typed, sorted results
//!
//! Models wrap JSON in prose and markdown, return arrays where objects were
//! asked for, and drop fields. Recovery here is a heuristic: a few candidate
//! substrings are tried in order and the first one that parses and fits the
//! expected shape wins.
//!
//! Failure policy differs per kind. Timeline failures surface as
//! [`AnalysisError`]; insights, financial and party failures are logged and
//! replaced by an empty result.

use crate::error::{AnalysisError, ParseError};
use crate::timestamp::sort_by_timestamp;
use crate::types::{
    AnalysisKind, AnalysisResult, FinancialCategory, InsightCategory, InsightsReport, Party,
    PartyReport, TimelineEvent,
};
use serde_json::Value;
use tracing::{debug, warn};

const FENCE: &str = "```";

/// Bracketed asides tried before giving up on a completion.
const MAX_SPANS: usize = 8;

/// Remove a markdown code fence sitting at the very start and/or end of the
/// trimmed text. The opening fence may carry a `json` tag. Text without a
/// fence comes back trimmed and otherwise unchanged.
pub fn strip_markdown_fence(text: &str) -> &str {
    let mut s = text.trim();

    if let Some(rest) = s.strip_prefix(FENCE) {
        let tagged = rest
            .get(..4)
            .filter(|tag| tag.eq_ignore_ascii_case("json"))
            .map(|_| &rest[4..]);
        if let Some(body) = tagged {
            s = body;
        } else if rest.starts_with(char::is_whitespace) {
            s = rest;
        }
    }

    if let Some(body) = s.strip_suffix(FENCE) {
        s = body;
    }

    s.trim()
}

/// Pull an array literal out of surrounding commentary.
///
/// Works on the fence-stripped text. The span runs from the first `[` to its
/// matching `]`; when the brackets never balance (a truncated completion) it
/// runs from the first `[` to the last `]` instead. Without any array the
/// fence-stripped text is returned unchanged.
pub fn extract_json_span(text: &str) -> &str {
    let stripped = strip_markdown_fence(text);
    balanced_span(stripped, b'[', b']')
        .or_else(|| greedy_array_span(stripped))
        .unwrap_or(stripped)
}

/// Span from the first `open` to the bracket that closes it, skipping over
/// brackets inside JSON strings.
fn balanced_span(text: &str, open: u8, close: u8) -> Option<&str> {
    let start = text.bytes().position(|b| b == open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (byte == close).then(|| &text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Successive balanced spans: after each one, scanning resumes past its end.
/// Stops at the first unbalanced opener or after `MAX_SPANS` spans.
fn balanced_spans(text: &str, open: u8, close: u8) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut pos = 0;
    while spans.len() < MAX_SPANS {
        let Some(start) = text[pos..].bytes().position(|b| b == open).map(|i| pos + i) else {
            break;
        };
        match balanced_span(&text[start..], open, close) {
            Some(span) => {
                spans.push(span);
                pos = start + span.len();
            }
            None => break,
        }
    }
    spans
}

fn greedy_array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

/// Candidate payloads, most literal first, without duplicates.
fn candidates(raw: &str, object_shaped: bool) -> Vec<&str> {
    let stripped = strip_markdown_fence(raw);

    let mut found = balanced_spans(stripped, b'[', b']');
    found.extend(greedy_array_span(stripped));
    if object_shaped {
        found.extend(balanced_spans(stripped, b'{', b'}'));
    }

    let mut out = vec![stripped];
    for candidate in found {
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// A result shape the normalizer can validate a parsed payload against.
pub trait Shape: Sized {
    const KIND: AnalysisKind;

    /// Key of the wrapping object for `{"key": [...]}` shapes.
    const WRAPPER_KEY: Option<&'static str> = None;

    /// Check the top-level shape of `value`, coerce it if recoverable, and
    /// deserialize it.
    fn from_json(value: Value) -> Result<Self, ParseError>;
}

impl Shape for Vec<TimelineEvent> {
    const KIND: AnalysisKind = AnalysisKind::Timeline;

    fn from_json(value: Value) -> Result<Self, ParseError> {
        Ok(serde_json::from_value(expect_array(value)?)?)
    }
}

impl Shape for Vec<FinancialCategory> {
    const KIND: AnalysisKind = AnalysisKind::Financial;

    fn from_json(value: Value) -> Result<Self, ParseError> {
        Ok(serde_json::from_value(expect_array(value)?)?)
    }
}

impl Shape for InsightsReport {
    const KIND: AnalysisKind = AnalysisKind::Insights;
    const WRAPPER_KEY: Option<&'static str> = Some("insights");

    fn from_json(value: Value) -> Result<Self, ParseError> {
        let insights = serde_json::from_value(unwrap_collection(value, "insights")?)?;
        Ok(InsightsReport { insights })
    }
}

impl Shape for PartyReport {
    const KIND: AnalysisKind = AnalysisKind::Party;
    const WRAPPER_KEY: Option<&'static str> = Some("parties");

    fn from_json(value: Value) -> Result<Self, ParseError> {
        let parties = serde_json::from_value(unwrap_collection(value, "parties")?)?;
        Ok(PartyReport { parties })
    }
}

fn expect_array(value: Value) -> Result<Value, ParseError> {
    match value {
        Value::Array(_) => Ok(value),
        other => Err(ParseError::shape_mismatch("an array", json_type(&other))),
    }
}

/// The collection inside `{"key": [...]}`. A bare array is taken as the
/// collection itself, as if it had been wrapped.
fn unwrap_collection(value: Value, key: &'static str) -> Result<Value, ParseError> {
    match value {
        Value::Array(_) => Ok(value),
        Value::Object(mut map) => match map.remove(key) {
            Some(inner @ Value::Array(_)) => Ok(inner),
            Some(other) => Err(ParseError::shape_mismatch(
                "an array under the wrapper key",
                json_type(&other),
            )),
            None => Err(ParseError::shape_mismatch(
                "an object with the wrapper key",
                "an object without it",
            )),
        },
        other => Err(ParseError::shape_mismatch(
            "an object or an array",
            json_type(&other),
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strict parse of already-cleaned text, then shape validation and coercion.
pub fn parse_and_validate<T: Shape>(text: &str) -> Result<T, ParseError> {
    let value: Value = serde_json::from_str(text)?;
    T::from_json(value)
}

/// Try every candidate payload of `raw` until one validates.
///
/// On total failure the first shape mismatch is reported if any candidate
/// parsed at all, otherwise the first JSON error.
fn recover<T: Shape>(raw: &str) -> Result<T, ParseError> {
    let mut failure: Option<ParseError> = None;

    for (index, candidate) in candidates(raw, T::WRAPPER_KEY.is_some())
        .into_iter()
        .enumerate()
    {
        match parse_and_validate::<T>(candidate) {
            Ok(parsed) => {
                if index > 0 {
                    debug!("{}: recovered payload from candidate {}", T::KIND, index);
                }
                return Ok(parsed);
            }
            Err(e) => {
                debug!("{}: candidate {} rejected: {}", T::KIND, index, e);
                let replace = match &failure {
                    None => true,
                    Some(prev) => !prev.is_shape_mismatch() && e.is_shape_mismatch(),
                };
                if replace {
                    failure = Some(e);
                }
            }
        }
    }

    // `candidates` always yields the stripped text, so a failure is recorded.
    Err(failure.unwrap_or_else(|| ParseError::shape_mismatch("a JSON payload", "nothing")))
}

/// Recovered value, or the shape's empty default when nothing was usable.
fn or_empty<T: Shape + Default>(result: Result<T, ParseError>) -> T {
    result.unwrap_or_else(|e| {
        warn!("{} response unusable, showing an empty result: {}", T::KIND, e);
        T::default()
    })
}

/// Timeline events in the order the model emitted them.
pub fn normalize_timeline(raw: &str) -> Result<Vec<TimelineEvent>, AnalysisError> {
    recover::<Vec<TimelineEvent>>(raw)
        .map_err(|e| AnalysisError::from_parse(AnalysisKind::Timeline, e))
}

/// Insight categories sorted by timestamp. Never fails.
pub fn normalize_insights(raw: &str) -> Vec<InsightCategory> {
    let mut insights = or_empty(recover::<InsightsReport>(raw)).insights;
    sort_by_timestamp(&mut insights);
    insights
}

/// Financial categories in emitted order, items sorted by timestamp within
/// each category. Never fails.
pub fn normalize_financial(raw: &str) -> Vec<FinancialCategory> {
    let mut categories = or_empty(recover::<Vec<FinancialCategory>>(raw));
    for category in &mut categories {
        sort_by_timestamp(&mut category.items);
    }
    categories
}

/// Parties sorted by timestamp. Never fails.
pub fn normalize_parties(raw: &str) -> Vec<Party> {
    let mut parties = or_empty(recover::<PartyReport>(raw)).parties;
    sort_by_timestamp(&mut parties);
    parties
}

/// Normalize a completion for `kind`. Only the timeline kind can fail.
pub fn normalize(kind: AnalysisKind, raw: &str) -> Result<AnalysisResult, AnalysisError> {
    Ok(match kind {
        AnalysisKind::Timeline => AnalysisResult::Timeline(normalize_timeline(raw)?),
        AnalysisKind::Insights => AnalysisResult::Insights(normalize_insights(raw)),
        AnalysisKind::Financial => AnalysisResult::Financial(normalize_financial(raw)),
        AnalysisKind::Party => AnalysisResult::Parties(normalize_parties(raw)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_span_ignores_brackets_in_strings() {
        let text = r#"note: [{"title":"a ] b","x":[1]}] trailing ]"#;
        assert_eq!(
            balanced_span(text, b'[', b']'),
            Some(r#"[{"title":"a ] b","x":[1]}]"#)
        );
    }

    #[test]
    fn balanced_span_handles_escaped_quotes() {
        let text = r#"[{"t":"say \"hi\" ]"}]"#;
        assert_eq!(balanced_span(text, b'[', b']'), Some(text));
    }

    #[test]
    fn balanced_span_unclosed_is_none() {
        assert_eq!(balanced_span(r#"[{"a":1}"#, b'[', b']'), None);
    }

    #[test]
    fn greedy_span_runs_to_last_bracket() {
        assert_eq!(greedy_array_span("x [1] y [2] z"), Some("[1] y [2]"));
        assert_eq!(greedy_array_span("] before ["), None);
    }

    #[test]
    fn balanced_spans_continue_past_earlier_asides() {
        let text = r#"Events [see note] and [1, [2]]: [{"a":"]"}] [open"#;
        assert_eq!(
            balanced_spans(text, b'[', b']'),
            vec!["[see note]", "[1, [2]]", r#"[{"a":"]"}]"#]
        );
    }

    #[test]
    fn balanced_spans_are_capped() {
        let text = "[] ".repeat(MAX_SPANS + 3);
        assert_eq!(balanced_spans(&text, b'[', b']').len(), MAX_SPANS);
    }

    #[test]
    fn recover_reports_shape_mismatch_over_earlier_json_error() {
        // The fence-stripped text is prose (a JSON error); the object span
        // parses but holds a number under the wrapper key.
        let err = recover::<InsightsReport>(r#"Here: {"insights": 3}"#).unwrap_err();
        assert!(err.is_shape_mismatch());
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn recover_reports_first_json_error_when_nothing_parses() {
        let err = recover::<Vec<TimelineEvent>>("Sorry, [oops] nothing").unwrap_err();
        assert!(!err.is_shape_mismatch());
        assert!(err.to_string().contains("line 1 column 1"));
    }

    #[test]
    fn candidates_are_deduplicated() {
        let c = candidates("[1,2]", false);
        assert_eq!(c, vec!["[1,2]"]);
    }

    #[test]
    fn candidates_include_object_span_for_wrapped_shapes() {
        let raw = r#"Result: {"parties": []} done"#;
        let c = candidates(raw, true);
        assert!(c.contains(&r#"{"parties": []}"#));
        let c = candidates(raw, false);
        assert!(!c.contains(&r#"{"parties": []}"#));
    }
}
