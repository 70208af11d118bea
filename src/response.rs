//! JSON extraction from free-form completion text.
//!
//! Models wrap JSON in fences, prepend prose, or return nothing useful at
//! all. Extraction follows a fixed precedence:
//!
//! 1. a fenced block tagged `json` (closing fence at line start, or the
//!    single-line form);
//! 2. otherwise the span from the first `{` to the last `}`;
//! 3. anything that does not parse as a JSON object is a failure.
//!
//! [`extract_json`] never fails; [`try_extract_json`] reports why nothing
//! was extracted.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why no JSON object could be extracted.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("response is empty")]
    Empty,

    #[error("no JSON object found in response")]
    NotFound,

    #[error("invalid JSON: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Fence whose closing ``` starts a line, so backticks inside JSON string
/// values do not end the block early.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json[^\S\n]*\r?\n(.*?)\r?\n[^\S\n]*```").expect("valid fence regex")
});

/// Single-line or loosely formatted fence: ```json {...} ```
static INLINE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").expect("valid inline fence regex")
});

/// Extract a JSON object from `text`, returning an empty map on any failure.
pub fn extract_json(text: &str) -> Map<String, Value> {
    try_extract_json(text).unwrap_or_default()
}

/// Extract a JSON object from `text`.
pub fn try_extract_json(text: &str) -> Result<Map<String, Value>, ExtractError> {
    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }

    let candidate = fenced_block(text)
        .or_else(|| brace_span(text))
        .ok_or(ExtractError::NotFound)?;

    match serde_json::from_str::<Value>(candidate.trim())? {
        Value::Object(map) => Ok(map),
        other => Err(ExtractError::NotAnObject(kind_of(&other))),
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    FENCE_RE
        .captures(text)
        .or_else(|| INLINE_FENCE_RE.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// The widest `{ ... }` span: first opening brace to last closing brace.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
