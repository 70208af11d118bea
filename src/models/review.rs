//! The merged review payload written to the report files.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::finding::{lenient_string, Finding, Severity};

/// Maximum length (in characters) of the Slack-ready summary.
pub const SLACK_SUMMARY_MAX_CHARS: usize = 200;

const DEFAULT_SUMMARY: &str = "AI review completed; see the findings for details.";
const DEFAULT_SLACK_SUMMARY: &str = "AI review completed. See the pull request for details.";

/// A regression test suggested by the test-designer stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCase {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub purpose: String,
    /// Minimal test code.
    #[serde(deserialize_with = "lenient_string")]
    pub example: String,
}

/// Canonical review result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPayload {
    pub summary: String,
    pub overall_severity: Severity,
    pub findings: Vec<Finding>,
    pub tests: Vec<TestCase>,
    pub ci_notes: Vec<String>,
    pub slack_summary: String,
}

impl ReviewPayload {
    /// Payload for a run with nothing to review.
    pub fn no_changes(note: impl Into<String>) -> Self {
        Self {
            summary: "No diff was found, so there was nothing to review.".to_string(),
            overall_severity: Severity::Nit,
            findings: Vec::new(),
            tests: Vec::new(),
            ci_notes: vec![note.into()],
            slack_summary: "No changes: nothing to review.".to_string(),
        }
    }

    /// Payload substituted when the pipeline failed.
    pub fn fallback(kind: &str, detail: impl Into<String>) -> Self {
        Self {
            summary: format!("AI review failed with {kind}."),
            overall_severity: Severity::Minor,
            findings: Vec::new(),
            tests: Vec::new(),
            ci_notes: vec![kind.to_string(), detail.into()],
            slack_summary: "AI review failed; check the CI log for details.".to_string(),
        }
    }

    /// Merge the parsed reviewer and test-designer outputs, applying
    /// defaults for anything missing or malformed.
    pub fn merge(reviewer: &Map<String, Value>, tests: &Map<String, Value>) -> Self {
        let summary = non_empty_str(reviewer, "summary").unwrap_or(DEFAULT_SUMMARY);
        let overall_severity = reviewer
            .get("overall_severity")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(Severity::Minor);
        let slack = non_empty_str(tests, "slack_summary").unwrap_or(DEFAULT_SLACK_SUMMARY);

        Self {
            summary: summary.trim().to_string(),
            overall_severity,
            findings: objects(reviewer, "findings"),
            tests: objects(tests, "tests"),
            ci_notes: strings(tests, "ci_notes"),
            slack_summary: truncate_chars(slack.trim(), SLACK_SUMMARY_MAX_CHARS),
        }
    }
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Deserialize each object element of `map[key]`, skipping anything else.
fn objects<T: serde::de::DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Vec<T> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn strings(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn merge_with_empty_maps_uses_defaults() {
        let payload = ReviewPayload::merge(&Map::new(), &Map::new());
        assert_eq!(payload.overall_severity, Severity::Minor);
        assert_eq!(payload.summary, DEFAULT_SUMMARY);
        assert_eq!(payload.slack_summary, DEFAULT_SLACK_SUMMARY);
        assert!(payload.findings.is_empty());
        assert!(payload.tests.is_empty());
        assert!(payload.ci_notes.is_empty());
    }

    #[test]
    fn merge_reads_reviewer_and_tests() {
        let reviewer = as_map(json!({
            "summary": "One bug.",
            "overall_severity": "major",
            "findings": [
                {"file": "a.ts", "lines": "1-2", "title": "Bug", "severity": "major",
                 "details": "d", "fix": "f"},
                "not an object"
            ]
        }));
        let tests = as_map(json!({
            "tests": [{"name": "t1", "purpose": "p", "example": "it()"}],
            "ci_notes": ["note", 5],
            "slack_summary": "Short."
        }));

        let payload = ReviewPayload::merge(&reviewer, &tests);
        assert_eq!(payload.summary, "One bug.");
        assert_eq!(payload.overall_severity, Severity::Major);
        assert_eq!(payload.findings.len(), 1);
        assert_eq!(payload.tests[0].name, "t1");
        assert_eq!(payload.ci_notes, vec!["note".to_string()]);
        assert_eq!(payload.slack_summary, "Short.");
    }

    #[test]
    fn invalid_overall_severity_defaults_to_minor() {
        let reviewer = as_map(json!({"overall_severity": "catastrophic"}));
        let payload = ReviewPayload::merge(&reviewer, &Map::new());
        assert_eq!(payload.overall_severity, Severity::Minor);
    }

    #[test]
    fn slack_summary_is_capped() {
        let long = "x".repeat(500);
        let tests = as_map(json!({"slack_summary": long}));
        let payload = ReviewPayload::merge(&Map::new(), &tests);
        assert_eq!(payload.slack_summary.chars().count(), SLACK_SUMMARY_MAX_CHARS);
    }

    #[test]
    fn no_changes_payload_is_nit_and_empty() {
        let payload = ReviewPayload::no_changes("skipped");
        assert_eq!(payload.overall_severity, Severity::Nit);
        assert!(payload.findings.is_empty());
        assert!(payload.tests.is_empty());
        assert_eq!(payload.ci_notes, vec!["skipped".to_string()]);
    }

    #[test]
    fn fallback_payload_records_kind() {
        let payload = ReviewPayload::fallback("CompletionFailed", "boom");
        assert_eq!(payload.overall_severity, Severity::Minor);
        assert_eq!(payload.ci_notes[0], "CompletionFailed");
        assert!(payload.summary.contains("CompletionFailed"));
    }

    #[test]
    fn payload_serializes_expected_fields() {
        let value = serde_json::to_value(ReviewPayload::no_changes("n")).unwrap();
        for key in ["summary", "overall_severity", "findings", "tests", "ci_notes", "slack_summary"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["overall_severity"], "nit");
    }
}
