//! JSON output renderer.
//!
//! Writes the payload as pretty-printed JSON, non-ASCII left as is.

use crate::models::ReviewPayload;
use crate::output::PayloadRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl PayloadRenderer for JsonRenderer {
    fn render(&self, payload: &ReviewPayload) -> String {
        serde_json::to_string_pretty(payload).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Finding, Severity};

    #[test]
    fn render_json() {
        let mut payload = ReviewPayload::no_changes("skipped");
        payload.overall_severity = Severity::Major;
        payload.findings.push(Finding {
            file: "src/a.ts".into(),
            title: "Unchecked input".into(),
            severity: Some(Severity::Major),
            ..Finding::default()
        });

        let parsed: serde_json::Value = serde_json::from_str(&JsonRenderer.render(&payload)).unwrap();
        assert_eq!(parsed["overall_severity"], "major");
        assert_eq!(parsed["findings"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["findings"][0]["file"], "src/a.ts");
        assert_eq!(parsed["ci_notes"][0], "skipped");
    }

    #[test]
    fn unicode_is_not_escaped() {
        let mut payload = ReviewPayload::no_changes("n");
        payload.summary = "問題なし".into();
        assert!(JsonRenderer.render(&payload).contains("問題なし"));
    }
}
