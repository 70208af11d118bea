//! Markdown renderer for `ai_review.md`.
//!
//! Shows the overall severity, the summary, and the first three findings
//! and suggested tests.

use crate::models::ReviewPayload;
use crate::output::PayloadRenderer;

const TOP_N: usize = 3;

/// Markdown output renderer.
pub struct MarkdownRenderer;

impl PayloadRenderer for MarkdownRenderer {
    fn render(&self, payload: &ReviewPayload) -> String {
        let mut lines: Vec<String> = vec![
            "# AI Review Summary".to_string(),
            String::new(),
            format!("- overall_severity: **{}**", payload.overall_severity),
            String::new(),
        ];

        let summary = payload.summary.trim();
        if !summary.is_empty() {
            lines.push(summary.to_string());
            lines.push(String::new());
        }

        if !payload.findings.is_empty() {
            lines.push("## Top Findings".to_string());
            for (i, finding) in payload.findings.iter().take(TOP_N).enumerate() {
                let title = or_placeholder(&finding.title, "(no title)");
                let severity = finding
                    .severity
                    .map_or_else(|| "n/a".to_string(), |s| s.to_string());
                lines.push(format!("### {}. {title}  _({severity})_", i + 1));
                lines.push(format!("- file: `{}` lines: {}", finding.file, finding.lines));
                lines.push(format!("- details: {}", finding.details.trim()));
                if !finding.fix.trim().is_empty() {
                    lines.push(format!("- fix: {}", finding.fix.trim()));
                }
                lines.push(String::new());
            }
        }

        if !payload.tests.is_empty() {
            lines.push("## Suggested Tests".to_string());
            for test in payload.tests.iter().take(TOP_N) {
                let name = or_placeholder(&test.name, "(no name)");
                lines.push(format!("- **{name}**: {}", test.purpose));
            }
            lines.push(String::new());
        }

        format!("{}\n", lines.join("\n").trim())
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}
