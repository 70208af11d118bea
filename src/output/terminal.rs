//! Terminal renderer: a short colored summary for CI logs.

use colored::Colorize;

use crate::models::{ReviewPayload, Severity};
use crate::output::PayloadRenderer;

/// Terminal summary renderer.
pub struct TerminalRenderer;

impl PayloadRenderer for TerminalRenderer {
    fn render(&self, payload: &ReviewPayload) -> String {
        let severity = payload.overall_severity.to_string();
        let severity = match payload.overall_severity {
            Severity::Blocker => severity.red().bold(),
            Severity::Major => severity.yellow().bold(),
            Severity::Minor => severity.blue().bold(),
            Severity::Nit => severity.green(),
        };

        let mut output = String::new();
        output.push_str(&format!("{}\n", "=== AI REVIEW SUMMARY ===".bold()));
        output.push_str(&format!("overall_severity: {severity}\n"));
        output.push_str(&format!("{}\n", payload.summary));
        if !payload.findings.is_empty() {
            output.push_str(&format!(
                "{} {}, {} {}\n",
                payload.findings.len().to_string().bold(),
                if payload.findings.len() == 1 { "finding" } else { "findings" },
                payload.tests.len().to_string().bold(),
                if payload.tests.len() == 1 { "suggested test" } else { "suggested tests" },
            ));
        }
        output.push_str(&format!("{}\n", "=========================".dimmed()));
        output
    }
}
