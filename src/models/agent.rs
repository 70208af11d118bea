//! Output contract of dispatcher-invoked handlers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A file produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: String,
    /// Kind of artifact: `patch`, `note` or `schema`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Result returned by every dispatcher handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    pub ok: bool,
    pub summary: String,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub next_actions: Vec<Map<String, Value>>,
}

impl AgentResult {
    /// A successful result with no artifacts.
    pub fn ok(summary: impl Into<String>) -> Self {
        Self {
            ok: true,
            summary: summary.into(),
            artifacts: Vec::new(),
            next_actions: Vec::new(),
        }
    }

    /// A failed result with no artifacts.
    pub fn failed(summary: impl Into<String>) -> Self {
        Self {
            ok: false,
            ..Self::ok(summary)
        }
    }
}
