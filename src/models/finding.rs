//! Finding types representing review results.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Severity of a finding or of a whole review, ordered by urgency.
///
/// `Nit < Minor < Major < Blocker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic remark.
    Nit,
    /// Worth fixing, not urgent.
    Minor,
    /// Should be fixed before merging.
    Major,
    /// Must be fixed before merging.
    Blocker,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Nit => write!(f, "nit"),
            Severity::Minor => write!(f, "minor"),
            Severity::Major => write!(f, "major"),
            Severity::Blocker => write!(f, "blocker"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nit" => Ok(Severity::Nit),
            "minor" => Ok(Severity::Minor),
            "major" => Ok(Severity::Major),
            "blocker" => Ok(Severity::Blocker),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// A single observation produced by the reviewer stage.
///
/// Model output is loosely shaped, so every field is read leniently:
/// scalars are stringified, missing fields become empty, and a severity
/// outside the four known values is dropped rather than failing the
/// whole finding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Finding {
    #[serde(deserialize_with = "lenient_string")]
    pub file: String,
    /// Line range, usually `start-end`.
    #[serde(deserialize_with = "lenient_string")]
    pub lines: String,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(deserialize_with = "lenient_severity", skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(deserialize_with = "lenient_string")]
    pub details: String,
    #[serde(deserialize_with = "lenient_string")]
    pub fix: String,
    /// Suggested patch in unified diff form.
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

/// Accept any JSON scalar as a string; `null` and containers become empty.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value).unwrap_or_default())
}

pub(crate) fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&value).filter(|s| !s.is_empty()))
}

fn lenient_severity<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(|s| s.parse().ok()))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Nit < Severity::Minor);
        assert!(Severity::Minor < Severity::Major);
        assert!(Severity::Major < Severity::Blocker);
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Nit.to_string(), "nit");
        assert_eq!(Severity::Blocker.to_string(), "blocker");
    }

    #[test]
    fn severity_from_str() {
        assert_eq!("major".parse::<Severity>(), Ok(Severity::Major));
        assert_eq!(" Blocker ".parse::<Severity>(), Ok(Severity::Blocker));
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn finding_reads_full_object() {
        let finding: Finding = serde_json::from_value(json!({
            "file": "src/app.ts",
            "lines": "10-12",
            "title": "Unchecked null",
            "severity": "major",
            "details": "value may be null",
            "fix": "guard it",
            "patch": "diff --git a/src/app.ts b/src/app.ts\n"
        }))
        .unwrap();
        assert_eq!(finding.file, "src/app.ts");
        assert_eq!(finding.severity, Some(Severity::Major));
        assert!(finding.patch.is_some());
    }

    #[test]
    fn unknown_severity_is_dropped_not_fatal() {
        let finding: Finding =
            serde_json::from_value(json!({"title": "t", "severity": "critical"})).unwrap();
        assert_eq!(finding.title, "t");
        assert_eq!(finding.severity, None);
    }

    #[test]
    fn numeric_lines_are_stringified() {
        let finding: Finding = serde_json::from_value(json!({"lines": 42, "file": null})).unwrap();
        assert_eq!(finding.lines, "42");
        assert_eq!(finding.file, "");
    }

    #[test]
    fn missing_severity_is_not_serialized() {
        let finding = Finding {
            title: "t".into(),
            ..Finding::default()
        };
        let value = serde_json::to_value(&finding).unwrap();
        assert!(value.get("severity").is_none());
        assert!(value.get("patch").is_none());
    }
}
