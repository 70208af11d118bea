//! Diff engine: git CLI wrapper with ref fallback, and extension filtering.

pub mod filter;
pub mod git;

use std::path::Path;
use thiserror::Error;

pub use filter::{filter_diff, normalize_extensions};
pub use git::DiffSource;

/// Errors from the diff engine.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("git command failed: {0}")]
    GitError(String),

    #[error("failed to read diff file: {0}")]
    FileReadError(#[from] std::io::Error),
}

/// How the diff for a run was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// Diff between an explicit base and head ref.
    Range {
        base: String,
        head: String,
        text: String,
    },
    /// Diff of the previous commit against the current one.
    PreviousCommit { text: String },
    /// Diff read from a file supplied by the caller.
    File { text: String },
    /// Every strategy failed; the reason of the last failure is kept.
    Unavailable { reason: String },
}

impl DiffOutcome {
    /// The diff text; empty when no strategy succeeded.
    pub fn text(&self) -> &str {
        match self {
            DiffOutcome::Range { text, .. }
            | DiffOutcome::PreviousCommit { text }
            | DiffOutcome::File { text } => text,
            DiffOutcome::Unavailable { .. } => "",
        }
    }

    /// Short description of where the diff came from.
    pub fn describe(&self) -> String {
        match self {
            DiffOutcome::Range { base, head, .. } => format!("origin/{base}...origin/{head}"),
            DiffOutcome::PreviousCommit { .. } => "HEAD~1...HEAD".to_string(),
            DiffOutcome::File { .. } => "diff file".to_string(),
            DiffOutcome::Unavailable { reason } => format!("unavailable ({reason})"),
        }
    }
}

/// Read a pre-computed unified diff from a file.
pub async fn read_diff_file(path: &Path) -> Result<DiffOutcome, DiffError> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(DiffOutcome::File { text })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_has_empty_text() {
        let outcome = DiffOutcome::Unavailable {
            reason: "no git".into(),
        };
        assert_eq!(outcome.text(), "");
        assert!(outcome.describe().contains("no git"));
    }

    #[test]
    fn range_describes_refs() {
        let outcome = DiffOutcome::Range {
            base: "main".into(),
            head: "feature".into(),
            text: "diff".into(),
        };
        assert_eq!(outcome.text(), "diff");
        assert_eq!(outcome.describe(), "origin/main...origin/feature");
    }

    #[tokio::test]
    async fn read_diff_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("change.diff");
        std::fs::write(&path, "diff --git a/x.ts b/x.ts\n+new\n").unwrap();
        let outcome = read_diff_file(&path).await.unwrap();
        assert!(outcome.text().contains("+new"));
    }

    #[tokio::test]
    async fn read_diff_file_not_found() {
        let result = read_diff_file(Path::new("/tmp/revpipe_nonexistent.diff")).await;
        assert!(matches!(result, Err(DiffError::FileReadError(_))));
    }
}
