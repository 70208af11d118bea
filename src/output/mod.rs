//! Output renderers for the review payload, and report file writing.

pub mod json;
pub mod markdown;
pub mod terminal;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::constants::{REVIEW_JSON_FILENAME, REVIEW_MD_FILENAME};
use crate::models::ReviewPayload;

pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;
pub use terminal::TerminalRenderer;

/// Errors while writing report files.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to create report directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Trait for rendering a review payload to an output format.
pub trait PayloadRenderer {
    /// Render the payload to a string.
    fn render(&self, payload: &ReviewPayload) -> String;
}

/// Write `ai_review.json` and `ai_review.md` into `dir`, creating it if
/// needed. Existing files are overwritten.
pub fn write_reports(dir: &Path, payload: &ReviewPayload) -> Result<Vec<PathBuf>, OutputError> {
    ensure_dir(dir)?;
    let reports: [(&str, &dyn PayloadRenderer); 2] = [
        (REVIEW_JSON_FILENAME, &JsonRenderer),
        (REVIEW_MD_FILENAME, &MarkdownRenderer),
    ];

    let mut written = Vec::with_capacity(reports.len());
    for (name, renderer) in reports {
        let path = dir.join(name);
        write_file(&path, &renderer.render(payload))?;
        written.push(path);
    }
    Ok(written)
}

/// Create `<base>/<UTC %Y%m%d-%H%M%S>` and return its path.
pub fn make_report_dir(base: &Path, now: DateTime<Utc>) -> Result<PathBuf, OutputError> {
    let dir = base.join(now.format("%Y%m%d-%H%M%S").to_string());
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Write `content` to `path`, overwriting it.
pub fn write_file(path: &Path, content: &str) -> Result<(), OutputError> {
    std::fs::write(path, content).map_err(|source| OutputError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Create `dir` and its parents.
pub fn ensure_dir(dir: &Path) -> Result<(), OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn writes_both_reports() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let payload = ReviewPayload::no_changes("no diff");

        let written = write_reports(&out, &payload).unwrap();
        assert_eq!(written.len(), 2);

        let json = std::fs::read_to_string(out.join(REVIEW_JSON_FILENAME)).unwrap();
        let parsed: ReviewPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, payload);
        assert!(out.join(REVIEW_MD_FILENAME).exists());
    }

    #[test]
    fn report_dir_uses_utc_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let created = make_report_dir(dir.path(), now).unwrap();
        assert_eq!(created, dir.path().join("20240309-070501"));
        assert!(created.is_dir());
    }

    #[test]
    fn write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_reports(&blocker, &ReviewPayload::no_changes("n")).unwrap_err();
        assert!(matches!(err, OutputError::CreateDir { .. }));
    }
}
