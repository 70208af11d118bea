//! Static report generators run against a project tree.
//!
//! Each generator detects something in the tree and renders the detection
//! as a Markdown report. Neither calls a model.

pub mod i18n;
pub mod schema;

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::output::{self, OutputError};

pub use i18n::I18nScanner;
pub use schema::SchemaScanner;

/// Directories never descended into.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", ".next", "dist", "build", "coverage"];

/// A detector plus Markdown renderer for one kind of project analysis.
pub trait ReportGenerator {
    type Detection: Serialize;

    /// File name of the rendered report.
    const REPORT_FILENAME: &'static str;

    /// Inspect the tree under `root`.
    fn detect(&self, root: &Path) -> Self::Detection;

    /// Render the detection as Markdown.
    fn render(&self, detection: &Self::Detection) -> String;

    /// One-line description of the detection.
    fn summarize(&self, detection: &Self::Detection) -> String;

    /// Detect, render, and write the report into `out_dir`.
    fn write_report(
        &self,
        root: &Path,
        out_dir: &Path,
    ) -> Result<(Self::Detection, PathBuf), OutputError> {
        let detection = self.detect(root);
        output::ensure_dir(out_dir)?;
        let path = out_dir.join(Self::REPORT_FILENAME);
        output::write_file(&path, &self.render(&detection))?;
        Ok((detection, path))
    }
}

/// Regular files under `root`, outside [`EXCLUDED_DIRS`], in a stable order.
pub(crate) fn project_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
}

fn is_excluded(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
}

/// `path` relative to `root` for display, falling back to the full path.
pub(crate) fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// Read a file as text, replacing invalid UTF-8. `None` when unreadable.
pub(crate) fn read_lossy(path: &Path) -> Option<String> {
    std::fs::read(path)
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
