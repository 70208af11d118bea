//! Restrict a unified diff to files with allowed extensions.
//!
//! The decision is made once per file, from the post-image path in the
//! `diff --git a/... b/...` header. Everything between a kept header and the
//! next header is copied verbatim; excluded files vanish entirely.

use std::sync::LazyLock;

use regex::Regex;

const FILE_HEADER_PREFIX: &str = "diff --git";

/// Captures the post-image path of a `diff --git` header.
static POST_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" b/(.+)$").expect("valid post-image regex"));

/// Normalise user-supplied extensions to a leading-dot form (`ts` → `.ts`).
pub fn normalize_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|e| e.as_ref().trim().to_string())
        .filter(|e| !e.is_empty())
        .map(|e| if e.starts_with('.') { e } else { format!(".{e}") })
        .collect()
}

/// Keep only the parts of `diff` that belong to files ending in one of
/// `allowed`.
///
/// Lines before the first header, and every line after a header whose path
/// cannot be parsed, are dropped. Kept files retain their header, so the
/// output is itself a valid input and filtering is idempotent.
pub fn filter_diff(diff: &str, allowed: &[String]) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut keep_current = false;

    for line in diff.lines() {
        if line.starts_with(FILE_HEADER_PREFIX) {
            keep_current = POST_IMAGE_RE
                .captures(line)
                .and_then(|c| c.get(1))
                .is_some_and(|path| is_allowed(path.as_str(), allowed));
        }
        if keep_current {
            kept.push(line);
        }
    }

    kept.join("\n")
}

fn is_allowed(path: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|ext| path.ends_with(ext.as_str()))
}
