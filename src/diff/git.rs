//! Git CLI wrapper for producing diffs.
//!
//! Shells out to `git` via `tokio::process::Command`. Two strategies are
//! tried in order: an explicit `base...head` range (after a shallow fetch),
//! then the previous commit. Failures never escape; they surface as
//! [`DiffOutcome::Unavailable`].

use std::path::{Path, PathBuf};

use super::{DiffError, DiffOutcome};

/// Obtains the unified diff for a review run.
#[derive(Debug, Clone)]
pub struct DiffSource {
    repo_root: PathBuf,
}

impl DiffSource {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// Fetch the diff, trying the ref range first when both refs are given.
    pub async fn fetch(&self, base_ref: Option<&str>, head_ref: Option<&str>) -> DiffOutcome {
        let refs = base_ref
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .zip(head_ref.map(str::trim).filter(|r| !r.is_empty()));

        if let Some((base, head)) = refs {
            match self.range_diff(base, head).await {
                Ok(text) if !text.trim().is_empty() => {
                    return DiffOutcome::Range {
                        base: base.to_string(),
                        head: head.to_string(),
                        text,
                    };
                }
                Ok(_) => tracing::debug!(base, head, "ref range produced an empty diff"),
                Err(e) => tracing::debug!(base, head, error = %e, "ref range diff failed"),
            }
        }

        match run_git(
            &self.repo_root,
            &["diff", "--unified=0", "--no-color", "HEAD~1...HEAD"],
        )
        .await
        {
            Ok(text) => DiffOutcome::PreviousCommit { text },
            Err(e) => DiffOutcome::Unavailable {
                reason: e.to_string(),
            },
        }
    }

    async fn range_diff(&self, base: &str, head: &str) -> Result<String, DiffError> {
        // A failed fetch is not fatal: the refs may already exist locally.
        if let Err(e) = run_git(&self.repo_root, &["fetch", "origin", base, head, "--depth=1"]).await
        {
            tracing::debug!(error = %e, "shallow fetch failed");
        }
        let range = format!("origin/{base}...origin/{head}");
        run_git(
            &self.repo_root,
            &["diff", "--unified=0", "--no-color", &range],
        )
        .await
    }
}

/// Run a git command and return stdout when it exits successfully.
async fn run_git(repo_root: &Path, args: &[&str]) -> Result<String, DiffError> {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .await
        .map_err(|e| DiffError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DiffError::GitError(format!(
            "git {} failed (exit {}): {}",
            args.first().copied().unwrap_or_default(),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
