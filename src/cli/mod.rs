//! CLI command definitions, user-facing messages and exit codes.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

use std::io::ErrorKind;

/// Exit status for success.
pub const EXIT_OK: i32 = 0;
/// Exit status for any failure without a more specific code.
pub const EXIT_FAILURE: i32 = 1;
/// Exit status when a required file or directory does not exist.
pub const EXIT_NOT_FOUND: i32 = 2;
/// Exit status when the filesystem refused access.
pub const EXIT_PERMISSION_DENIED: i32 = 3;

/// Print a yellow `Warning:` line to stderr.
pub fn print_warning(message: &str) {
    use colored::Colorize;
    eprintln!("{} {message}", "Warning:".yellow().bold());
}

/// Exit status for a failed `run`, chosen from the first I/O error in the
/// error chain.
pub fn run_exit_code(err: &anyhow::Error) -> i32 {
    let io_kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<std::io::Error>())
        .map(std::io::Error::kind);
    match io_kind {
        Some(ErrorKind::NotFound) => EXIT_NOT_FOUND,
        Some(ErrorKind::PermissionDenied) => EXIT_PERMISSION_DENIED,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use revpipe::output::OutputError;
    use std::path::PathBuf;

    #[test]
    fn not_found_maps_to_two() {
        let err: anyhow::Result<()> = Err(OutputError::WriteFile {
            path: PathBuf::from("x/summary.md"),
            source: std::io::Error::from(ErrorKind::NotFound),
        })
        .context("agent run failed");
        assert_eq!(run_exit_code(&err.unwrap_err()), EXIT_NOT_FOUND);
    }

    #[test]
    fn permission_denied_maps_to_three() {
        let err = anyhow::Error::new(std::io::Error::from(ErrorKind::PermissionDenied));
        assert_eq!(run_exit_code(&err), EXIT_PERMISSION_DENIED);
    }

    #[test]
    fn other_errors_map_to_one() {
        assert_eq!(run_exit_code(&anyhow::anyhow!("boom")), EXIT_FAILURE);
        let err = anyhow::Error::new(std::io::Error::other("disk on fire"));
        assert_eq!(run_exit_code(&err), EXIT_FAILURE);
    }

    #[test]
    fn print_warning_does_not_panic() {
        print_warning("something odd");
    }
}
