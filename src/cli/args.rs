//! Clap argument types.

use clap::Parser;
use std::path::PathBuf;

use revpipe::constants::{
    AGENTS_CONFIG_PATH, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_REPORT_BASE, ENV_BASE_REF,
    ENV_HEAD_REF,
};

/// AI code review glue for CI.
#[derive(Parser, Debug)]
#[command(
    name = revpipe::constants::APP_NAME,
    version = revpipe::constants::VERSION,
    about = "Multi-stage AI code review, topic agent runs and task dispatch for CI."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Review the current diff and write ai_review.json / ai_review.md.
    Review(ReviewArgs),

    /// Run the topic-driven agent pipeline and write a report directory.
    Run(RunArgs),

    /// Run a named task and print its result as one JSON line.
    Dispatch(DispatchArgs),
}

/// Arguments for the `review` subcommand.
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    // --- Input ---
    /// Base ref of the range to review.
    #[arg(long, env = ENV_BASE_REF)]
    pub base_ref: Option<String>,

    /// Head ref of the range to review.
    #[arg(long, env = ENV_HEAD_REF)]
    pub head_ref: Option<String>,

    /// Pre-computed unified diff file (skips git).
    #[arg(long)]
    pub diff_file: Option<PathBuf>,

    /// Repository to diff in.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    // --- Filtering ---
    /// Comma-separated file extensions to review.
    #[arg(long = "ext", value_delimiter = ',', default_values_t = default_extensions())]
    pub extensions: Vec<String>,

    /// Byte limit for interpolated prompt content.
    #[arg(long)]
    pub trim_limit: Option<usize>,

    // --- Output ---
    /// Directory the report files are written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Agent configuration file.
    #[arg(long, default_value = AGENTS_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log stage transitions and retries.
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Topic of the run; also selects specialised reports.
    #[arg(long, default_value = "")]
    pub topic: String,

    /// Glob of reference files, relative to the current directory.
    #[arg(long = "path")]
    pub pattern: Option<String>,

    /// Base directory for timestamped report directories.
    #[arg(long, default_value = DEFAULT_REPORT_BASE)]
    pub outdir: PathBuf,

    /// Agent configuration file.
    #[arg(long, default_value = AGENTS_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log stage transitions and retries.
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,

    /// Pull request number. Accepted for CI compatibility; unused.
    #[arg(long)]
    pub pr: Option<String>,
}

/// Arguments for the `dispatch` subcommand.
#[derive(Parser, Debug)]
pub struct DispatchArgs {
    /// Task name: env_guard, db_modeler or i18n_reviewer.
    #[arg(long)]
    pub task: String,

    /// JSON object passed to the task.
    #[arg(long, default_value = "{}")]
    pub payload: String,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|e| e.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
        assert_eq!(Cli::command().get_name(), revpipe::constants::APP_NAME);
    }

    #[test]
    fn review_defaults() {
        let cli = Cli::try_parse_from(["revpipe", "review", "--base-ref", "main", "--head-ref", "feat"])
            .unwrap();
        let Command::Review(args) = cli.command else {
            panic!("expected review");
        };
        assert_eq!(args.base_ref.as_deref(), Some("main"));
        assert_eq!(args.head_ref.as_deref(), Some("feat"));
        assert_eq!(args.extensions, vec![".ts", ".tsx", ".js", ".jsx", ".json"]);
        assert_eq!(args.out_dir, PathBuf::from("."));
        assert_eq!(args.config, PathBuf::from(".ai/agents_config.yaml"));
        assert!(args.trim_limit.is_none());
    }

    #[test]
    fn review_ext_is_comma_separated() {
        let cli = Cli::try_parse_from(["revpipe", "review", "--ext", "rs,.toml"]).unwrap();
        let Command::Review(args) = cli.command else {
            panic!("expected review");
        };
        assert_eq!(args.extensions, vec!["rs", ".toml"]);
    }

    #[test]
    fn run_accepts_pr_and_defaults_outdir() {
        let cli = Cli::try_parse_from([
            "revpipe", "run", "--topic", "prisma schema", "--path", "src/**/*.ts", "--pr", "42",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.topic, "prisma schema");
        assert_eq!(args.pattern.as_deref(), Some("src/**/*.ts"));
        assert_eq!(args.outdir, PathBuf::from("artifacts/agent_reports"));
        assert_eq!(args.pr.as_deref(), Some("42"));
    }

    #[test]
    fn dispatch_requires_task() {
        assert!(Cli::try_parse_from(["revpipe", "dispatch"]).is_err());
        let cli = Cli::try_parse_from(["revpipe", "dispatch", "--task", "env_guard"]).unwrap();
        let Command::Dispatch(args) = cli.command else {
            panic!("expected dispatch");
        };
        assert_eq!(args.payload, "{}");
    }
}
