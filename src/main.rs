//! revpipe: AI review glue for CI.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use revpipe::config;
use revpipe::diff;
use revpipe::dispatch;
use revpipe::env;
use revpipe::orchestrator;
use revpipe::output;
use revpipe::providers;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Command, DispatchArgs, ReviewArgs, RunArgs};
use config::Config;
use diff::{DiffOutcome, DiffSource};
use env::Env;
use orchestrator::ReviewPipeline;
use orchestrator::agents::{AgentRun, AgentRunOptions};
use output::{PayloadRenderer, TerminalRenderer};
use providers::CompletionClient;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Command::Review(args) => {
            init_tracing(args.verbose);
            run_review(args).await;
            cli::EXIT_OK
        }
        Command::Run(args) => {
            init_tracing(args.verbose);
            match run_agents(args).await {
                Ok(()) => cli::EXIT_OK,
                Err(err) => {
                    eprintln!("Error: {err:#}");
                    cli::run_exit_code(&err)
                }
            }
        }
        Command::Dispatch(args) => {
            init_tracing(false);
            match run_dispatch(args) {
                Ok(()) => cli::EXIT_OK,
                Err(err) => {
                    eprintln!("Error: {err:#}");
                    cli::EXIT_FAILURE
                }
            }
        }
    };
    process::exit(code);
}

/// Log to stderr. `--verbose` enables debug events; `RUST_LOG` wins when set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "revpipe=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load configuration and surface every substitution it made.
fn load_config(env: &Env, agents_path: &std::path::Path) -> Config {
    let config = Config::load(env, agents_path);
    for note in &config.notes {
        cli::print_warning(note);
    }
    config
}

/// Review the current diff. Every failure is reported and absorbed; the
/// report files are always attempted.
async fn run_review(args: ReviewArgs) {
    let env = Env::real();
    let mut config = load_config(&env, &args.config);
    config.review.allowed_extensions = args.extensions.clone();
    if let Some(limit) = args.trim_limit {
        config.review.trim_limit = limit;
    }

    let outcome = match &args.diff_file {
        Some(path) => diff::read_diff_file(path).await.unwrap_or_else(|e| {
            cli::print_warning(&format!("{}: {e}", path.display()));
            DiffOutcome::Unavailable {
                reason: e.to_string(),
            }
        }),
        None => {
            DiffSource::new(&args.repo)
                .fetch(args.base_ref.as_deref(), args.head_ref.as_deref())
                .await
        }
    };
    if let DiffOutcome::Unavailable { reason } = &outcome {
        cli::print_warning(&format!("no diff available: {reason}"));
    }
    tracing::debug!(source = %outcome.describe(), bytes = outcome.text().len(), "diff loaded");

    let client = CompletionClient::from_config(&config);
    if client.is_offline() {
        cli::print_warning("OPENAI_API_KEY is not set; stage outputs are offline placeholders");
    }
    let pipeline = ReviewPipeline::new(client, &config);
    let payload = pipeline.review(outcome.text()).await;

    match output::write_reports(&args.out_dir, &payload) {
        Ok(paths) => {
            for path in paths {
                tracing::debug!(path = %path.display(), "report written");
            }
        }
        Err(e) => cli::print_warning(&e.to_string()),
    }
    print!("{}", TerminalRenderer.render(&payload));
}

/// Run the topic-driven agent pipeline.
async fn run_agents(args: RunArgs) -> Result<()> {
    let env = Env::real();
    let config = load_config(&env, &args.config);
    let client = CompletionClient::from_config(&config);
    if client.is_offline() {
        cli::print_warning("OPENAI_API_KEY is not set; stage outputs are offline placeholders");
    }
    if let Some(pr) = &args.pr {
        tracing::debug!(pr = %pr, "--pr is accepted but unused");
    }

    let root = std::env::current_dir().context("failed to resolve current directory")?;
    let options = AgentRunOptions {
        topic: args.topic,
        pattern: args.pattern,
        root,
        out_base: args.outdir,
    };
    let report = AgentRun::new(&client, &config)
        .execute(&options)
        .await
        .context("agent run failed")?;

    println!("Saved reports to: {}", report.dir.display());
    Ok(())
}

/// Run one task and print its validated result as a single JSON line.
fn run_dispatch(args: DispatchArgs) -> Result<()> {
    let ctx = dispatch::HandlerContext {
        env: Env::real(),
        root: std::env::current_dir().context("failed to resolve current directory")?,
    };
    let value = dispatch::dispatch(&ctx, &args.task, &args.payload)?;
    let line = serde_json::to_string(&value).context("failed to serialize result")?;
    println!("{line}");
    Ok(())
}
