//! Agent run: free-form Implementation → Review → Test → Doc stages, or a
//! static report when the topic is about database schemas or i18n.
//!
//! Stage failures never abort the run; they become the stage's output.

use std::path::{Path, PathBuf};

use chrono::Utc;
use globset::{Glob, GlobMatcher};
use strum::Display;
use thiserror::Error;

use crate::config::Config;
use crate::output::{self, OutputError};
use crate::prompt::{PromptBuilder, Role, StageContext};
use crate::providers::CompletionClient;
use crate::scanners::{project_files, read_lossy, I18nScanner, ReportGenerator, SchemaScanner};

/// Maximum number of files read for `--path`.
pub const MAX_FILES: usize = 50;

/// Files summarised in the Implementation prompt.
const SUMMARY_FILES: usize = 10;
const SUMMARY_READ_CHARS: usize = 400;
const SUMMARY_SHOW_CHARS: usize = 200;

pub const NO_TOPIC: &str = "(no topic)";

const SCHEMA_KEYWORDS: &[&str] = &[
    "db", "database", "schema", "prisma", "typeorm", "orm", "entity", "entities", "migration",
];
const I18N_KEYWORDS: &[&str] = &[
    "i18n",
    "l10n",
    "internationalization",
    "internationalisation",
    "localization",
    "localisation",
    "translation",
    "translations",
    "locale",
    "locales",
];

/// Canonical stage order of the generic pipeline.
const STAGES: [Role; 4] = [Role::Implementation, Role::Review, Role::Test, Role::Doc];

/// Errors that abort an agent run.
#[derive(Error, Debug)]
pub enum AgentRunError {
    #[error("invalid --path pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Which kind of run a topic selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Route {
    Schema,
    I18n,
    Generic,
}

/// Choose the route from whole-word keywords in `topic`.
pub fn route(topic: &str) -> Route {
    let tokens: Vec<String> = topic
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();
    let mentions = |keywords: &[&str]| tokens.iter().any(|t| keywords.contains(&t.as_str()));
    if mentions(SCHEMA_KEYWORDS) {
        Route::Schema
    } else if mentions(I18N_KEYWORDS) {
        Route::I18n
    } else {
        Route::Generic
    }
}

/// Inputs of an agent run.
#[derive(Debug, Clone)]
pub struct AgentRunOptions {
    pub topic: String,
    /// Glob of reference files, relative to `root`.
    pub pattern: Option<String>,
    pub root: PathBuf,
    /// Reports go to `<out_base>/<UTC timestamp>/`.
    pub out_base: PathBuf,
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct AgentRunReport {
    pub dir: PathBuf,
    pub route: Route,
    pub files_matched: usize,
    pub written: Vec<PathBuf>,
}

/// A file read for context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFile {
    pub path: String,
    pub content: String,
}

/// Drives one agent run.
pub struct AgentRun<'a> {
    client: &'a CompletionClient,
    config: &'a Config,
    prompts: PromptBuilder,
}

impl<'a> AgentRun<'a> {
    pub fn new(client: &'a CompletionClient, config: &'a Config) -> Self {
        Self {
            client,
            config,
            prompts: PromptBuilder::new(config.review.trim_limit),
        }
    }

    /// Execute the run and write its reports.
    pub async fn execute(&self, options: &AgentRunOptions) -> Result<AgentRunReport, AgentRunError> {
        let topic = match options.topic.trim() {
            "" => NO_TOPIC,
            t => t,
        };
        let files = match &options.pattern {
            Some(pattern) if !pattern.trim().is_empty() => {
                collect_files(&options.root, pattern.trim())?
            }
            _ => Vec::new(),
        };
        let route = route(topic);
        tracing::debug!(%route, files = files.len(), "starting agent run");

        let outputs = match route {
            Route::Schema => self.static_report(&SchemaScanner, &options.root),
            Route::I18n => self.static_report(&I18nScanner, &options.root),
            Route::Generic => self.generic_stages(topic, &files).await,
        };

        let dir = output::make_report_dir(&options.out_base, Utc::now())?;
        let mut written = Vec::with_capacity(outputs.len() + 1);
        for (name, content) in &outputs {
            let path = dir.join(name);
            output::write_file(&path, content)?;
            written.push(path);
        }

        let stage_names: Vec<&str> = outputs.iter().map(|(name, _)| name.as_str()).collect();
        let summary = render_summary(topic, route, files.len(), &stage_names);
        let summary_path = dir.join("summary.md");
        output::write_file(&summary_path, &summary)?;
        written.push(summary_path);

        Ok(AgentRunReport {
            dir,
            route,
            files_matched: files.len(),
            written,
        })
    }

    fn static_report<G: ReportGenerator>(&self, generator: &G, root: &Path) -> Vec<(String, String)> {
        let detection = generator.detect(root);
        tracing::debug!(summary = %generator.summarize(&detection), "static report");
        vec![(G::REPORT_FILENAME.to_string(), generator.render(&detection))]
    }

    /// Run the configured stages in canonical order. Returns
    /// `(file name, content)` per stage that ran.
    async fn generic_stages(&self, topic: &str, files: &[ReferenceFile]) -> Vec<(String, String)> {
        let selected = self.config.agents.sequence();
        let enabled = |role: Role| selected.as_ref().is_none_or(|s| s.contains(&role));

        let file_summary = summarize_files(files);
        let mut implementation = None;
        let mut review = None;
        let mut test_plan = None;
        let mut outputs = Vec::new();

        for role in STAGES {
            if !enabled(role) {
                tracing::debug!(stage = role.label(), "stage not in workflow, skipping");
                continue;
            }
            let ctx = match role {
                Role::Implementation => StageContext {
                    topic: Some(topic),
                    upstream: Some(&file_summary),
                    ..StageContext::default()
                },
                Role::Review => StageContext {
                    upstream: implementation.as_deref(),
                    ..StageContext::default()
                },
                Role::Test => StageContext {
                    upstream: review.as_deref(),
                    ..StageContext::default()
                },
                _ => StageContext {
                    upstream: implementation.as_deref(),
                    secondary: test_plan.as_deref(),
                    ..StageContext::default()
                },
            };
            let text = self.stage(role, &ctx).await;
            outputs.push((stage_filename(role).to_string(), text.clone()));
            match role {
                Role::Implementation => implementation = Some(text),
                Role::Review => review = Some(text),
                Role::Test => test_plan = Some(text),
                _ => {}
            }
        }
        outputs
    }

    async fn stage(&self, role: Role, ctx: &StageContext<'_>) -> String {
        let prompt = self.prompts.build(role, ctx);
        let settings = self.config.settings_for(role);
        tracing::debug!(stage = role.label(), model = %settings.model, "running stage");
        match self
            .client
            .complete_with(&settings, &prompt.system, &prompt.user)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(stage = role.label(), error = %e, "stage failed");
                format!(
                    "The {} stage could not get a completion ({e}). Try again later.",
                    role.label()
                )
            }
        }
    }
}

fn stage_filename(role: Role) -> &'static str {
    match role {
        Role::Implementation => "implementation.md",
        Role::Review => "review.md",
        Role::Test => "test-plan.md",
        _ => "doc.md",
    }
}

/// Read up to [`MAX_FILES`] files under `root` whose relative path matches
/// `pattern`. Unreadable files are skipped.
pub fn collect_files(root: &Path, pattern: &str) -> Result<Vec<ReferenceFile>, AgentRunError> {
    let matcher: GlobMatcher = Glob::new(pattern)
        .map_err(|source| AgentRunError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    Ok(project_files(root)
        .filter_map(|path| {
            let relative = path.strip_prefix(root).ok()?.to_path_buf();
            matcher.is_match(&relative).then_some((path, relative))
        })
        .filter_map(|(path, relative)| {
            read_lossy(&path).map(|content| ReferenceFile {
                path: relative.display().to_string(),
                content,
            })
        })
        .take(MAX_FILES)
        .collect())
}

/// One line per file: path and the first characters with newlines flattened.
pub fn summarize_files(files: &[ReferenceFile]) -> String {
    if files.is_empty() {
        return "(no files matched)".to_string();
    }
    files
        .iter()
        .take(SUMMARY_FILES)
        .map(|f| {
            let flat: String = f
                .content
                .chars()
                .take(SUMMARY_READ_CHARS)
                .map(|c| if c == '\n' { ' ' } else { c })
                .collect();
            let shown: String = flat.chars().take(SUMMARY_SHOW_CHARS).collect();
            let ellipsis = if flat.chars().count() > SUMMARY_SHOW_CHARS { "..." } else { "" };
            format!("- {}: {shown}{ellipsis}", f.path)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_summary(topic: &str, route: Route, files: usize, outputs: &[&str]) -> String {
    let sequence = match route {
        Route::Generic if outputs.is_empty() => "(no stages)".to_string(),
        Route::Generic => outputs
            .iter()
            .map(|name| match *name {
                "implementation.md" => "Implementation",
                "review.md" => "Review",
                "test-plan.md" => "Test",
                _ => "Doc",
            })
            .collect::<Vec<_>>()
            .join(" → "),
        _ => format!("{route} report"),
    };
    [
        "# Agent Run Summary".to_string(),
        format!("- topic: {topic}"),
        format!("- route: {route}"),
        format!("- files: {files} matched"),
        format!("- sequence: {sequence}"),
        format!("- outputs: {}", outputs.join(", ")),
    ]
    .join("\n")
}
