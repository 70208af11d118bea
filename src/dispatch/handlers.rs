//! Handlers behind each dispatcher task.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::HandlerContext;
use crate::config::tuning_notes;
use crate::constants::{
    ENV_API_KEY, ENV_BASE_URL, ENV_MODEL, ENV_SUPABASE_SERVICE_ROLE_KEY, ENV_SUPABASE_URL,
};
use crate::models::{AgentResult, Artifact};
use crate::scanners::{I18nScanner, ReportGenerator, SchemaScanner};

/// Variables that must be present and non-empty.
pub const REQUIRED_ENV: &[&str] = &[ENV_API_KEY, ENV_SUPABASE_URL, ENV_SUPABASE_SERVICE_ROLE_KEY];

/// Optional variables that share a checked prefix but are expected.
///
/// `OPENAI_MODEL` and `OPENAI_BASE_URL` are read by [`Config`] to pick the
/// model and endpoint, so they are allowed here and never reported as unknown.
///
/// [`Config`]: crate::config::Config
const OPTIONAL_ENV: &[&str] = &[ENV_MODEL, ENV_BASE_URL];

/// Prefixes whose variables are checked against the allow-list.
const CHECKED_PREFIXES: &[&str] = &["OPENAI_", "SUPABASE_"];

/// Check required credentials and flag unexpected prefixed variables.
pub fn env_guard(ctx: &HandlerContext, _payload: &Map<String, Value>) -> AgentResult {
    let env = &ctx.env;
    let mut missing: Vec<&str> = REQUIRED_ENV
        .iter()
        .copied()
        .filter(|name| !env.is_set(name))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return AgentResult::failed(format!("missing required env: {}", missing.join(", ")));
    }

    let mut summary = "env_guard: required env present".to_string();
    let unknown: Vec<String> = env
        .keys()
        .into_iter()
        .filter(|k| CHECKED_PREFIXES.iter().any(|p| k.starts_with(p)))
        .filter(|k| !REQUIRED_ENV.contains(&k.as_str()) && !OPTIONAL_ENV.contains(&k.as_str()))
        .collect();
    if !unknown.is_empty() {
        summary.push_str(&format!(" | WARN unknown env keys: {}", unknown.join(", ")));
    }
    let notes = tuning_notes(env);
    if !notes.is_empty() {
        summary.push_str(&format!(" | NOTE {}", notes.join("; ")));
    }
    AgentResult::ok(summary)
}

/// Report Prisma schemas and TypeORM entities under the payload `root`.
pub fn db_modeler(ctx: &HandlerContext, payload: &Map<String, Value>) -> AgentResult {
    run_scanner(&SchemaScanner, ctx, payload)
}

/// Report locale setup and hardcoded strings under the payload `root`.
pub fn i18n_reviewer(ctx: &HandlerContext, payload: &Map<String, Value>) -> AgentResult {
    run_scanner(&I18nScanner, ctx, payload)
}

/// Scan `root`; write the report when `outdir` is given.
fn run_scanner<G: ReportGenerator>(
    generator: &G,
    ctx: &HandlerContext,
    payload: &Map<String, Value>,
) -> AgentResult {
    let root = payload_path(ctx, payload, "root").unwrap_or_else(|| ctx.root.clone());
    if !root.is_dir() {
        return AgentResult::failed(format!("root is not a directory: {}", root.display()));
    }

    let Some(out_dir) = payload_path(ctx, payload, "outdir") else {
        let detection = generator.detect(&root);
        return AgentResult::ok(generator.summarize(&detection));
    };

    match generator.write_report(&root, &out_dir) {
        Ok((detection, path)) => {
            let mut result = AgentResult::ok(generator.summarize(&detection));
            result.artifacts.push(Artifact {
                path: path.display().to_string(),
                kind: "note".to_string(),
            });
            result
        }
        Err(e) => AgentResult::failed(e.to_string()),
    }
}

/// A non-empty string field of the payload, resolved against the context
/// root when relative.
fn payload_path(ctx: &HandlerContext, payload: &Map<String, Value>, key: &str) -> Option<PathBuf> {
    let raw = payload.get(key)?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    let path = Path::new(raw);
    Some(if path.is_absolute() {
        path.to_path_buf()
    } else {
        ctx.root.join(path)
    })
}
