//! App-wide constants.
//!
//! Centralises the tool name, file names, environment variable names,
//! and built-in defaults so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "revpipe";

/// Crate version, as set by Cargo.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Optional agent configuration file, relative to the working directory.
pub const AGENTS_CONFIG_PATH: &str = ".ai/agents_config.yaml";

/// Structured review report file name.
pub const REVIEW_JSON_FILENAME: &str = "ai_review.json";

/// Human-readable review report file name.
pub const REVIEW_MD_FILENAME: &str = "ai_review.md";

/// Default base directory for agent-run reports.
pub const DEFAULT_REPORT_BASE: &str = "artifacts/agent_reports";

/// File extensions kept by the diff filter unless overridden.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".json"];

/// Byte budget for diff and upstream text interpolated into a prompt.
pub const DEFAULT_TRIM_LIMIT: usize = 40_000;

/// Default completion model for the review pipeline.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default model for the agent-run roles.
pub const DEFAULT_AGENT_MODEL: &str = "gpt-4o";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Default deterministic seed.
pub const DEFAULT_SEED: u64 = 123;

/// Accepted temperature range. Values outside it are noted, not rejected.
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=2.0;

// ── Environment variable names ──────────────────────────────────────

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_MODEL: &str = "OPENAI_MODEL";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_TEMPERATURE: &str = "LLM_TEMPERATURE";
pub const ENV_SEED: &str = "LLM_SEED";
pub const ENV_BASE_REF: &str = "GITHUB_BASE_REF";
pub const ENV_HEAD_REF: &str = "GITHUB_HEAD_REF";
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";
