//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags (applied by the caller)
//! 2. Environment variables
//! 3. `.ai/agents_config.yaml` for per-role model settings
//! 4. Built-in defaults
//!
//! Loading never fails. Unreadable config files and out-of-range tuning
//! values become entries in [`Config::notes`].

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::agents::AgentsConfig;
use crate::constants::{
    DEFAULT_AGENT_MODEL, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MODEL, DEFAULT_SEED,
    DEFAULT_TEMPERATURE, DEFAULT_TRIM_LIMIT, ENV_API_KEY, ENV_BASE_URL, ENV_MODEL, ENV_SEED,
    ENV_TEMPERATURE, TEMPERATURE_RANGE,
};
use crate::env::Env;
use crate::prompt::Role;
use crate::providers::RetryPolicy;
use crate::providers::ModelSettings;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub review: ReviewConfig,
    pub retry: RetryPolicy,
    pub agents: AgentsConfig,
    /// Non-fatal problems found while loading.
    pub notes: Vec<String>,
}

/// Review pipeline settings.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub allowed_extensions: Vec<String>,
    pub trim_limit: usize,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            trim_limit: DEFAULT_TRIM_LIMIT,
        }
    }
}

/// LLM provider configuration.
#[derive(Clone)]
pub struct ProviderConfig {
    pub model: String,
    pub temperature: f64,
    pub seed: u64,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("seed", &self.seed)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            seed: DEFAULT_SEED,
            base_url: None,
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from the environment and the agent config at
    /// `agents_path`.
    pub fn load(env: &Env, agents_path: &Path) -> Self {
        let mut config = Self::from_env(env);
        match AgentsConfig::load(agents_path) {
            Ok(agents) => {
                config.notes.extend(
                    agents
                        .warnings
                        .iter()
                        .map(|w| format!("{}: {w}", agents_path.display())),
                );
                config.agents = agents;
            }
            Err(e) => config.notes.push(format!("{e}; using built-in role defaults")),
        }
        config
    }

    /// Configuration from environment variables only.
    pub fn from_env(env: &Env) -> Self {
        let mut config = Config::default();

        if let Some(model) = env.non_empty(ENV_MODEL) {
            config.provider.model = model;
        }
        config.provider.api_key = env.non_empty(ENV_API_KEY);
        config.provider.base_url = env.non_empty(ENV_BASE_URL);

        let temperature = parse_temperature(env);
        config.provider.temperature = temperature.value;
        config.notes.extend(temperature.note);

        let seed = parse_seed(env);
        config.provider.seed = seed.value;
        config.notes.extend(seed.note);

        config
    }

    /// Default model settings for the review pipeline roles.
    pub fn model_settings(&self) -> ModelSettings {
        ModelSettings::new(self.provider.model.clone(), self.provider.temperature)
    }

    /// Effective settings for `role`: built-in defaults overlaid with the
    /// agent config.
    pub fn settings_for(&self, role: Role) -> ModelSettings {
        let mut settings = match role {
            Role::Planner | Role::Reviewer | Role::TestDesigner => self.model_settings(),
            Role::Implementation | Role::Doc => ModelSettings::new(DEFAULT_AGENT_MODEL, 0.2),
            Role::Review | Role::Test => ModelSettings::new(DEFAULT_AGENT_MODEL, 0.0),
        };
        if let Some(overrides) = self.agents.role(role) {
            if let Some(model) = overrides.model.as_deref().filter(|m| !m.trim().is_empty()) {
                settings.model = model.to_string();
            }
            if let Some(temperature) = overrides.temperature {
                settings.temperature = temperature;
            }
        }
        settings
    }
}

/// A parsed tuning value and an optional note explaining a substitution.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuned<T> {
    pub value: T,
    pub note: Option<String>,
}

/// Read `LLM_TEMPERATURE`. Unparsable values fall back to the default;
/// out-of-range values are kept as given and noted.
pub fn parse_temperature(env: &Env) -> Tuned<f64> {
    let Some(raw) = env.non_empty(ENV_TEMPERATURE) else {
        return Tuned {
            value: DEFAULT_TEMPERATURE,
            note: None,
        };
    };
    match raw.parse::<f64>() {
        Ok(t) if TEMPERATURE_RANGE.contains(&t) => Tuned {
            value: t,
            note: None,
        },
        Ok(t) if t.is_finite() => Tuned {
            value: t,
            note: Some(format!(
                "{ENV_TEMPERATURE}={raw} is outside {}-{}; using it as given",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            )),
        },
        _ => Tuned {
            value: DEFAULT_TEMPERATURE,
            note: Some(format!(
                "{ENV_TEMPERATURE}='{raw}' is not a number; using {DEFAULT_TEMPERATURE}"
            )),
        },
    }
}

/// Read `LLM_SEED`. Anything but a non-negative integer falls back to the
/// default.
pub fn parse_seed(env: &Env) -> Tuned<u64> {
    let Some(raw) = env.non_empty(ENV_SEED) else {
        return Tuned {
            value: DEFAULT_SEED,
            note: None,
        };
    };
    match raw.parse::<u64>() {
        Ok(seed) => Tuned {
            value: seed,
            note: None,
        },
        Err(_) => Tuned {
            value: DEFAULT_SEED,
            note: Some(format!(
                "{ENV_SEED}='{raw}' is not a non-negative integer; using {DEFAULT_SEED}"
            )),
        },
    }
}

/// Notes for every tuning variable that had to be substituted.
pub fn tuning_notes(env: &Env) -> Vec<String> {
    parse_temperature(env)
        .note
        .into_iter()
        .chain(parse_seed(env).note)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_without_env() {
        let config = Config::from_env(&Env::mock(Vec::<(String, String)>::new()));
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.temperature, 0.2);
        assert_eq!(config.provider.seed, 123);
        assert!(config.provider.api_key.is_none());
        assert!(config.notes.is_empty());
    }

    #[test]
    fn env_overrides() {
        let env = Env::mock([
            (ENV_MODEL, "gpt-4.1"),
            (ENV_API_KEY, "sk-test"),
            (ENV_BASE_URL, "http://localhost:8080/v1"),
            (ENV_TEMPERATURE, "0.7"),
            (ENV_SEED, "7"),
        ]);
        let config = Config::from_env(&env);
        assert_eq!(config.provider.model, "gpt-4.1");
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.provider.base_url.as_deref(),
            Some("http://localhost:8080/v1")
        );
        assert_eq!(config.provider.temperature, 0.7);
        assert_eq!(config.provider.seed, 7);
    }

    #[test]
    fn empty_api_key_counts_as_unset() {
        let config = Config::from_env(&Env::mock([(ENV_API_KEY, "  ")]));
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn out_of_range_temperature_is_kept_with_note() {
        let config = Config::from_env(&Env::mock([(ENV_TEMPERATURE, "3.5")]));
        assert_eq!(config.provider.temperature, 3.5);
        assert_eq!(config.notes.len(), 1);
        assert!(config.notes[0].contains("LLM_TEMPERATURE=3.5 is outside 0-2"));
        assert_eq!(config.model_settings().temperature, 3.5);
    }

    #[test]
    fn bad_tuning_values_fall_back_to_defaults() {
        let env = Env::mock([(ENV_TEMPERATURE, "warm"), (ENV_SEED, "-1")]);
        let config = Config::from_env(&env);
        assert_eq!(config.provider.temperature, 0.2);
        assert_eq!(config.provider.seed, 123);
        assert_eq!(tuning_notes(&env).len(), 2);
    }

    #[test]
    fn debug_redacts_api_key() {
        let provider = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..ProviderConfig::default()
        };
        let debug = format!("{provider:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn role_defaults() {
        let config = Config::default();
        assert_eq!(config.settings_for(Role::Reviewer), ModelSettings::new("gpt-4o-mini", 0.2));
        assert_eq!(config.settings_for(Role::Implementation), ModelSettings::new("gpt-4o", 0.2));
        assert_eq!(config.settings_for(Role::Review), ModelSettings::new("gpt-4o", 0.0));
        assert_eq!(config.settings_for(Role::Test), ModelSettings::new("gpt-4o", 0.0));
        assert_eq!(config.settings_for(Role::Doc), ModelSettings::new("gpt-4o", 0.2));
    }

    #[test]
    fn agent_config_overrides_role_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents_config.yaml");
        std::fs::write(
            &path,
            "review_agent:\n  model: gpt-4o-mini\n  temperature: 0.4\ndoc_agent:\n  temperature: 2.5\n",
        )
        .unwrap();
        let config = Config::load(&Env::mock(Vec::<(String, String)>::new()), &path);
        assert_eq!(
            config.settings_for(Role::Review),
            ModelSettings::new("gpt-4o-mini", 0.4)
        );
        assert_eq!(config.settings_for(Role::Doc).temperature, 2.5);
        assert_eq!(config.settings_for(Role::Doc).model, "gpt-4o");
    }

    #[test]
    fn unparsable_agent_config_becomes_note() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents_config.yaml");
        std::fs::write(&path, "review_agent: [unclosed").unwrap();
        let config = Config::load(&Env::mock(Vec::<(String, String)>::new()), &path);
        assert!(config.agents.roles.is_empty());
        assert_eq!(config.notes.len(), 1);
        assert!(config.notes[0].contains("failed to parse"));
    }
}
