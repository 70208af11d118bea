//! Declarative per-role model settings loaded from YAML.
//!
//! ```yaml
//! implementation_agent:
//!   model: gpt-4o
//!   temperature: 0.2
//!   description: Proposes the change
//! review_agent:
//!   model: gpt-4o
//!   temperature: 0.0
//! workflow:
//!   sequence: [implementation_agent, review_agent, test_agent, doc_agent]
//! ```
//!
//! Roles are read one at a time so a malformed entry only loses that role.
//! `workflow` may be either a list or a mapping with a `sequence` list.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value as YamlValue;

use super::ConfigError;
use crate::prompt::Role;

const WORKFLOW_KEY: &str = "workflow";

/// Model overrides for one role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleSettings {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub description: Option<String>,
}

/// Parsed agent configuration. Empty when the file is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentsConfig {
    /// Role settings keyed by config name, in file order.
    pub roles: IndexMap<String, RoleSettings>,
    /// Stage names from `workflow`, in file order.
    pub workflow: Option<Vec<String>>,
    /// Problems found while reading individual entries.
    pub warnings: Vec<String>,
}

impl AgentsConfig {
    /// Load from `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::ReadFile {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_yaml_str(&content).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse YAML text. A document whose root is not a mapping is empty.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml_ng::Error> {
        let root: YamlValue = serde_yaml_ng::from_str(content)?;
        let YamlValue::Mapping(entries) = root else {
            return Ok(Self::default());
        };

        let mut config = Self::default();
        for (key, value) in entries {
            let Some(name) = key.as_str() else {
                config.warnings.push(format!("ignoring non-string key {key:?}"));
                continue;
            };
            if name == WORKFLOW_KEY {
                config.workflow = parse_workflow(&value, &mut config.warnings);
                continue;
            }
            match serde_yaml_ng::from_value::<RoleSettings>(value) {
                Ok(settings) => {
                    if name.parse::<Role>().is_err() {
                        config.warnings.push(format!("unknown role '{name}' in agent config"));
                    }
                    config.roles.insert(name.to_string(), settings);
                }
                Err(e) => config
                    .warnings
                    .push(format!("ignoring role '{name}': {e}")),
            }
        }
        Ok(config)
    }

    /// Settings for `role`, if the file defines any.
    pub fn role(&self, role: Role) -> Option<&RoleSettings> {
        let key: &str = role.as_ref();
        self.roles.get(key)
    }

    /// Roles named in `workflow` that this crate knows, in file order.
    /// `None` when the file has no workflow.
    pub fn sequence(&self) -> Option<Vec<Role>> {
        self.workflow.as_ref().map(|names| {
            names
                .iter()
                .filter_map(|name| name.parse::<Role>().ok())
                .collect()
        })
    }
}

fn parse_workflow(value: &YamlValue, warnings: &mut Vec<String>) -> Option<Vec<String>> {
    let list = match value {
        YamlValue::Sequence(items) => items,
        YamlValue::Mapping(map) => match map.get("sequence") {
            Some(YamlValue::Sequence(items)) => items,
            _ => {
                warnings.push("workflow mapping has no 'sequence' list".to_string());
                return None;
            }
        },
        _ => {
            warnings.push("workflow must be a list or a mapping with 'sequence'".to_string());
            return None;
        }
    };

    let names: Vec<String> = list
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect();
    for name in &names {
        if name.parse::<Role>().is_err() {
            warnings.push(format!("unknown workflow stage '{name}'"));
        }
    }
    Some(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
implementation_agent:
  model: gpt-4o
  temperature: 0.3
  description: Proposes the change
review_agent:
  model: gpt-4o-mini
workflow:
  sequence: [implementation_agent, review_agent, publish_agent]
";

    #[test]
    fn parses_roles_and_workflow() {
        let config = AgentsConfig::from_yaml_str(SAMPLE).unwrap();
        let implementation = config.role(Role::Implementation).unwrap();
        assert_eq!(implementation.model.as_deref(), Some("gpt-4o"));
        assert_eq!(implementation.temperature, Some(0.3));
        assert_eq!(
            config.role(Role::Review).unwrap().model.as_deref(),
            Some("gpt-4o-mini")
        );
        assert!(config.role(Role::Doc).is_none());
        assert_eq!(
            config.sequence(),
            Some(vec![Role::Implementation, Role::Review])
        );
        assert!(config.warnings.iter().any(|w| w.contains("publish_agent")));
    }

    #[test]
    fn workflow_as_plain_list() {
        let config = AgentsConfig::from_yaml_str("workflow: [planner, reviewer]").unwrap();
        assert_eq!(config.sequence(), Some(vec![Role::Planner, Role::Reviewer]));
    }

    #[test]
    fn malformed_role_is_skipped() {
        let yaml = "review_agent: 42\ndoc_agent:\n  model: m\n";
        let config = AgentsConfig::from_yaml_str(yaml).unwrap();
        assert!(config.role(Role::Review).is_none());
        assert_eq!(config.role(Role::Doc).unwrap().model.as_deref(), Some("m"));
        assert_eq!(config.warnings.len(), 1);
    }

    #[test]
    fn scalar_root_is_empty() {
        let config = AgentsConfig::from_yaml_str("just a string").unwrap();
        assert_eq!(config, AgentsConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(AgentsConfig::from_yaml_str("a: [unclosed").is_err());
    }

    #[test]
    fn missing_file_is_empty() {
        let config = AgentsConfig::load(Path::new("/tmp/revpipe_missing/agents.yaml")).unwrap();
        assert!(config.roles.is_empty());
        assert!(config.sequence().is_none());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents_config.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = AgentsConfig::load(&path).unwrap();
        assert_eq!(config.roles.len(), 2);
    }
}
