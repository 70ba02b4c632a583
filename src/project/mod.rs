//! Crew projects: configuration-backed agent and task registries.
//!
//! A project keeps its agent personas in `agents.yaml` and its task
//! descriptions in `tasks.yaml`. [`CrewBase`] holds both mappings; a concrete
//! crew such as [`SoftwareDevelopmentCrew`] resolves fixed names against them.

pub mod software_development;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utilities::errors::ConfigurationError;

pub use software_development::SoftwareDevelopmentCrew;

/// Default agents configuration file name.
pub const AGENTS_CONFIG_FILE: &str = "agents.yaml";
/// Default tasks configuration file name.
pub const TASKS_CONFIG_FILE: &str = "tasks.yaml";

/// One entry of `agents.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default)]
    pub tools: Vec<String>,
    /// Model override for this agent.
    #[serde(default)]
    pub llm: Option<String>,
}

/// One entry of `tasks.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub description: String,
    pub expected_output: String,
    /// Informational only; the crew decides the binding.
    #[serde(default)]
    pub agent: Option<String>,
}

/// Agent and task configuration of a crew project.
#[derive(Debug, Clone, Default)]
pub struct CrewBase {
    pub agents_config: HashMap<String, AgentConfig>,
    pub tasks_config: HashMap<String, TaskConfig>,
}

impl CrewBase {
    /// Load `agents.yaml` and `tasks.yaml` from `config_dir`.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigurationError> {
        let agents_path = config_dir.join(AGENTS_CONFIG_FILE);
        let tasks_path = config_dir.join(TASKS_CONFIG_FILE);
        let base = Self {
            agents_config: load_yaml(&agents_path)?,
            tasks_config: load_yaml(&tasks_path)?,
        };
        log::debug!(
            "Loaded {} agent(s) from {} and {} task(s) from {}",
            base.agents_config.len(),
            agents_path.display(),
            base.tasks_config.len(),
            tasks_path.display()
        );
        Ok(base)
    }

    pub fn agent_config(&self, name: &str) -> Result<&AgentConfig, ConfigurationError> {
        self.agents_config
            .get(name)
            .ok_or_else(|| ConfigurationError::MissingAgent {
                name: name.to_string(),
            })
    }

    pub fn task_config(&self, name: &str) -> Result<&TaskConfig, ConfigurationError> {
        self.tasks_config
            .get(name)
            .ok_or_else(|| ConfigurationError::MissingTask {
                name: name.to_string(),
            })
    }
}

fn load_yaml<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigurationError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_yaml(&content, path)
}

fn parse_yaml<T: serde::de::DeserializeOwned + Default>(
    content: &str,
    path: &Path,
) -> Result<T, ConfigurationError> {
    // An empty document is an empty mapping.
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(content).map_err(|source| ConfigurationError::Parse {
        path: PathBuf::from(path),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENTS: &str = r#"
product_manager:
  role: Product Manager
  goal: Define requirements for {project_type}
  backstory: Ships products.
  tools: [search]
software_architect:
  role: Software Architect
  goal: Design the system
  backstory: Designs systems.
  llm: openai/gpt-4o
"#;

    const TASKS: &str = r#"
requirements_analysis:
  description: Analyze {project_type}
  expected_output: Requirements
  agent: product_manager
"#;

    fn from_yaml(agents_yaml: &str, tasks_yaml: &str) -> Result<CrewBase, ConfigurationError> {
        Ok(CrewBase {
            agents_config: parse_yaml(agents_yaml, Path::new(AGENTS_CONFIG_FILE))?,
            tasks_config: parse_yaml(tasks_yaml, Path::new(TASKS_CONFIG_FILE))?,
        })
    }

    #[test]
    fn test_from_yaml_parses_entries() {
        let base = from_yaml(AGENTS, TASKS).unwrap();
        let pm = base.agent_config("product_manager").unwrap();
        assert_eq!(pm.role, "Product Manager");
        assert_eq!(pm.tools, vec!["search".to_string()]);
        assert!(pm.llm.is_none());
        assert_eq!(
            base.agent_config("software_architect").unwrap().llm.as_deref(),
            Some("openai/gpt-4o")
        );
        assert_eq!(
            base.task_config("requirements_analysis").unwrap().expected_output,
            "Requirements"
        );
    }

    #[test]
    fn test_missing_entries_are_configuration_errors() {
        let base = from_yaml(AGENTS, TASKS).unwrap();
        assert!(matches!(
            base.agent_config("qa_engineer"),
            Err(ConfigurationError::MissingAgent { .. })
        ));
        assert!(matches!(
            base.task_config("deployment_setup"),
            Err(ConfigurationError::MissingTask { .. })
        ));
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(AGENTS_CONFIG_FILE), AGENTS).unwrap();
        fs::write(dir.path().join(TASKS_CONFIG_FILE), TASKS).unwrap();
        let base = CrewBase::load(dir.path()).unwrap();
        assert_eq!(base.agents_config.len(), 2);
        assert_eq!(base.tasks_config.len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CrewBase::load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigurationError::Read { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = from_yaml("product_manager: [unclosed", TASKS).unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse { .. }));
    }

    #[test]
    fn test_entry_missing_required_field_is_parse_error() {
        let err = from_yaml("product_manager:\n  role: PM\n", TASKS).unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse { .. }));
    }
}
