//! The Software Development Crew.
//!
//! Six agents, six tasks, one fixed task → agent → output file table.

use std::sync::Arc;

use crate::agent::Agent;
use crate::crew::Crew;
use crate::process::Process;
use crate::project::CrewBase;
use crate::task::Task;
use crate::utilities::errors::ConfigurationError;

pub const CREW_NAME: &str = "Software Development Crew";

/// Agent names in declaration order.
pub const AGENT_NAMES: [&str; 6] = [
    "product_manager",
    "software_architect",
    "backend_developer",
    "frontend_developer",
    "qa_engineer",
    "devops_engineer",
];

/// Binds a task to its agent and output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskBinding {
    pub task: &'static str,
    pub agent: &'static str,
    pub output_file: &'static str,
}

/// Tasks in execution order.
pub const TASK_BINDINGS: [TaskBinding; 6] = [
    TaskBinding {
        task: "requirements_analysis",
        agent: "product_manager",
        output_file: "01_requirements_analysis.md",
    },
    TaskBinding {
        task: "system_architecture",
        agent: "software_architect",
        output_file: "02_system_architecture.md",
    },
    TaskBinding {
        task: "backend_implementation",
        agent: "backend_developer",
        output_file: "03_backend_implementation.md",
    },
    TaskBinding {
        task: "frontend_implementation",
        agent: "frontend_developer",
        output_file: "04_frontend_implementation.md",
    },
    TaskBinding {
        task: "quality_assurance",
        agent: "qa_engineer",
        output_file: "05_quality_assurance.md",
    },
    TaskBinding {
        task: "deployment_setup",
        agent: "devops_engineer",
        output_file: "06_deployment_setup.md",
    },
];

/// Registries and composer for the Software Development Crew.
#[derive(Debug, Clone)]
pub struct SoftwareDevelopmentCrew {
    base: CrewBase,
    process: Process,
}

impl SoftwareDevelopmentCrew {
    pub fn new(base: CrewBase) -> Self {
        Self {
            base,
            process: Process::default(),
        }
    }

    pub fn with_process(mut self, process: Process) -> Self {
        self.process = process;
        self
    }

    /// Build one agent from its configuration entry. Agents are always verbose.
    pub fn agent(&self, name: &str) -> Result<Agent, ConfigurationError> {
        let config = self.base.agent_config(name)?;
        Ok(Agent::new(
            name,
            config.role.clone(),
            config.goal.clone(),
            config.backstory.clone(),
        )
        .with_tools(config.tools.clone())
        .with_llm(config.llm.clone())
        .verbose(true))
    }

    /// Build all six agents, in declaration order.
    pub fn agents(&self) -> Result<Vec<Arc<Agent>>, ConfigurationError> {
        AGENT_NAMES
            .iter()
            .map(|name| self.agent(name).map(Arc::new))
            .collect()
    }

    /// Build all six tasks, in execution order, bound to `agents`.
    pub fn tasks(&self, agents: &[Arc<Agent>]) -> Result<Vec<Task>, ConfigurationError> {
        TASK_BINDINGS
            .iter()
            .map(|binding| {
                let config = self.base.task_config(binding.task)?;
                if let Some(ref declared) = config.agent {
                    if declared != binding.agent {
                        log::debug!(
                            "Task '{}' declares agent '{}'; bound to '{}'",
                            binding.task,
                            declared,
                            binding.agent
                        );
                    }
                }
                let agent = agents
                    .iter()
                    .find(|a| a.name == binding.agent)
                    .cloned()
                    .ok_or_else(|| ConfigurationError::MissingAgent {
                        name: binding.agent.to_string(),
                    })?;
                Ok(Task::new(
                    binding.task,
                    config.description.clone(),
                    config.expected_output.clone(),
                    agent,
                    binding.output_file,
                ))
            })
            .collect()
    }

    /// Compose the crew: six agents, six tasks, the configured process,
    /// verbose logging on.
    pub fn crew(&self) -> Result<Crew, ConfigurationError> {
        let agents = self.agents()?;
        let tasks = self.tasks(&agents)?;
        Ok(Crew::new(CREW_NAME, agents, tasks)?
            .with_process(self.process)
            .with_verbose(true))
    }
}
