//! The `Crew`: agents, ordered tasks and a process.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use md5::{Digest, Md5};

use crate::agent::Agent;
use crate::crews::crew_output::CrewOutput;
use crate::engine::OrchestrationEngine;
use crate::process::Process;
use crate::task::Task;
use crate::utilities::errors::{ConfigurationError, ExecutionError};

/// A group of agents and the ordered tasks they perform.
///
/// Task order is fixed at construction. A crew does not execute itself; the
/// `kickoff`/`train`/`replay`/`test` methods hand it to an
/// [`OrchestrationEngine`].
#[derive(Debug, Clone)]
pub struct Crew {
    pub name: String,
    pub agents: Vec<Arc<Agent>>,
    pub tasks: Vec<Task>,
    pub process: Process,
    pub verbose: bool,
}

impl Crew {
    /// Compose a crew.
    ///
    /// # Errors
    /// `ConfigurationError::UnknownAgent` if a task's agent is not one of
    /// `agents`.
    ///
    /// # Panics
    /// In debug builds, if two tasks share an output file. Callers build the
    /// task list from a binding table with one file per task.
    pub fn new(
        name: impl Into<String>,
        agents: Vec<Arc<Agent>>,
        tasks: Vec<Task>,
    ) -> Result<Self, ConfigurationError> {
        for task in &tasks {
            if !agents.iter().any(|a| a.name == task.agent.name) {
                return Err(ConfigurationError::UnknownAgent {
                    task: task.name.clone(),
                    agent: task.agent.name.clone(),
                });
            }
        }
        debug_assert!(
            {
                let mut files: Vec<&str> = tasks.iter().map(|t| t.output_file.as_str()).collect();
                files.sort_unstable();
                files.windows(2).all(|w| w[0] != w[1])
            },
            "output files must be distinct per task"
        );

        Ok(Self {
            name: name.into(),
            agents,
            tasks,
            process: Process::default(),
            verbose: false,
        })
    }

    pub fn with_process(mut self, process: Process) -> Self {
        self.process = process;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// MD5 over the agent keys and task keys, identifying the crew shape.
    pub fn key(&self) -> String {
        let mut source: Vec<String> = self.agents.iter().map(|a| a.key()).collect();
        source.extend(self.tasks.iter().map(|t| t.key()));
        let mut hasher = Md5::new();
        hasher.update(source.join("|").as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Find a task by name or id, with its position.
    pub fn find_task(&self, task_id: &str) -> Option<(usize, &Task)> {
        self.tasks.iter().enumerate().find(|(_, t)| t.matches(task_id))
    }

    // ---- Engine entry points ----

    /// Execute the crew to completion.
    pub fn kickoff(
        &self,
        engine: &dyn OrchestrationEngine,
        inputs: &HashMap<String, String>,
    ) -> Result<CrewOutput, ExecutionError> {
        engine.kickoff(self, inputs)
    }

    /// Execute the crew `n_iterations` times in training mode, saving the
    /// trained agent data to `filename`.
    pub fn train(
        &self,
        engine: &dyn OrchestrationEngine,
        n_iterations: u32,
        filename: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<(), ExecutionError> {
        engine.train(self, n_iterations, filename, inputs)
    }

    /// Re-execute the crew starting at `task_id`.
    pub fn replay(
        &self,
        engine: &dyn OrchestrationEngine,
        task_id: &str,
    ) -> Result<(), ExecutionError> {
        engine.replay(self, task_id)
    }

    /// Execute the crew `n_iterations` times, scoring every task with
    /// `eval_llm`.
    pub fn test(
        &self,
        engine: &dyn OrchestrationEngine,
        n_iterations: u32,
        eval_llm: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<(), ExecutionError> {
        engine.test(self, n_iterations, eval_llm, inputs)
    }
}

impl fmt::Display for Crew {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Crew(name={}, process={}, number_of_agents={}, number_of_tasks={})",
            self.name,
            self.process,
            self.agents.len(),
            self.tasks.len()
        )
    }
}
