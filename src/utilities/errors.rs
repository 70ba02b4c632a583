//! Error types for the crew.
//!
//! Configuration problems are raised while the registries resolve agents and
//! tasks; execution problems are raised by the orchestration engine. Both
//! travel on the compose-and-execute path as [`CrewError`].

use std::path::PathBuf;

use thiserror::Error;

use crate::llms::base_llm::LlmError;
use crate::process::Process;

/// Errors raised while resolving configuration into agents, tasks and crews.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// An agent name is absent from the agents configuration.
    #[error("Agent '{name}' not found in agents configuration")]
    MissingAgent { name: String },

    /// A task name is absent from the tasks configuration.
    #[error("Task '{name}' not found in tasks configuration")]
    MissingTask { name: String },

    /// A task references an agent that is not part of the crew.
    #[error("Task '{task}' is assigned to agent '{agent}' which is not part of the crew")]
    UnknownAgent { task: String, agent: String },

    /// A configuration file could not be read.
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid YAML for its schema.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An unrecognized process name.
    #[error("Invalid process '{0}'. Must be one of: sequential, hierarchical")]
    InvalidProcess(String),

    /// The model call timeout is not a usable number of seconds.
    #[error("Invalid LLM timeout '{0}': expected a positive number of seconds up to {max}", max = crate::utilities::config::MAX_TIMEOUT_SECS)]
    InvalidTimeout(String),
}

/// Errors raised while validating entry-point arguments, before any engine call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    /// The iteration count is not an integer.
    #[error("Invalid number of iterations '{0}': expected a positive integer")]
    InvalidIterations(String),

    /// The iteration count is zero.
    #[error("Number of iterations must be at least 1")]
    ZeroIterations,

    /// A required string argument is empty.
    #[error("Argument '{0}' must not be empty")]
    Empty(&'static str),
}

/// Errors raised by the orchestration engine while executing a crew.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The language model call failed.
    #[error("LLM call failed for agent '{agent}': {source}")]
    Llm {
        agent: String,
        #[source]
        source: LlmError,
    },

    /// A template placeholder could not be resolved from the inputs.
    #[error("Failed to interpolate inputs: {0}")]
    Interpolation(String),

    /// A task output file could not be written.
    #[error("Failed to write output file {path}: {source}")]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing the kickoff task outputs store failed.
    #[error("Kickoff task output storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Reading or writing a JSON data file failed.
    #[error("Data file error for {path}: {message}")]
    DataFile { path: PathBuf, message: String },

    /// Serializing task data failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// There are no stored outputs from a previous kickoff.
    #[error("No previous kickoff task outputs found. Run the crew before replaying it.")]
    NothingToReplay,

    /// The replay task id matches no task in the crew or in the stored outputs.
    #[error("Task with id '{0}' not found in the crew's tasks")]
    TaskNotFound(String),

    /// The engine does not support the crew's process.
    #[error("Process '{0}' is not supported by this engine")]
    UnsupportedProcess(Process),

    /// The crew has no tasks to execute.
    #[error("Crew has no tasks to execute")]
    NoTasks,

    /// The evaluation model returned something that could not be parsed.
    #[error("Failed to parse evaluation response: {0}")]
    Evaluation(String),
}

/// Any error on the compose-and-execute path.
#[derive(Debug, Error)]
pub enum CrewError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
