//! Orchestration engines.
//!
//! A [`Crew`] only describes who does what in which order. Running it is the
//! job of an [`OrchestrationEngine`]; [`LocalEngine`] executes tasks
//! sequentially in-process against an LLM backend.

pub mod local;

use std::collections::HashMap;

use crate::crew::Crew;
use crate::crews::crew_output::CrewOutput;
use crate::utilities::errors::ExecutionError;

pub use local::LocalEngine;

/// Executes crews.
pub trait OrchestrationEngine: Send + Sync {
    /// Run every task of `crew` in order with `inputs` interpolated, writing
    /// each task's output file.
    fn kickoff(
        &self,
        crew: &Crew,
        inputs: &HashMap<String, String>,
    ) -> Result<CrewOutput, ExecutionError>;

    /// Run `crew` `n_iterations` times and save what the agents learned to
    /// `filename`.
    fn train(
        &self,
        crew: &Crew,
        n_iterations: u32,
        filename: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<(), ExecutionError>;

    /// Re-run `crew` from the task identified by `task_id`, reusing the
    /// stored outputs of the tasks before it.
    fn replay(&self, crew: &Crew, task_id: &str) -> Result<(), ExecutionError>;

    /// Run `crew` `n_iterations` times and score every task with `eval_llm`.
    fn test(
        &self,
        crew: &Crew,
        n_iterations: u32,
        eval_llm: &str,
        inputs: &HashMap<String, String>,
    ) -> Result<(), ExecutionError>;
}
