//! Crew output representation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tasks::task_output::TaskOutput;

/// The result of a crew kickoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrewOutput {
    /// Raw output of the final task.
    pub raw: String,
    /// Output of each task, in execution order.
    pub tasks_output: Vec<TaskOutput>,
}

impl CrewOutput {
    /// Build a crew output from task outputs; `raw` is the last non-empty
    /// task output.
    pub fn from_task_outputs(tasks_output: Vec<TaskOutput>) -> Self {
        let raw = tasks_output
            .iter()
            .rev()
            .find(|t| !t.raw.is_empty())
            .map(|t| t.raw.clone())
            .unwrap_or_default();
        Self { raw, tasks_output }
    }

    /// Output files written during the kickoff, in task order.
    pub fn output_files(&self) -> Vec<&str> {
        self.tasks_output
            .iter()
            .map(|t| t.output_file.as_str())
            .collect()
    }
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
