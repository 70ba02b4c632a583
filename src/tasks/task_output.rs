//! Task output representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The result of one executed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Configuration key of the task.
    pub name: String,
    /// Interpolated task description.
    pub description: String,
    /// Interpolated expected output.
    pub expected_output: String,
    /// First ten words of the description followed by "...".
    pub summary: String,
    /// Raw text produced by the agent.
    pub raw: String,
    /// Role of the agent that executed the task.
    pub agent: String,
    /// Path the output was written to, as declared on the task.
    pub output_file: String,
}

impl TaskOutput {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: impl Into<String>,
        raw: impl Into<String>,
        output_file: impl Into<String>,
    ) -> Self {
        let description = description.into();
        let summary = Self::generate_summary(&description);
        Self {
            name: name.into(),
            description,
            expected_output: expected_output.into(),
            summary,
            raw: raw.into(),
            agent: agent.into(),
            output_file: output_file.into(),
        }
    }

    fn generate_summary(description: &str) -> String {
        let excerpt: String = description
            .split_whitespace()
            .take(10)
            .collect::<Vec<&str>>()
            .join(" ");
        format!("{}...", excerpt)
    }
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
