//! The `Task` unit of work.

use std::collections::HashMap;
use std::sync::Arc;

use md5::{Digest, Md5};
use uuid::Uuid;

use crate::agent::Agent;
use crate::utilities::string_utils::interpolate_only;

/// A unit of work bound to exactly one agent, persisted to one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Configuration key of the task (e.g. `system_architecture`).
    pub name: String,
    /// Stable identifier derived from the name.
    pub id: Uuid,
    /// Description template.
    pub description: String,
    /// Expected-output template.
    pub expected_output: String,
    /// Agent responsible for the task.
    pub agent: Arc<Agent>,
    /// File the task's output is written to.
    pub output_file: String,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: Arc<Agent>,
        output_file: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: Self::id_for(&name),
            name,
            description: description.into(),
            expected_output: expected_output.into(),
            agent,
            output_file: output_file.into(),
        }
    }

    /// UUIDv5 of a task name; the same name always yields the same id.
    pub fn id_for(name: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
    }

    /// Whether `task_id` refers to this task, by name or by id.
    pub fn matches(&self, task_id: &str) -> bool {
        let task_id = task_id.trim();
        self.name == task_id || self.id.to_string() == task_id.to_ascii_lowercase()
    }

    /// MD5 of `description|expected_output`, computed on the templates.
    pub fn key(&self) -> String {
        let source = format!("{}|{}", self.description, self.expected_output);
        let mut hasher = Md5::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Copy of the task with inputs interpolated into description, expected
    /// output and output file, bound to `agent`.
    pub fn interpolated(
        &self,
        inputs: &HashMap<String, String>,
        agent: Arc<Agent>,
    ) -> Result<Task, String> {
        Ok(Task {
            name: self.name.clone(),
            id: self.id,
            description: interpolate_only(&self.description, inputs)?,
            expected_output: interpolate_only(&self.expected_output, inputs)?,
            agent,
            output_file: interpolate_only(&self.output_file, inputs)?,
        })
    }

    /// User prompt for the task, with the outputs of earlier tasks as context.
    pub fn prompt(&self, context: Option<&str>) -> String {
        let mut prompt = format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            self.description.trim(),
            self.expected_output.trim()
        );
        if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            prompt.push_str(ctx);
        }
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        let agent = Arc::new(Agent::new("product_manager", "PM", "Goal", "Story"));
        Task::new(
            "requirements_analysis",
            "Analyze requirements for a {project_type}",
            "A requirements document for {project_type}",
            agent,
            "01_requirements_analysis.md",
        )
    }

    #[test]
    fn test_id_is_stable_for_name() {
        assert_eq!(task().id, Task::id_for("requirements_analysis"));
        assert_ne!(task().id, Task::id_for("system_architecture"));
    }

    #[test]
    fn test_matches_by_name_or_id() {
        let t = task();
        assert!(t.matches("requirements_analysis"));
        assert!(t.matches(&t.id.to_string()));
        assert!(t.matches(&t.id.to_string().to_uppercase()));
        assert!(!t.matches("system_architecture"));
    }

    #[test]
    fn test_interpolated_keeps_identity() {
        let mut inputs = HashMap::new();
        inputs.insert("project_type".to_string(), "Todo App".to_string());
        let t = task();
        let done = t.interpolated(&inputs, t.agent.clone()).unwrap();
        assert_eq!(done.description, "Analyze requirements for a Todo App");
        assert_eq!(done.expected_output, "A requirements document for Todo App");
        assert_eq!(done.output_file, "01_requirements_analysis.md");
        assert_eq!(done.id, t.id);
    }

    #[test]
    fn test_prompt_includes_context_only_when_present() {
        let t = task();
        assert!(!t.prompt(None).contains("context you're working with"));
        assert!(!t.prompt(Some("  ")).contains("context you're working with"));
        let with_ctx = t.prompt(Some("earlier output"));
        assert!(with_ctx.contains("expected criteria for your final answer"));
        assert!(with_ctx.ends_with("earlier output"));
    }
}
