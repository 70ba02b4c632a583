//! The `Agent` persona.

use std::collections::HashMap;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::utilities::string_utils::interpolate_only;

/// A role-played execution unit.
///
/// Built once per invocation from the agents configuration and shared
/// between tasks by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Configuration key of the agent (e.g. `software_architect`).
    pub name: String,
    /// Role of the agent.
    pub role: String,
    /// Objective of the agent.
    pub goal: String,
    /// Backstory of the agent.
    pub backstory: String,
    /// Tools at the agent's disposal, by name. Declared only; never invoked.
    #[serde(default)]
    pub tools: Vec<String>,
    /// Model override; the engine's default model is used when `None`.
    #[serde(default)]
    pub llm: Option<String>,
    /// Print progress for this agent's tasks.
    pub verbose: bool,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            tools: Vec::new(),
            llm: None,
            verbose: false,
        }
    }

    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_llm(mut self, llm: Option<String>) -> Self {
        self.llm = llm;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// MD5 of `role|goal|backstory`, computed on the uninterpolated persona.
    pub fn key(&self) -> String {
        let source = format!("{}|{}|{}", self.role, self.goal, self.backstory);
        let mut hasher = Md5::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Copy of the agent with `{placeholders}` in role, goal and backstory
    /// replaced from `inputs`.
    pub fn interpolated(&self, inputs: &HashMap<String, String>) -> Result<Agent, String> {
        Ok(Agent {
            role: interpolate_only(&self.role, inputs)?,
            goal: interpolate_only(&self.goal, inputs)?,
            backstory: interpolate_only(&self.backstory, inputs)?,
            ..self.clone()
        })
    }

    /// System prompt presenting the persona to the model.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role.trim(),
            self.backstory.trim(),
            self.goal.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn architect() -> Agent {
        Agent::new(
            "software_architect",
            "Software Architect for {project_type}",
            "Design a scalable architecture",
            "Twenty years of distributed systems.",
        )
    }

    #[test]
    fn test_interpolated_replaces_placeholders() {
        let mut inputs = HashMap::new();
        inputs.insert("project_type".to_string(), "Todo App".to_string());
        let agent = architect().interpolated(&inputs).unwrap();
        assert_eq!(agent.role, "Software Architect for Todo App");
        assert_eq!(agent.name, "software_architect");
    }

    #[test]
    fn test_interpolated_missing_input_fails() {
        assert!(architect().interpolated(&HashMap::new()).is_err());
    }

    #[test]
    fn test_key_is_stable_md5() {
        let a = architect();
        assert_eq!(a.key(), architect().key());
        assert_eq!(a.key().len(), 32);
    }

    #[test]
    fn test_system_prompt_contains_persona() {
        let prompt = architect().system_prompt();
        assert!(prompt.starts_with("You are Software Architect"));
        assert!(prompt.contains("Your personal goal is: Design a scalable architecture"));
    }
}
