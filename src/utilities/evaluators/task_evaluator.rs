//! Turns the outputs an agent produced across training iterations into
//! reusable suggestions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::Agent;
use crate::llms::base_llm::{BaseLLM, LLMMessage};
use crate::utilities::errors::ExecutionError;
use crate::utilities::evaluators::extract_json_object;

/// The trained data saved for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingTaskEvaluation {
    /// Actionable instructions for the agent's future runs.
    pub suggestions: Vec<String>,
    /// Score from 0 to 10.
    pub quality: f64,
    pub final_summary: String,
}

/// Evaluates training data with a model on behalf of one agent.
#[derive(Debug)]
pub struct TaskEvaluator<'a> {
    llm: &'a dyn BaseLLM,
}

impl<'a> TaskEvaluator<'a> {
    pub fn new(llm: &'a dyn BaseLLM) -> Self {
        Self { llm }
    }

    /// Summarize `training_data` (iteration → recorded outputs) for `agent`.
    pub fn evaluate_training_data(
        &self,
        training_data: &Value,
        agent: &Agent,
    ) -> Result<TrainingTaskEvaluation, ExecutionError> {
        let mut aggregated = String::new();
        if let Some(iterations) = training_data.as_object() {
            for (iteration, entries) in iterations {
                for entry in entries.as_array().into_iter().flatten() {
                    let task = entry.get("task").and_then(Value::as_str).unwrap_or_default();
                    let output = entry.get("output").and_then(Value::as_str).unwrap_or_default();
                    aggregated.push_str(&format!(
                        "Iteration: {}\nTask: {}\nOutput:\n{}\n\n",
                        iteration, task, output
                    ));
                }
            }
        }

        let prompt = format!(
            "Assess the quality of the training data based on the outputs the agent produced \
             across iterations.\n\n{}\
             Please provide:\n\
             - A list of clear, actionable instructions to enhance the agent's performance. \
             Each instruction should be specific and easily implementable.\n\
             - A score from 0 to 10 evaluating on completion, quality, and overall performance.\n\
             - A final summary of what the agent should carry into future runs.\n\n\
             Respond only with JSON of the form \
             {{\"suggestions\": [\"...\"], \"quality\": <score>, \"final_summary\": \"...\"}}.",
            aggregated
        );
        let messages = vec![
            LLMMessage::system(format!(
                "You are Training Data Evaluator. You review the work of {} and extract \
                 lessons from it.\nYour personal goal is: improve the agent for its next run",
                agent.role.trim()
            )),
            LLMMessage::user(prompt),
        ];

        let reply = self.llm.call(messages).map_err(|source| ExecutionError::Llm {
            agent: agent.name.clone(),
            source,
        })?;
        parse_training_evaluation(&reply)
    }
}

/// Parse a training evaluation reply.
pub fn parse_training_evaluation(reply: &str) -> Result<TrainingTaskEvaluation, ExecutionError> {
    extract_json_object(reply)
        .and_then(|value| serde_json::from_value::<TrainingTaskEvaluation>(value).ok())
        .map(|mut evaluation| {
            evaluation.quality = evaluation.quality.clamp(0.0, 10.0);
            evaluation
        })
        .ok_or_else(|| ExecutionError::Evaluation(reply.chars().take(200).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llms::base_llm::LlmError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Capturing {
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BaseLLM for Capturing {
        fn model(&self) -> &str {
            "capturing"
        }

        fn call(&self, messages: Vec<LLMMessage>) -> Result<String, LlmError> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.extend(messages.into_iter().map(|m| m.content));
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_evaluate_training_data_aggregates_iterations() {
        let llm = Capturing {
            reply: r#"{"suggestions": ["Be concise"], "quality": 7, "final_summary": "Good"}"#
                .to_string(),
            prompts: Mutex::new(Vec::new()),
        };
        let agent = Agent::new("qa_engineer", "QA Engineer", "goal", "backstory");
        let data = json!({
            "0": [{"task": "quality_assurance", "output": "first plan"}],
            "1": [{"task": "quality_assurance", "output": "second plan"}]
        });

        let evaluation = TaskEvaluator::new(&llm)
            .evaluate_training_data(&data, &agent)
            .unwrap();
        assert_eq!(evaluation.suggestions, vec!["Be concise".to_string()]);
        assert_eq!(evaluation.quality, 7.0);

        let prompts = llm.prompts.lock().unwrap();
        let user = prompts.last().unwrap();
        assert!(user.contains("first plan"));
        assert!(user.contains("second plan"));
        assert!(prompts[0].contains("QA Engineer"));
    }

    #[test]
    fn test_parse_training_evaluation_rejects_prose() {
        assert!(matches!(
            parse_training_evaluation("looks fine to me"),
            Err(ExecutionError::Evaluation(_))
        ));
    }
}
