//! LLM-backed evaluators for `test` and `train`.

pub mod crew_evaluator_handler;
pub mod task_evaluator;

pub use crew_evaluator_handler::CrewEvaluator;
pub use task_evaluator::{TaskEvaluator, TrainingTaskEvaluation};

use serde_json::Value;

/// Parse the first JSON object embedded in a model reply.
///
/// Models often wrap JSON in Markdown fences or prose; everything outside
/// the outermost braces is ignored.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&text[start..=end])
        .ok()
        .filter(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_from_fenced_reply() {
        let reply = "Here you go:\n```json\n{\"quality\": 8}\n```";
        let value = extract_json_object(reply).unwrap();
        assert_eq!(value["quality"], 8);
    }

    #[test]
    fn test_extract_json_object_none_without_braces() {
        assert!(extract_json_object("score: 7").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }
}
