//! Training data handler.
//!
//! Raw per-iteration outputs are collected under
//! `{agent_id: {iteration: entry}}` and later condensed into the trained
//! agents file the user names on the command line.

use std::io;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::utilities::file_handler::FileHandler;

/// File name for raw training data inside the storage directory.
pub const TRAINING_DATA_FILE: &str = "training_data.json";

/// Loads and saves crew training data.
#[derive(Debug, Clone)]
pub struct CrewTrainingHandler {
    file_handler: FileHandler,
}

impl CrewTrainingHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file_handler: FileHandler::new(path),
        }
    }

    /// Load the training data, or an empty object if nothing was saved yet.
    pub fn load(&self) -> io::Result<Value> {
        Ok(self
            .file_handler
            .load()?
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    pub fn save(&self, data: &Value) -> io::Result<()> {
        self.file_handler.save(data)
    }

    /// Record `entry` for `agent_id` at `iteration`, replacing any previous
    /// entry for the same iteration.
    pub fn append(&self, agent_id: &str, iteration: u32, entry: Value) -> io::Result<()> {
        let mut data = self.load()?;
        if !data.is_object() {
            data = Value::Object(Map::new());
        }
        if let Value::Object(ref mut agents) = data {
            let iterations = agents
                .entry(agent_id.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !iterations.is_object() {
                *iterations = Value::Object(Map::new());
            }
            if let Value::Object(ref mut map) = iterations {
                map.insert(iteration.to_string(), entry);
            }
        }
        self.save(&data)
    }

    /// Reset the stored data to an empty object.
    pub fn clear(&self) -> io::Result<()> {
        self.save(&Value::Object(Map::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_groups_by_agent_and_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let handler = CrewTrainingHandler::new(dir.path().join(TRAINING_DATA_FILE));

        handler.append("architect", 0, json!({"initial_output": "a"})).unwrap();
        handler.append("architect", 1, json!({"initial_output": "b"})).unwrap();
        handler.append("qa", 0, json!({"initial_output": "c"})).unwrap();

        let data = handler.load().unwrap();
        assert_eq!(data["architect"]["0"]["initial_output"], "a");
        assert_eq!(data["architect"]["1"]["initial_output"], "b");
        assert_eq!(data["qa"]["0"]["initial_output"], "c");
    }

    #[test]
    fn test_clear_empties_data() {
        let dir = tempfile::tempdir().unwrap();
        let handler = CrewTrainingHandler::new(dir.path().join(TRAINING_DATA_FILE));
        handler.append("pm", 0, json!({})).unwrap();
        handler.clear().unwrap();
        assert_eq!(handler.load().unwrap(), json!({}));
    }
}
