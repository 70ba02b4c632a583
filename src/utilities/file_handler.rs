//! JSON data file handler used by training.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde_json::Value;

/// Reads and writes one JSON document at a fixed path.
#[derive(Debug, Clone)]
pub struct FileHandler {
    path: PathBuf,
}

impl FileHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the JSON document, or `None` if the file does not exist yet.
    pub fn load(&self) -> io::Result<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let value = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(value))
    }

    /// Save the JSON document, creating parent directories as needed.
    pub fn save(&self, data: &Value) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, content)
    }
}
