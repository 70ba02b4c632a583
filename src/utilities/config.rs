//! Runtime settings.
//!
//! Settings come from the environment and can be overridden from the command
//! line. Agent and task definitions are not settings; they are loaded from
//! YAML by [`crate::project::CrewBase`].

use std::collections::HashMap;
use std::path::PathBuf;

use crate::process::Process;
use crate::utilities::errors::ConfigurationError;
use crate::utilities::paths::db_storage_path;

/// Model used when neither `MODEL` nor `OPENAI_MODEL_NAME` is set.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default HTTP timeout for model calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 600.0;

/// Longest accepted HTTP timeout for model calls (one day), in seconds.
pub const MAX_TIMEOUT_SECS: f64 = 86_400.0;

/// Runtime settings for composing and executing the crew.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Default model for every agent without an `llm` override.
    pub model: String,
    /// API key for the OpenAI-compatible endpoint.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: Option<String>,
    /// Organization header sent with every request.
    pub organization: Option<String>,
    /// HTTP timeout for model calls, in seconds.
    pub timeout_secs: f64,
    /// Directory holding `agents.yaml` and `tasks.yaml`.
    pub config_dir: PathBuf,
    /// Directory task output files are written relative to.
    pub output_dir: PathBuf,
    /// Directory for kickoff outputs and raw training data.
    pub storage_dir: PathBuf,
    /// Execution process of the crew.
    pub process: Process,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            organization: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            config_dir: PathBuf::from("config"),
            output_dir: PathBuf::from("."),
            storage_dir: db_storage_path(),
            process: Process::default(),
        }
    }
}

impl Settings {
    /// Build settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build settings from an explicit variable map.
    ///
    /// Recognized keys: `MODEL`, `OPENAI_MODEL_NAME`, `OPENAI_API_KEY`,
    /// `OPENAI_API_BASE`, `OPENAI_BASE_URL`, `OPENAI_ORGANIZATION`,
    /// `CREW_LLM_TIMEOUT`,
    /// `CREW_CONFIG_DIR`, `CREW_OUTPUT_DIR`, `CREW_STORAGE_PATH`,
    /// `CREW_PROCESS`.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigurationError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut settings = Self::default();

        if let Some(model) = get("MODEL").or_else(|| get("OPENAI_MODEL_NAME")) {
            settings.model = model;
        }
        settings.api_key = get("OPENAI_API_KEY");
        settings.base_url = get("OPENAI_API_BASE").or_else(|| get("OPENAI_BASE_URL"));
        settings.organization = get("OPENAI_ORGANIZATION");
        if let Some(timeout) = get("CREW_LLM_TIMEOUT") {
            settings.timeout_secs = parse_timeout(&timeout)?;
        }
        if let Some(dir) = get("CREW_CONFIG_DIR") {
            settings.config_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("CREW_OUTPUT_DIR") {
            settings.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("CREW_STORAGE_PATH") {
            settings.storage_dir = PathBuf::from(dir);
        }
        if let Some(process) = get("CREW_PROCESS") {
            settings.process = process.parse()?;
        }

        Ok(settings)
    }
}

/// Parse a timeout in seconds. NaN, infinities, non-positive values and
/// values above [`MAX_TIMEOUT_SECS`] are rejected.
pub fn parse_timeout(value: &str) -> Result<f64, ConfigurationError> {
    match value.trim().parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs > 0.0 && secs <= MAX_TIMEOUT_SECS => Ok(secs),
        _ => Err(ConfigurationError::InvalidTimeout(value.to_string())),
    }
}
