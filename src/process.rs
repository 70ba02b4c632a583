//! Process types for crew execution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utilities::errors::ConfigurationError;

/// How the tasks of a crew are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// Tasks are executed one after another in declaration order.
    #[default]
    Sequential,
    /// A manager agent delegates tasks to other agents.
    Hierarchical,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Process::Sequential => write!(f, "sequential"),
            Process::Hierarchical => write!(f, "hierarchical"),
        }
    }
}

impl FromStr for Process {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Process::Sequential),
            "hierarchical" => Ok(Process::Hierarchical),
            other => Err(ConfigurationError::InvalidProcess(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sequential() {
        assert_eq!(Process::default(), Process::Sequential);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Hierarchical".parse::<Process>().unwrap(), Process::Hierarchical);
        assert_eq!(" sequential ".parse::<Process>().unwrap(), Process::Sequential);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "consensual".parse::<Process>().unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidProcess(ref p) if p == "consensual"));
    }
}
