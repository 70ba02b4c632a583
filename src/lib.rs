//! # Software Development Crew
//!
//! Six role-played agents (product manager, software architect, backend and
//! frontend developers, QA engineer, DevOps engineer) that turn a one-line
//! project description into six Markdown documents, one per task, in a
//! fixed sequence.
//!
//! Agent personas and task descriptions live in `config/agents.yaml` and
//! `config/tasks.yaml`. The crew is composed by
//! [`project::SoftwareDevelopmentCrew`] and executed by an
//! [`engine::OrchestrationEngine`]; [`engine::LocalEngine`] runs it against an
//! OpenAI-compatible model. The [`cli`] module holds the `run`, `train`,
//! `replay` and `test` operations.

pub mod agent;
pub mod cli;
pub mod crew;
pub mod crews;
pub mod engine;
pub mod llms;
pub mod process;
pub mod project;
pub mod storage;
pub mod task;
pub mod tasks;
pub mod utilities;

pub use agent::Agent;
pub use crew::Crew;
pub use crews::crew_output::CrewOutput;
pub use engine::{LocalEngine, OrchestrationEngine};
pub use llms::base_llm::BaseLLM;
pub use process::Process;
pub use project::{CrewBase, SoftwareDevelopmentCrew};
pub use task::Task;
pub use tasks::task_output::TaskOutput;
pub use utilities::errors::{ArgumentError, ConfigurationError, CrewError, ExecutionError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
