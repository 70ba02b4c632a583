//! Persistent storage for crew executions.

pub mod kickoff_task_outputs_storage;

pub use kickoff_task_outputs_storage::{KickoffTaskOutput, KickoffTaskOutputsSQLiteStorage};
