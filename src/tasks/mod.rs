//! Task results.

pub mod task_output;

pub use task_output::TaskOutput;
