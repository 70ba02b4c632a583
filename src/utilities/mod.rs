//! Shared utilities: settings, errors, evaluators, console output, storage
//! paths and template interpolation.

pub mod config;
pub mod errors;
pub mod evaluators;
pub mod file_handler;
pub mod logger;
pub mod paths;
pub mod printer;
pub mod string_utils;
pub mod training_handler;
