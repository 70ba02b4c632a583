//! Agents: role-played personas that execute tasks.

pub mod core;

pub use self::core::Agent;
