//! Subcommand implementations.

pub mod dump;
pub mod info;
pub mod script;
pub mod write;
