//! CLI subcommand implementations.

pub mod history;
pub mod indices;
pub mod returns;
