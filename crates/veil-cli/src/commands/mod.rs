//! `veil` subcommands. Each returns the text to print on success.

pub mod analyze;
pub mod exec;
pub mod schema;
