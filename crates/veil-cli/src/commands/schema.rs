//! `veil schema` command implementation.

use anyhow::{Context, Result};
use std::fmt::Write;
use std::fs;
use std::path::Path;
use veil_core::Schema;

pub fn load(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file {}", path.display()))?;
    Schema::parse(&text).with_context(|| format!("invalid schema file {}", path.display()))
}

pub fn run(path: &Path) -> Result<String> {
    let schema = load(path)?;
    tracing::debug!(relations = schema.len(), "parsed schema");

    let mut out = String::new();
    for relation in schema.relations() {
        writeln!(out, "{}", relation)?;
    }
    Ok(out)
}
