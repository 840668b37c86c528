//! `veil analyze` command implementation.

use anyhow::{Context, Result, bail};
use std::fmt::Write;
use std::path::Path;
use veil_core::AnalyzerConfig;
use veil_sql::{AnalysisReport, Analyzer};

use super::schema;

pub fn run(
    schema_path: Option<&Path>,
    config_path: Option<&Path>,
    json: bool,
    sql: &str,
) -> Result<String> {
    let config = match config_path {
        Some(path) => AnalyzerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };

    let schema = match (schema_path, &config.schema_file) {
        (Some(path), _) => schema::load(path)?,
        (None, Some(path)) => schema::load(path)?,
        (None, None) => bail!("no schema given: pass --schema or set schema_file in the config"),
    };

    let analyzer = Analyzer::new(schema, config)?;
    let report = analyzer.analyze(sql)?;

    if json {
        let mut out = serde_json::to_string_pretty(&report)?;
        out.push('\n');
        Ok(out)
    } else {
        render(&report)
    }
}

fn render(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "columns:")?;
    for (i, name) in report.column_names.iter().enumerate() {
        let name = name.as_deref().unwrap_or("?");
        match &report.shape {
            Some(shape) => match shape.column_types.get(i) {
                Some(column_type) => writeln!(out, "  {} {}", name, column_type)?,
                None => writeln!(out, "  {}", name)?,
            },
            None => writeln!(out, "  {}", name)?,
        }
    }
    if let Some(shape) = &report.shape {
        writeln!(out, "rows: {}", shape.row_count)?;
    }
    if let Some(agg_type) = &report.agg_type {
        writeln!(out, "aggregate: {}", agg_type)?;
    }
    if let Some(blocks) = &report.constraints {
        writeln!(out, "constraints:")?;
        for (i, block) in blocks.iter().enumerate() {
            for constraint in block {
                writeln!(out, "  [{}] Eq({}, {})", i, constraint.left, constraint.right)?;
            }
        }
    }
    Ok(out)
}
