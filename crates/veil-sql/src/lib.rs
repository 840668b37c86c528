//! # veil-sql
//!
//! Static analysis of SQL queries for access control decisions.
//!
//! A query is parsed with `sqlparser`, converted into the [`ast`] used here,
//! and then annotated by a [`pipeline`] of [`passes`]: column binding,
//! correlated subquery detection, aggregate classification, type checking
//! and equality constraint collection. An output pass finally extracts the
//! result.
//!
//! Most callers only need the [`Analyzer`]:
//!
//! ```no_run
//! use veil_core::{AnalyzerConfig, Schema};
//! use veil_sql::Analyzer;
//!
//! let schema = Schema::parse("CREATE TABLE t (a NUMERIC, b STRING);")?;
//! let analyzer = Analyzer::new(schema, AnalyzerConfig::default())?;
//! let report = analyzer.analyze("SELECT b FROM t WHERE a = 1")?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analyzer;
pub mod ast;
pub mod convert;
pub mod error;
pub mod passes;
pub mod pipeline;

pub use analyzer::Analyzer;
pub use ast::Statement;
pub use convert::{ConvertOptions, parse_statement};
pub use error::{AnalysisError, PipelineError};
pub use passes::{AnalysisReport, ConstraintKind, ConstraintReport, QueryShape};
pub use pipeline::{OutputPass, PassId, Pipeline, PipelineBuilder, TransformationPass};
