//! Standard analysis pipeline, assembled from an [`AnalyzerConfig`].

use crate::convert::ConvertOptions;
use crate::error::{AnalysisError, PipelineError};
use crate::passes::{
    AggTypeChecker, AnalysisReport, AnalysisReportOutput, ColumnResolver, CorrelatedColumnFinder,
    EqualityConstraintCollector, EqualityConstraintOutput, QueryShape, ResultTypeOutput,
    TypeChecker,
};
use crate::pipeline::{OutputPass, Pipeline};
use tracing::{debug, warn};
use veil_core::{AnalyzerConfig, EqualityConstraint, Schema};

/// Runs the configured passes over SQL text against a fixed schema.
///
/// Each call builds a fresh pipeline, so one analyzer can be reused for any
/// number of queries. Analyzers share nothing with each other.
#[derive(Debug, Clone)]
pub struct Analyzer {
    schema: Schema,
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create an analyzer, failing if the enabled passes are mis-wired
    /// (e.g. type checking enabled with aggregate checking disabled).
    pub fn new(schema: Schema, config: AnalyzerConfig) -> Result<Self, PipelineError> {
        let toggles = &config.passes;
        for (name, enabled) in [
            ("correlated_columns", toggles.correlated_columns),
            ("aggregate_check", toggles.aggregate_check),
            ("type_check", toggles.type_check),
            ("equality_constraints", toggles.equality_constraints),
        ] {
            if !enabled {
                warn!(pass = name, "analysis pass disabled by configuration");
            }
        }

        let analyzer = Self { schema, config };
        analyzer.pipeline(AnalysisReportOutput)?;
        Ok(analyzer)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Assemble the enabled transformations followed by `output`.
    pub fn pipeline<T>(
        &self,
        output: impl OutputPass<Output = T> + 'static,
    ) -> Result<Pipeline<T>, PipelineError> {
        let passes = &self.config.passes;
        let mut builder = Pipeline::builder()
            .with_options(ConvertOptions {
                allow_unsupported_joins: self.config.allow_unsupported_joins,
            })
            .add_transformation(ColumnResolver::new(self.schema.clone()))?;

        if passes.correlated_columns {
            builder = builder.add_transformation(CorrelatedColumnFinder)?;
        }
        if passes.aggregate_check {
            builder = builder.add_transformation(AggTypeChecker)?;
        }
        if passes.type_check {
            builder = builder.add_transformation(TypeChecker)?;
        }
        if passes.equality_constraints {
            builder = builder.add_transformation(EqualityConstraintCollector)?;
        }

        let pipeline = builder.set_output(output)?.build()?;
        debug!(passes = ?pipeline.pass_ids(), "built pipeline");
        Ok(pipeline)
    }

    /// Run every enabled pass and report what they found.
    pub fn analyze(&self, sql: &str) -> Result<AnalysisReport, AnalysisError> {
        Ok(self.pipeline(AnalysisReportOutput)?.execute(sql)?)
    }

    /// Result columns of `sql`. Requires type checking.
    pub fn shape(&self, sql: &str) -> Result<QueryShape, AnalysisError> {
        Ok(self.pipeline(ResultTypeOutput)?.execute(sql)?)
    }

    /// Equality constraints of each query block of `sql`. Requires
    /// constraint collection.
    pub fn constraints(&self, sql: &str) -> Result<Vec<Vec<EqualityConstraint>>, AnalysisError> {
        Ok(self.pipeline(EqualityConstraintOutput)?.execute(sql)?)
    }
}
