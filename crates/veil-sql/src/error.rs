//! Error types for the analysis pipeline.

use crate::pipeline::PassId;
use thiserror::Error;
use veil_core::SqlError;

/// Errors raised while assembling a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A pass was added before one of the passes it reads annotations from.
    #[error("pass {pass} depends on {dependency}, which has not been added")]
    UnsatisfiedDependency { pass: PassId, dependency: PassId },

    #[error("cannot add transformation {0} after the output pass")]
    TransformationAfterOutput(PassId),

    #[error("output pass is already set")]
    OutputAlreadySet,

    #[error("pipeline has no output pass")]
    MissingOutput,
}

/// Everything that can go wrong analyzing a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Sql(#[from] SqlError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
