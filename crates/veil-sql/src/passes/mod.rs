//! Analysis passes.
//!
//! Transformations, in the order a full pipeline runs them:
//!
//! 1. [`ColumnResolver`] binds tables and columns to scopes
//! 2. [`CorrelatedColumnFinder`] records outer columns used by subqueries
//! 3. [`AggTypeChecker`] classifies expressions as aggregate or not
//! 4. [`TypeChecker`] infers and checks expression types
//! 5. [`EqualityConstraintCollector`] records `l = r` predicates
//!
//! followed by one of the output passes in [`output`].

mod aggregate;
mod correlated;
mod equality;
pub mod output;
mod resolver;
mod typecheck;

pub use aggregate::AggTypeChecker;
pub use correlated::CorrelatedColumnFinder;
pub use equality::EqualityConstraintCollector;
pub use output::{
    AnalysisReport, AnalysisReportOutput, ConstraintKind, ConstraintReport,
    EqualityConstraintOutput, QueryShape, ResultTypeOutput,
};
pub use resolver::ColumnResolver;
pub use typecheck::TypeChecker;
