//! Pipeline framework.
//!
//! A [`Pipeline`] converts SQL text into a [`Statement`], runs an ordered
//! list of [`TransformationPass`]es over it, and finishes with exactly one
//! [`OutputPass`] that extracts the result. Pass dependencies are declared as
//! lists of [`PassId`]s and checked by [`PipelineBuilder`] as each pass is
//! added, so a mis-wired pipeline fails before any query is analyzed.

use crate::ast::Statement;
use crate::convert::{ConvertOptions, parse_statement};
use crate::error::PipelineError;
use std::collections::HashSet;
use std::fmt;
use veil_core::SqlError;

/// Identifies a transformation pass for dependency checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PassId(pub &'static str);

impl PassId {
    pub const COLUMN_RESOLVER: PassId = PassId("column-resolver");
    pub const CORRELATED_COLUMNS: PassId = PassId("correlated-column-finder");
    pub const AGG_TYPE_CHECKER: PassId = PassId("agg-type-checker");
    pub const TYPE_CHECKER: PassId = PassId("type-checker");
    pub const EQUALITY_CONSTRAINTS: PassId = PassId("equality-constraint-collector");
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A pass that annotates the AST in place.
pub trait TransformationPass {
    fn id(&self) -> PassId;

    /// Passes that must run before this one.
    fn dependencies(&self) -> &'static [PassId] {
        &[]
    }

    fn execute(&self, statement: &mut Statement) -> Result<(), SqlError>;
}

/// The final pass of a pipeline. It reads the annotated AST and produces
/// the pipeline's result without modifying anything.
pub trait OutputPass {
    type Output;

    fn dependencies(&self) -> &'static [PassId] {
        &[]
    }

    fn execute(&self, statement: &Statement) -> Result<Self::Output, SqlError>;
}

/// An assembled pipeline producing values of type `T`.
pub struct Pipeline<T> {
    options: ConvertOptions,
    transformations: Vec<Box<dyn TransformationPass>>,
    output: Box<dyn OutputPass<Output = T>>,
}

impl<T> Pipeline<T> {
    pub fn builder() -> PipelineBuilder<T> {
        PipelineBuilder::new()
    }

    /// Parse `sql` and run every pass over it.
    pub fn execute(&self, sql: &str) -> Result<T, SqlError> {
        let statement = parse_statement(sql, self.options)?;
        self.execute_statement(statement)
    }

    /// Run every pass over an already converted statement.
    pub fn execute_statement(&self, mut statement: Statement) -> Result<T, SqlError> {
        for pass in &self.transformations {
            tracing::debug!(pass = %pass.id(), "running transformation");
            pass.execute(&mut statement)?;
        }
        self.output.execute(&statement)
    }

    /// Identifiers of the transformations, in execution order.
    pub fn pass_ids(&self) -> Vec<PassId> {
        self.transformations.iter().map(|p| p.id()).collect()
    }
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("options", &self.options)
            .field("transformations", &self.pass_ids())
            .finish_non_exhaustive()
    }
}

/// Builds a [`Pipeline`], validating dependencies as passes are added.
pub struct PipelineBuilder<T> {
    options: ConvertOptions,
    transformations: Vec<Box<dyn TransformationPass>>,
    added: HashSet<PassId>,
    output: Option<Box<dyn OutputPass<Output = T>>>,
}

impl<T> fmt::Debug for PipelineBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<PassId> = self.transformations.iter().map(|p| p.id()).collect();
        f.debug_struct("PipelineBuilder")
            .field("options", &self.options)
            .field("transformations", &ids)
            .field("has_output", &self.output.is_some())
            .finish()
    }
}

impl<T> Default for PipelineBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PipelineBuilder<T> {
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            transformations: Vec::new(),
            added: HashSet::new(),
            output: None,
        }
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn add_transformation(
        mut self,
        pass: impl TransformationPass + 'static,
    ) -> Result<Self, PipelineError> {
        let id = pass.id();
        if self.output.is_some() {
            return Err(PipelineError::TransformationAfterOutput(id));
        }
        self.check_dependencies(id, pass.dependencies())?;

        self.added.insert(id);
        self.transformations.push(Box::new(pass));
        Ok(self)
    }

    pub fn set_output(
        mut self,
        pass: impl OutputPass<Output = T> + 'static,
    ) -> Result<Self, PipelineError> {
        if self.output.is_some() {
            return Err(PipelineError::OutputAlreadySet);
        }
        self.check_dependencies(PassId("output"), pass.dependencies())?;

        self.output = Some(Box::new(pass));
        Ok(self)
    }

    pub fn build(self) -> Result<Pipeline<T>, PipelineError> {
        let output = self.output.ok_or(PipelineError::MissingOutput)?;
        Ok(Pipeline {
            options: self.options,
            transformations: self.transformations,
            output,
        })
    }

    fn check_dependencies(&self, pass: PassId, dependencies: &[PassId]) -> Result<(), PipelineError> {
        match dependencies.iter().find(|d| !self.added.contains(d)) {
            Some(dependency) => Err(PipelineError::UnsatisfiedDependency {
                pass,
                dependency: *dependency,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Record {
        id: PassId,
        deps: &'static [PassId],
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl TransformationPass for Record {
        fn id(&self) -> PassId {
            self.id
        }

        fn dependencies(&self) -> &'static [PassId] {
            self.deps
        }

        fn execute(&self, _statement: &mut Statement) -> Result<(), SqlError> {
            self.log.borrow_mut().push(self.id.0);
            Ok(())
        }
    }

    struct ItemCount;

    impl OutputPass for ItemCount {
        type Output = usize;

        fn execute(&self, statement: &Statement) -> Result<usize, SqlError> {
            Ok(match &statement.body {
                crate::ast::SelectStmt::Plain(select) => select.items.len(),
                crate::ast::SelectStmt::SetOperation(_) => 0,
            })
        }
    }

    const A: PassId = PassId("a");
    const B: PassId = PassId("b");

    fn record(id: PassId, deps: &'static [PassId], log: &Rc<RefCell<Vec<&'static str>>>) -> Record {
        Record {
            id,
            deps,
            log: Rc::clone(log),
        }
    }

    #[test]
    fn test_runs_in_added_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let pipeline = PipelineBuilder::new()
            .add_transformation(record(A, &[], &log))
            .unwrap()
            .add_transformation(record(B, &[A], &log))
            .unwrap()
            .set_output(ItemCount)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(pipeline.execute("SELECT 1, 2").unwrap(), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(pipeline.pass_ids(), vec![A, B]);
    }

    #[test]
    fn test_missing_dependency_fails_when_added() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let err = PipelineBuilder::<usize>::new()
            .add_transformation(record(B, &[A], &log))
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::UnsatisfiedDependency {
                pass: B,
                dependency: A
            }
        );
    }

    #[test]
    fn test_wiring_errors() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let builder = PipelineBuilder::new().set_output(ItemCount).unwrap();
        assert_eq!(
            builder.add_transformation(record(A, &[], &log)).unwrap_err(),
            PipelineError::TransformationAfterOutput(A)
        );

        let builder = PipelineBuilder::new().set_output(ItemCount).unwrap();
        assert_eq!(
            builder.set_output(ItemCount).unwrap_err(),
            PipelineError::OutputAlreadySet
        );

        assert_eq!(
            PipelineBuilder::<usize>::new().build().unwrap_err(),
            PipelineError::MissingOutput
        );
    }

    #[test]
    fn test_conversion_errors_surface() {
        let pipeline = PipelineBuilder::new()
            .set_output(ItemCount)
            .unwrap()
            .build()
            .unwrap();
        assert!(pipeline.execute("SELECT FROM WHERE").is_err());
    }
}
