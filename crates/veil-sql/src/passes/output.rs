//! Output passes: what a pipeline hands back to its caller.

use crate::ast::Statement;
use crate::pipeline::{OutputPass, PassId};
use serde::Serialize;
use veil_core::{
    AggType, BaseColumnArg, ConstantValue, EqualityConstraint, EqualityConstraintMatcher,
    PrimitiveType, RowCount, SqlError,
};

/// Column names and types of a query's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryShape {
    pub column_names: Vec<Option<String>>,
    pub column_types: Vec<PrimitiveType>,
    pub row_count: RowCount,
}

fn column_names(statement: &Statement) -> Result<Vec<Option<String>>, SqlError> {
    statement
        .column_names()
        .map(<[Option<String>]>::to_vec)
        .ok_or_else(|| SqlError::Unannotated("Output columns haven't been resolved".to_string()))
}

fn query_shape(statement: &Statement) -> Result<QueryShape, SqlError> {
    let output = statement
        .body
        .info()
        .node_type()?
        .coerce_to_schema_table()
        .ok_or_else(|| SqlError::must_be("schema table", &statement.body))?;
    Ok(QueryShape {
        column_names: column_names(statement)?,
        column_types: output.column_types,
        row_count: output.row_count,
    })
}

fn block_constraints(statement: &Statement) -> Result<Vec<Vec<EqualityConstraint>>, SqlError> {
    statement
        .body
        .blocks()
        .into_iter()
        .map(|block| {
            block.constraints().map(<[EqualityConstraint]>::to_vec).ok_or_else(|| {
                SqlError::Unannotated(format!("Constraints haven't been collected for: {}", block))
            })
        })
        .collect()
}

/// Yields the [`QueryShape`] of the analyzed query.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultTypeOutput;

impl OutputPass for ResultTypeOutput {
    type Output = QueryShape;

    fn dependencies(&self) -> &'static [PassId] {
        &[PassId::TYPE_CHECKER]
    }

    fn execute(&self, statement: &Statement) -> Result<QueryShape, SqlError> {
        query_shape(statement)
    }
}

/// Yields the equality constraints of every query block, in the order of
/// [`SelectStmt::blocks`](crate::ast::SelectStmt::blocks).
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualityConstraintOutput;

impl OutputPass for EqualityConstraintOutput {
    type Output = Vec<Vec<EqualityConstraint>>;

    fn dependencies(&self) -> &'static [PassId] {
        &[PassId::EQUALITY_CONSTRAINTS]
    }

    fn execute(&self, statement: &Statement) -> Result<Self::Output, SqlError> {
        block_constraints(statement)
    }
}

// =============================================================================
// Report
// =============================================================================

/// Which argument kinds an equality constraint relates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    ConstantConstant,
    ConstantColumn,
    ColumnConstant,
    ColumnColumn,
}

struct Classify;

impl EqualityConstraintMatcher for Classify {
    type Output = ConstraintKind;

    fn match_constants(&mut self, _: &ConstantValue, _: &ConstantValue) -> ConstraintKind {
        ConstraintKind::ConstantConstant
    }

    fn match_constant_column(&mut self, _: &ConstantValue, _: &BaseColumnArg) -> ConstraintKind {
        ConstraintKind::ConstantColumn
    }

    fn match_column_constant(&mut self, _: &BaseColumnArg, _: &ConstantValue) -> ConstraintKind {
        ConstraintKind::ColumnConstant
    }

    fn match_columns(&mut self, _: &BaseColumnArg, _: &BaseColumnArg) -> ConstraintKind {
        ConstraintKind::ColumnColumn
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintReport {
    pub left: String,
    pub right: String,
    pub kind: ConstraintKind,
}

impl From<&EqualityConstraint> for ConstraintReport {
    fn from(constraint: &EqualityConstraint) -> Self {
        Self {
            left: constraint.left.to_string(),
            right: constraint.right.to_string(),
            kind: constraint.apply(&mut Classify),
        }
    }
}

/// Everything the enabled passes found out about a query. Sections whose
/// pass did not run are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub column_names: Vec<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agg_type: Option<AggType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<QueryShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<Vec<ConstraintReport>>>,
}

/// Yields an [`AnalysisReport`]. Only column resolution is required.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisReportOutput;

impl OutputPass for AnalysisReportOutput {
    type Output = AnalysisReport;

    fn dependencies(&self) -> &'static [PassId] {
        &[PassId::COLUMN_RESOLVER]
    }

    fn execute(&self, statement: &Statement) -> Result<AnalysisReport, SqlError> {
        let info = statement.body.info();

        let agg_type = if info.has_agg_type() {
            Some(info.agg_type()?)
        } else {
            None
        };

        let shape = if info.has_type() {
            Some(query_shape(statement)?)
        } else {
            None
        };

        let blocks = statement.body.blocks();
        let constraints = if blocks.iter().all(|b| b.constraints().is_some()) {
            let collected = block_constraints(statement)?;
            Some(
                collected
                    .iter()
                    .map(|block| block.iter().map(ConstraintReport::from).collect())
                    .collect(),
            )
        } else {
            None
        };

        Ok(AnalysisReport {
            column_names: column_names(statement)?,
            agg_type,
            shape,
            constraints,
        })
    }
}
