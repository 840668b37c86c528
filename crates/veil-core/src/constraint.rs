//! Equality constraints between constants and base columns.
//!
//! Equi-join and filter predicates (`a.x = b.y`, `a.x = 5`) are recorded as
//! an [`EqualityConstraint`] over two [`EqualityArg`]s. Consumers inspect a
//! constraint through an [`EqualityConstraintMatcher`], which receives the
//! four argument-kind combinations as separate cases.

use crate::scope::ColumnId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal appearing in a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstantValue {
    /// Numeric literal, kept in its source spelling.
    Numeric(String),
    String(String),
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Numeric(n) => f.write_str(n),
            ConstantValue::String(s) => write!(f, "'{}'", s),
        }
    }
}

/// A base column used as an equality argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseColumnArg {
    pub column: ColumnId,
    /// `alias.name` of the column, for display.
    pub name: String,
}

impl BaseColumnArg {
    pub fn new(column: ColumnId, name: impl Into<String>) -> Self {
        Self {
            column,
            name: name.into(),
        }
    }
}

/// One side of an equality constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EqualityArg {
    Constant(ConstantValue),
    BaseColumn(BaseColumnArg),
}

impl fmt::Display for EqualityArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EqualityArg::Constant(value) => value.fmt(f),
            EqualityArg::BaseColumn(column) => f.write_str(&column.name),
        }
    }
}

/// Receives an [`EqualityConstraint`] split by argument kind.
pub trait EqualityConstraintMatcher {
    type Output;

    fn match_constants(&mut self, left: &ConstantValue, right: &ConstantValue) -> Self::Output;

    fn match_constant_column(
        &mut self,
        left: &ConstantValue,
        right: &BaseColumnArg,
    ) -> Self::Output;

    fn match_column_constant(
        &mut self,
        left: &BaseColumnArg,
        right: &ConstantValue,
    ) -> Self::Output;

    fn match_columns(&mut self, left: &BaseColumnArg, right: &BaseColumnArg) -> Self::Output;
}

/// `left = right`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EqualityConstraint {
    pub left: EqualityArg,
    pub right: EqualityArg,
}

impl EqualityConstraint {
    pub fn new(left: EqualityArg, right: EqualityArg) -> Self {
        Self { left, right }
    }

    pub fn apply<M: EqualityConstraintMatcher>(&self, matcher: &mut M) -> M::Output {
        use EqualityArg::*;
        match (&self.left, &self.right) {
            (Constant(l), Constant(r)) => matcher.match_constants(l, r),
            (Constant(l), BaseColumn(r)) => matcher.match_constant_column(l, r),
            (BaseColumn(l), Constant(r)) => matcher.match_column_constant(l, r),
            (BaseColumn(l), BaseColumn(r)) => matcher.match_columns(l, r),
        }
    }
}

impl fmt::Display for EqualityConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Eq({}, {})", self.left, self.right)
    }
}
