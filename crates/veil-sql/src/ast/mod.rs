//! Query AST consumed by the analysis pipeline.
//!
//! Nodes are produced by [`crate::convert`] and annotated in place by the
//! pipeline's passes: column references are bound to columns, and
//! expressions and query blocks receive their [`Type`] and [`AggType`].

mod expr;
mod select;
pub mod visit;

pub use expr::{
    AggregateFunction, BinaryOp, ColumnRef, Expr, ExprKind, OperatorClass, Quantifier, SubSelect,
};
pub use select::{
    FromItem, JoinKind, PlainSelect, SelectItem, SelectItemKind, SelectStmt, SetOperation,
    SetOperator,
};

use veil_core::{AggType, ScopeTree, SqlError, Type};

/// Per-node annotations. Each is written once by the pass that owns it.
#[derive(Debug, Clone, Default)]
pub struct NodeInfo {
    agg_type: Option<AggType>,
    node_type: Option<Type>,
}

impl NodeInfo {
    pub fn agg_type(&self) -> Result<AggType, SqlError> {
        self.agg_type.ok_or_else(|| {
            SqlError::Unannotated("AggType hasn't yet been set for expression".to_string())
        })
    }

    pub fn node_type(&self) -> Result<&Type, SqlError> {
        self.node_type
            .as_ref()
            .ok_or_else(|| SqlError::Unannotated("Type hasn't yet been set for expression".to_string()))
    }

    pub fn has_agg_type(&self) -> bool {
        self.agg_type.is_some()
    }

    pub fn has_type(&self) -> bool {
        self.node_type.is_some()
    }

    pub(crate) fn set_agg_type(&mut self, agg_type: AggType) {
        debug_assert!(self.agg_type.is_none(), "aggregate type written twice");
        self.agg_type = Some(agg_type);
    }

    pub(crate) fn set_type(&mut self, node_type: Type) {
        debug_assert!(self.node_type.is_none(), "type written twice");
        self.node_type = Some(node_type);
    }
}

/// One analyzed `SELECT` statement together with the scopes it declares.
#[derive(Debug)]
pub struct Statement {
    pub body: SelectStmt,
    pub scopes: ScopeTree,
}

impl Statement {
    pub fn new(body: SelectStmt, scopes: ScopeTree) -> Self {
        Self { body, scopes }
    }

    /// Output names of the top-level query, available after column resolution.
    pub fn column_names(&self) -> Option<&[Option<String>]> {
        self.scopes.output(self.body.output()).names()
    }
}
