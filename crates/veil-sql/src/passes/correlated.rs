//! Finds the outer columns each subquery expression refers to.

use crate::ast::visit::{Visitor, walk_select};
use crate::ast::{Expr, ExprKind, PlainSelect, Statement};
use crate::pipeline::{PassId, TransformationPass};
use std::collections::HashMap;
use veil_core::{ColumnId, ScopeId, ScopeTree, SqlError};

/// Records, on every subquery expression, the columns declared by the query
/// block that contains it and referenced from inside the subquery.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelatedColumnFinder;

impl TransformationPass for CorrelatedColumnFinder {
    fn id(&self) -> PassId {
        PassId::CORRELATED_COLUMNS
    }

    fn dependencies(&self) -> &'static [PassId] {
        &[PassId::COLUMN_RESOLVER]
    }

    fn execute(&self, statement: &mut Statement) -> Result<(), SqlError> {
        let mut visitor = CorrelatedVisitor {
            scopes: &statement.scopes,
            stack: Vec::new(),
            open: HashMap::new(),
        };
        walk_select(&mut statement.body, &mut visitor)
    }
}

struct CorrelatedVisitor<'a> {
    scopes: &'a ScopeTree,
    stack: Vec<ScopeId>,
    /// Open subquery expressions, keyed by the scope that contains them.
    open: HashMap<ScopeId, Vec<ColumnId>>,
}

impl Visitor for CorrelatedVisitor<'_> {
    fn enter_select(&mut self, select: &mut PlainSelect) -> Result<(), SqlError> {
        let scope = select
            .scope
            .ok_or_else(|| SqlError::Unannotated(format!("Scope hasn't been set for: {}", select)))?;
        self.stack.push(scope);
        Ok(())
    }

    fn leave_select(&mut self, _select: &mut PlainSelect) -> Result<(), SqlError> {
        self.stack.pop();
        Ok(())
    }

    fn enter_expr(&mut self, expr: &mut Expr) -> Result<(), SqlError> {
        if let ExprKind::SubSelect(_) = expr.kind {
            if let Some(scope) = self.stack.last() {
                self.open.insert(*scope, Vec::new());
            }
        }
        Ok(())
    }

    fn leave_expr(&mut self, expr: &mut Expr) -> Result<(), SqlError> {
        match &mut expr.kind {
            ExprKind::Column(reference) => {
                let column = reference.column().ok_or_else(|| {
                    SqlError::Unannotated(format!("Column hasn't been resolved: {}", reference))
                })?;
                let declared_in = self.scopes.column_scope(column);
                if let Some(correlated) = self.open.get_mut(&declared_in) {
                    if !correlated.contains(&column) {
                        correlated.push(column);
                    }
                }
            }
            ExprKind::SubSelect(sub) => {
                if let Some(scope) = self.stack.last() {
                    sub.correlated = self.open.remove(scope).unwrap_or_default();
                    tracing::debug!(
                        correlated = sub.correlated.len(),
                        "found correlated columns"
                    );
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SelectStmt;
    use crate::convert::parse_statement;
    use crate::passes::ColumnResolver;
    use pretty_assertions::assert_eq;
    use veil_core::Schema;

    fn analyze(sql: &str) -> Statement {
        let schema = Schema::parse(
            "CREATE TABLE t (a NUMERIC, b STRING);\nCREATE TABLE u (a NUMERIC, c BOOL);",
        )
        .unwrap();
        let mut statement = parse_statement(sql, Default::default()).unwrap();
        ColumnResolver::new(schema).execute(&mut statement).unwrap();
        CorrelatedColumnFinder.execute(&mut statement).unwrap();
        statement
    }

    fn where_subselect(statement: &Statement) -> Vec<String> {
        let SelectStmt::Plain(select) = &statement.body else {
            panic!("expected plain select");
        };
        let selection = select.selection.as_ref().unwrap();
        let ExprKind::Exists { subquery, .. } = &selection.kind else {
            panic!("expected EXISTS");
        };
        let ExprKind::SubSelect(sub) = &subquery.kind else {
            panic!("expected subselect");
        };
        sub.correlated_columns()
            .iter()
            .map(|c| statement.scopes.column(*c).unwrap().qualified_name().to_string())
            .collect()
    }

    #[test]
    fn test_finds_outer_columns() {
        let statement =
            analyze("SELECT b FROM t WHERE EXISTS (SELECT c FROM u WHERE u.a = t.a AND t.a > 1)");
        assert_eq!(where_subselect(&statement), vec!["t.a".to_string()]);
    }

    #[test]
    fn test_uncorrelated_subquery() {
        let statement = analyze("SELECT b FROM t WHERE EXISTS (SELECT c FROM u)");
        assert!(where_subselect(&statement).is_empty());
    }

    #[test]
    fn test_doubly_nested_reference_belongs_to_outer_subquery() {
        let statement = analyze(
            "SELECT b FROM t WHERE EXISTS \
             (SELECT c FROM u WHERE EXISTS (SELECT 1 FROM u AS w WHERE w.a = t.a))",
        );
        assert_eq!(where_subselect(&statement), vec!["t.a".to_string()]);
    }
}
