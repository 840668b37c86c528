//! Equality constraint collection.

use crate::ast::visit::{Visitor, walk_select};
use crate::ast::{BinaryOp, Expr, ExprKind, FromItem, PlainSelect, Statement};
use crate::pipeline::{PassId, TransformationPass};
use veil_core::{EqualityConstraint, SqlError};

/// Records the `l = r` conjuncts of each query block's ON and WHERE clauses
/// whose sides are both constants or base columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualityConstraintCollector;

impl TransformationPass for EqualityConstraintCollector {
    fn id(&self) -> PassId {
        PassId::EQUALITY_CONSTRAINTS
    }

    fn dependencies(&self) -> &'static [PassId] {
        &[PassId::TYPE_CHECKER]
    }

    fn execute(&self, statement: &mut Statement) -> Result<(), SqlError> {
        walk_select(&mut statement.body, &mut CollectVisitor)
    }
}

struct CollectVisitor;

impl Visitor for CollectVisitor {
    fn leave_select(&mut self, select: &mut PlainSelect) -> Result<(), SqlError> {
        let mut predicates = Vec::new();
        if let Some(from) = &select.from {
            join_conditions(from, &mut predicates);
        }
        predicates.extend(&select.selection);

        let constraints: Vec<EqualityConstraint> = predicates
            .into_iter()
            .flat_map(Expr::conjuncts)
            .filter_map(equality)
            .collect();

        tracing::debug!(count = constraints.len(), "collected equality constraints");
        select.constraints = Some(constraints);
        Ok(())
    }
}

/// ON clauses of the joins in this block. Derived tables are separate blocks.
fn join_conditions<'a>(from: &'a FromItem, out: &mut Vec<&'a Expr>) {
    if let FromItem::Join {
        left, right, on, ..
    } = from
    {
        join_conditions(left, out);
        join_conditions(right, out);
        out.extend(on);
    }
}

fn equality(conjunct: &Expr) -> Option<EqualityConstraint> {
    match &conjunct.kind {
        ExprKind::Binary {
            op: BinaryOp::Eq,
            left,
            right,
        } => Some(EqualityConstraint::new(
            left.equality_arg()?.clone(),
            right.equality_arg()?.clone(),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::parse_statement;
    use crate::passes::{AggTypeChecker, ColumnResolver, CorrelatedColumnFinder, TypeChecker};
    use pretty_assertions::assert_eq;
    use veil_core::Schema;

    fn constraints(sql: &str) -> Vec<Vec<String>> {
        let schema = Schema::parse(
            "CREATE TABLE t (a NUMERIC, b STRING);\nCREATE TABLE u (a NUMERIC, c BOOL);",
        )
        .unwrap();
        let mut statement = parse_statement(sql, Default::default()).unwrap();
        ColumnResolver::new(schema).execute(&mut statement).unwrap();
        CorrelatedColumnFinder.execute(&mut statement).unwrap();
        AggTypeChecker.execute(&mut statement).unwrap();
        TypeChecker.execute(&mut statement).unwrap();
        EqualityConstraintCollector.execute(&mut statement).unwrap();

        statement
            .body
            .blocks()
            .iter()
            .map(|b| {
                b.constraints()
                    .unwrap()
                    .iter()
                    .map(|c| c.to_string())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_where_and_on_conjuncts() {
        assert_eq!(
            constraints(
                "SELECT t.b FROM t JOIN u ON t.a = u.a WHERE t.b = 'x' AND u.a > 2 AND 1 = 1"
            ),
            vec![vec![
                "Eq(t.a, u.a)".to_string(),
                "Eq(t.b, 'x')".to_string(),
                "Eq(1, 1)".to_string()
            ]]
        );
    }

    #[test]
    fn test_disjunctions_and_expressions_are_skipped() {
        assert_eq!(
            constraints("SELECT a FROM t WHERE (a = 1 OR a = 2) AND a + 1 = 3"),
            vec![Vec::<String>::new()]
        );
    }

    #[test]
    fn test_nested_blocks_get_their_own_constraints() {
        assert_eq!(
            constraints("SELECT a FROM t WHERE a IN (SELECT u.a FROM u WHERE u.a = t.a)"),
            vec![vec![], vec!["Eq(u.a, t.a)".to_string()]]
        );
    }

    #[test]
    fn test_single_column_subquery_forwards_argument() {
        assert_eq!(
            constraints("SELECT b FROM t WHERE a = (SELECT 7)"),
            vec![vec!["Eq(t.a, 7)".to_string()], vec![]]
        );
    }

    #[test]
    fn test_derived_columns_have_no_argument() {
        let found = constraints("SELECT x.a FROM (SELECT a FROM t) AS x WHERE x.a = 1");
        assert_eq!(found, vec![Vec::<String>::new(), vec![]]);
    }
}
