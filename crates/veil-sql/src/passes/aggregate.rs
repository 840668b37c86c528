//! Aggregate classification.
//!
//! Every expression and query block is classified as aggregate,
//! non-aggregate or both. Columns are classified by an
//! [`AggTypeForColumn`] that changes with context: GROUP BY columns become
//! aggregate in the HAVING clause and the select list, and inside a
//! subquery the outer columns it references act as constants.

use crate::ast::visit::{Clause, Visitor, walk_select};
use crate::ast::{Expr, ExprKind, FromItem, PlainSelect, SelectItem, SelectItemKind, SetOperation, Statement};
use crate::pipeline::{PassId, TransformationPass};
use veil_core::{AggType, AggTypeForColumn, SqlError};

#[derive(Debug, Clone, Copy, Default)]
pub struct AggTypeChecker;

impl TransformationPass for AggTypeChecker {
    fn id(&self) -> PassId {
        PassId::AGG_TYPE_CHECKER
    }

    fn dependencies(&self) -> &'static [PassId] {
        &[PassId::COLUMN_RESOLVER, PassId::CORRELATED_COLUMNS]
    }

    fn execute(&self, statement: &mut Statement) -> Result<(), SqlError> {
        let mut visitor = AggVisitor {
            frames: vec![Frame::new(AggTypeForColumn::all_non_aggregate())],
        };
        walk_select(&mut statement.body, &mut visitor)
    }
}

/// Classifiers in effect for one query block (or one subquery expression
/// before its body is entered).
struct Frame {
    plain: AggTypeForColumn,
    grouped: Option<AggTypeForColumn>,
    clause: Option<Clause>,
}

impl Frame {
    fn new(plain: AggTypeForColumn) -> Self {
        Self {
            plain,
            grouped: None,
            clause: None,
        }
    }

    fn classifier(&self) -> &AggTypeForColumn {
        match (self.clause, &self.grouped) {
            (Some(Clause::Having | Clause::Items), Some(grouped)) => grouped,
            _ => &self.plain,
        }
    }
}

struct AggVisitor {
    frames: Vec<Frame>,
}

impl AggVisitor {
    fn frame(&mut self) -> Result<&mut Frame, SqlError> {
        self.frames
            .last_mut()
            .ok_or_else(|| SqlError::Unannotated("no aggregate context".to_string()))
    }

    fn classifier(&self) -> Result<&AggTypeForColumn, SqlError> {
        self.frames
            .last()
            .map(Frame::classifier)
            .ok_or_else(|| SqlError::Unannotated("no aggregate context".to_string()))
    }
}

fn join(left: &Expr, right: &Expr) -> Result<AggType, SqlError> {
    left.info
        .agg_type()?
        .common_supertype(right.info.agg_type()?)
        .ok_or_else(|| SqlError::agg_mismatch(left, right))
}

impl Visitor for AggVisitor {
    fn enter_select(&mut self, select: &mut PlainSelect) -> Result<(), SqlError> {
        let plain = self.classifier()?.clone();
        let grouped = plain.with_aggregates(select.group_by_columns());
        self.frames.push(Frame {
            plain,
            grouped: Some(grouped),
            clause: None,
        });
        Ok(())
    }

    fn enter_clause(&mut self, clause: Clause) -> Result<(), SqlError> {
        self.frame()?.clause = Some(clause);
        Ok(())
    }

    fn leave_select(&mut self, select: &mut PlainSelect) -> Result<(), SqlError> {
        self.frames.pop();

        if let Some(selection) = &select.selection {
            if selection.info.agg_type()?.to_non_aggregate().is_none() {
                return Err(SqlError::AggregateMismatch(format!(
                    "Must be non-aggregate: {}",
                    selection
                )));
            }
        }

        if let Some(having) = &select.having {
            if having.info.agg_type()?.to_aggregate().is_none() {
                return Err(SqlError::AggregateMismatch(format!(
                    "Must be aggregate: {}",
                    having
                )));
            }
        }

        let mut result = AggType::Bottom;
        for item in &select.items {
            result = result
                .common_supertype(item.info.agg_type()?)
                .ok_or_else(|| {
                    SqlError::AggregateMismatch(format!(
                        "Aggregate/Non-Aggregate mismatch: {}",
                        item
                    ))
                })?;
        }

        if select.from.is_none() && result.to_non_aggregate().is_none() {
            let items: Vec<String> = select.items.iter().map(|i| i.to_string()).collect();
            return Err(SqlError::AggregateMismatch(format!(
                "Can't have aggregation without a FROM clause: {}",
                items.join(", ")
            )));
        }

        tracing::debug!(agg_type = %result, "classified query block");
        select.info.set_agg_type(result);
        Ok(())
    }

    fn leave_set_operation(&mut self, op: &mut SetOperation) -> Result<(), SqlError> {
        let left = op.left.info().agg_type()?;
        let right = op.right.info().agg_type()?;
        let result = left
            .common_supertype(right)
            .ok_or_else(|| SqlError::agg_mismatch(&op.left, &op.right))?;
        op.info.set_agg_type(result);
        Ok(())
    }

    fn leave_from(&mut self, from: &mut FromItem) -> Result<(), SqlError> {
        if let FromItem::Join { on: Some(on), .. } = from {
            if on.info.agg_type()?.to_non_aggregate().is_none() {
                return Err(SqlError::AggregateMismatch(format!(
                    "Must be non-aggregate: {}",
                    on
                )));
            }
        }
        Ok(())
    }

    fn enter_expr(&mut self, expr: &mut Expr) -> Result<(), SqlError> {
        if let ExprKind::SubSelect(sub) = &expr.kind {
            let inner = self.classifier()?.for_subquery(sub.correlated_columns().iter().copied());
            self.frames.push(Frame::new(inner));
        }
        Ok(())
    }

    fn leave_expr(&mut self, expr: &mut Expr) -> Result<(), SqlError> {
        if let ExprKind::SubSelect(_) = expr.kind {
            self.frames.pop();
        }

        let agg_type = match &expr.kind {
            ExprKind::Constant(_) | ExprKind::Null => AggType::Bottom,
            ExprKind::CountAll => AggType::Aggregate,
            ExprKind::Column(reference) => {
                let column = reference.column().ok_or_else(|| {
                    SqlError::Unannotated(format!("Column hasn't been resolved: {}", reference))
                })?;
                self.classifier()?.agg_type(column)
            }
            ExprKind::Binary { left, right, .. } => join(left, right)?,
            ExprKind::In { expr: left, set: right, .. }
            | ExprKind::Like {
                expr: left,
                pattern: right,
                ..
            } => join(left, right)?,
            ExprKind::Negate(inner)
            | ExprKind::IsNull { expr: inner, .. }
            | ExprKind::Exists {
                subquery: inner, ..
            }
            | ExprKind::TableComparison {
                subquery: inner, ..
            } => inner.info.agg_type()?,
            ExprKind::Aggregate { arg, .. } => {
                if arg.info.agg_type()?.to_non_aggregate().is_none() {
                    return Err(SqlError::AggregateMismatch(format!(
                        "Must be non-aggregate: {}",
                        arg
                    )));
                }
                AggType::Aggregate
            }
            ExprKind::List(elements) => {
                let mut result = AggType::Bottom;
                for element in elements {
                    result = result
                        .common_supertype(element.info.agg_type()?)
                        .ok_or_else(|| SqlError::agg_mismatch(result, element))?;
                }
                result
            }
            ExprKind::SubSelect(sub) => {
                let classifier = self.classifier()?;
                let mut result = AggType::Bottom;
                for column in sub.correlated_columns() {
                    result = result
                        .common_supertype(classifier.agg_type(*column))
                        .ok_or_else(|| {
                            SqlError::AggregateMismatch(format!(
                                "Aggregate/Non-Aggregate mismatch for correlated columns: {}",
                                expr
                            ))
                        })?;
                }
                result
            }
        };

        expr.info.set_agg_type(agg_type);
        Ok(())
    }

    fn leave_select_item(&mut self, item: &mut SelectItem) -> Result<(), SqlError> {
        let agg_type = match &item.kind {
            SelectItemKind::Expr { value, .. } => value.info.agg_type()?,
            SelectItemKind::AllColumns { columns, .. } => {
                let classifier = self.classifier()?;
                let mut result = AggType::Bottom;
                for column in columns {
                    result = result
                        .common_supertype(classifier.agg_type(*column))
                        .ok_or_else(|| {
                            SqlError::AggregateMismatch(format!(
                                "Aggregate/Non-Aggregate mismatch: {}",
                                item
                            ))
                        })?;
                }
                result
            }
        };
        item.info.set_agg_type(agg_type);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SelectStmt;
    use crate::convert::parse_statement;
    use crate::passes::{ColumnResolver, CorrelatedColumnFinder};
    use pretty_assertions::assert_eq;
    use veil_core::Schema;

    fn classify(sql: &str) -> Result<AggType, SqlError> {
        let schema = Schema::parse(
            "CREATE TABLE t (a NUMERIC, b STRING);\nCREATE TABLE u (a NUMERIC, c BOOL);",
        )?;
        let mut statement = parse_statement(sql, Default::default())?;
        ColumnResolver::new(schema).execute(&mut statement)?;
        CorrelatedColumnFinder.execute(&mut statement)?;
        AggTypeChecker.execute(&mut statement)?;
        statement.body.info().agg_type()
    }

    #[test]
    fn test_plain_selects() {
        assert_eq!(classify("SELECT a FROM t").unwrap(), AggType::NonAggregate);
        assert_eq!(classify("SELECT COUNT(*) FROM t").unwrap(), AggType::Aggregate);
        assert_eq!(classify("SELECT 1").unwrap(), AggType::Bottom);
        assert_eq!(
            classify("SELECT a, COUNT(b) FROM t GROUP BY a").unwrap(),
            AggType::Aggregate
        );
    }

    #[test]
    fn test_mixing_fails() {
        let err = classify("SELECT a, COUNT(b) FROM t").unwrap_err();
        assert!(matches!(err, SqlError::AggregateMismatch(_)));

        let err = classify("SELECT a + COUNT(b) FROM t").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Aggregate/non-aggregate mismatch: a and COUNT(b)"
        );
    }

    #[test]
    fn test_clause_requirements() {
        let err = classify("SELECT COUNT(*) FROM t WHERE COUNT(a) > 1").unwrap_err();
        assert_eq!(err.to_string(), "Must be non-aggregate: (COUNT(a) > 1)");

        let err = classify("SELECT a FROM t GROUP BY a HAVING b = 'x'").unwrap_err();
        assert_eq!(err.to_string(), "Must be aggregate: (b = 'x')");

        let err = classify("SELECT SUM(COUNT(a)) FROM t").unwrap_err();
        assert_eq!(err.to_string(), "Must be non-aggregate: COUNT(a)");
    }

    #[test]
    fn test_having_sees_group_by_columns() {
        assert_eq!(
            classify("SELECT a FROM t GROUP BY a HAVING a > 1").unwrap(),
            AggType::Aggregate
        );
    }

    #[test]
    fn test_correlated_columns_are_constants_in_subquery() {
        assert_eq!(
            classify("SELECT a FROM t WHERE EXISTS (SELECT COUNT(*) FROM u WHERE u.a = t.a)")
                .unwrap(),
            AggType::NonAggregate
        );
        assert_eq!(
            classify("SELECT a, (SELECT COUNT(*) FROM u WHERE u.a = t.a) FROM t GROUP BY a")
                .unwrap(),
            AggType::Aggregate
        );
    }

    #[test]
    fn test_set_operation_joins_operands() {
        assert_eq!(
            classify("SELECT a FROM t UNION SELECT 1").unwrap(),
            AggType::NonAggregate
        );
        assert!(classify("SELECT a FROM t UNION SELECT COUNT(*) FROM u").is_err());
    }

    #[test]
    fn test_from_items_do_not_leak_classification() {
        let statement = classify("SELECT x.n FROM (SELECT COUNT(*) AS n FROM t) AS x");
        assert_eq!(statement.unwrap(), AggType::NonAggregate);
    }

    #[test]
    fn test_body_of_top_level_is_annotated() {
        let schema = Schema::parse("CREATE TABLE t (a NUMERIC);").unwrap();
        let mut statement = parse_statement("SELECT a FROM t", Default::default()).unwrap();
        ColumnResolver::new(schema).execute(&mut statement).unwrap();
        CorrelatedColumnFinder.execute(&mut statement).unwrap();
        AggTypeChecker.execute(&mut statement).unwrap();
        let SelectStmt::Plain(select) = &statement.body else {
            panic!("expected plain select");
        };
        assert!(select.items[0].info().has_agg_type());
    }
}
