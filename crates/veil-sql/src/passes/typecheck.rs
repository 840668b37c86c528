//! Type checking.
//!
//! Assigns a [`Type`] to every expression, select item and query block,
//! bottom-up, and records each query block's output type so that derived
//! tables can type their columns. Expressions that stand for a constant or a
//! base column also receive their [`EqualityArg`] here.

use crate::ast::visit::{Visitor, walk_select};
use crate::ast::{
    AggregateFunction, Expr, ExprKind, FromItem, OperatorClass, PlainSelect, SelectItem,
    SelectItemKind, SelectStmt, SetOperation, SetOperator, Statement,
};
use crate::pipeline::{PassId, TransformationPass};
use veil_core::{
    AggType, ConstantValue, EqualityArg, PrimitiveType, RowCount, SchemaTableType, ScopeTree,
    SqlError, Type,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeChecker;

impl TransformationPass for TypeChecker {
    fn id(&self) -> PassId {
        PassId::TYPE_CHECKER
    }

    fn dependencies(&self) -> &'static [PassId] {
        &[PassId::AGG_TYPE_CHECKER, PassId::COLUMN_RESOLVER]
    }

    fn execute(&self, statement: &mut Statement) -> Result<(), SqlError> {
        let mut visitor = TypeVisitor {
            scopes: &statement.scopes,
        };
        walk_select(&mut statement.body, &mut visitor)
    }
}

struct TypeVisitor<'a> {
    scopes: &'a ScopeTree,
}

// =============================================================================
// Helpers
// =============================================================================

fn require(
    expr: &Expr,
    kind: &str,
    coerce: impl Fn(&Type) -> Option<PrimitiveType>,
) -> Result<PrimitiveType, SqlError> {
    coerce(expr.info.node_type()?).ok_or_else(|| SqlError::must_be(kind, expr))
}

fn numeric(expr: &Expr) -> Result<PrimitiveType, SqlError> {
    require(expr, "numeric", Type::coerce_to_numeric)
}

fn primitive(expr: &Expr) -> Result<PrimitiveType, SqlError> {
    require(expr, "primitive", Type::coerce_to_primitive)
}

fn boolean(expr: &Expr) -> Result<PrimitiveType, SqlError> {
    require(expr, "bool", Type::coerce_to_bool)
}

fn string(expr: &Expr) -> Result<PrimitiveType, SqlError> {
    require(expr, "string", Type::coerce_to_string)
}

fn schema_list(expr: &Expr) -> Result<SchemaTableType, SqlError> {
    expr.info
        .node_type()?
        .coerce_to_schema_list()
        .ok_or_else(|| SqlError::must_be("list", expr))
}

fn schema_of(stmt: &SelectStmt) -> Result<SchemaTableType, SqlError> {
    stmt.info()
        .node_type()?
        .coerce_to_schema_table()
        .ok_or_else(|| SqlError::must_be("schema table", stmt))
}

/// The equality argument a subquery forwards: that of its only output
/// expression, when it has exactly one.
fn forwarded_arg(body: &SelectStmt) -> Option<EqualityArg> {
    let SelectStmt::Plain(select) = body else {
        return None;
    };
    match select.items.as_slice() {
        [item] => match &item.kind {
            SelectItemKind::Expr { value, .. } => value.equality_arg.clone(),
            SelectItemKind::AllColumns { .. } => None,
        },
        _ => None,
    }
}

// =============================================================================
// Visitor
// =============================================================================

impl TypeVisitor<'_> {
    fn expr_type(&self, expr: &Expr) -> Result<(Type, Option<EqualityArg>), SqlError> {
        let typed = match &expr.kind {
            ExprKind::Column(reference) => {
                let column = reference.column().ok_or_else(|| {
                    SqlError::Unannotated(format!("Column hasn't been resolved: {}", reference))
                })?;
                let arg = self.scopes.column(column)?.equality_arg().cloned();
                (Type::Value(self.scopes.column_type(column)?), arg)
            }
            ExprKind::Constant(value) => {
                let t = match value {
                    ConstantValue::Numeric(_) => Type::NUMERIC,
                    ConstantValue::String(_) => Type::STRING,
                };
                (t, Some(EqualityArg::Constant(value.clone())))
            }
            ExprKind::Null => (Type::NULL, None),
            ExprKind::Binary { op, left, right } => {
                let t = match op.class() {
                    OperatorClass::Arithmetic => {
                        numeric(left)?;
                        numeric(right)?;
                        Type::NUMERIC
                    }
                    OperatorClass::NumericComparison => {
                        numeric(left)?;
                        numeric(right)?;
                        Type::BOOL
                    }
                    OperatorClass::EqualityComparison => {
                        primitive(left)?;
                        primitive(right)?;
                        Type::BOOL
                    }
                    OperatorClass::Logical => {
                        boolean(left)?;
                        boolean(right)?;
                        Type::BOOL
                    }
                };
                (t, None)
            }
            ExprKind::Negate(inner) => {
                numeric(inner)?;
                (inner.info.node_type()?.clone(), None)
            }
            ExprKind::IsNull { expr: inner, .. } => {
                primitive(inner)?;
                (Type::BOOL, None)
            }
            ExprKind::In { expr: inner, set, .. } => {
                primitive(inner)?;
                schema_list(set)?;
                (Type::BOOL, None)
            }
            ExprKind::Like { expr: inner, pattern, .. } => {
                string(inner)?;
                string(pattern)?;
                (Type::BOOL, None)
            }
            ExprKind::Exists { subquery, .. } => {
                subquery
                    .info
                    .node_type()?
                    .coerce_to_table()
                    .ok_or_else(|| SqlError::must_be("table", subquery))?;
                (Type::BOOL, None)
            }
            ExprKind::Aggregate { function, arg, .. } => {
                match function {
                    AggregateFunction::Count => primitive(arg)?,
                    _ => numeric(arg)?,
                };
                (Type::NUMERIC, None)
            }
            ExprKind::CountAll => (Type::NUMERIC, None),
            ExprKind::List(elements) => {
                let mut column_type = PrimitiveType::Bottom;
                for element in elements {
                    column_type = column_type.common_supertype(primitive(element)?);
                }
                let row_count = if elements.len() == 1 {
                    RowCount::SingleRow
                } else {
                    RowCount::UnlimitedRows
                };
                let arg = match elements.as_slice() {
                    [only] => only.equality_arg.clone(),
                    _ => None,
                };
                (SchemaTableType::list(row_count, column_type).into(), arg)
            }
            ExprKind::SubSelect(sub) => (
                sub.body.info().node_type()?.clone(),
                forwarded_arg(&sub.body),
            ),
            ExprKind::TableComparison { subquery, .. } => {
                let list = schema_list(subquery)?;
                let column_type = list
                    .column_type()
                    .ok_or_else(|| SqlError::must_be("list", subquery))?;
                (Type::Value(column_type), None)
            }
        };
        Ok(typed)
    }
}

impl Visitor for TypeVisitor<'_> {
    fn leave_expr(&mut self, expr: &mut Expr) -> Result<(), SqlError> {
        let (node_type, arg) = self.expr_type(expr)?;
        expr.info.set_type(node_type);
        expr.equality_arg = arg;
        Ok(())
    }

    fn leave_from(&mut self, from: &mut FromItem) -> Result<(), SqlError> {
        match from {
            FromItem::Join { on: Some(on), .. } => {
                boolean(on)?;
            }
            FromItem::SubSelect { body, .. } => {
                if body.info().node_type()?.coerce_to_table().is_none() {
                    return Err(SqlError::TypeMismatch(format!("Not a table: {}", body)));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn leave_select_item(&mut self, item: &mut SelectItem) -> Result<(), SqlError> {
        let column_types = match &item.kind {
            SelectItemKind::Expr { value, .. } => vec![primitive(value)?],
            SelectItemKind::AllColumns { columns, .. } => columns
                .iter()
                .map(|c| self.scopes.column_type(*c))
                .collect::<Result<Vec<_>, _>>()?,
        };
        item.info
            .set_type(Type::schema_table(RowCount::UnlimitedRows, column_types));
        Ok(())
    }

    fn leave_select(&mut self, select: &mut PlainSelect) -> Result<(), SqlError> {
        let mut column_types = Vec::new();
        for item in &select.items {
            let item_type = item.info.node_type()?.coerce_to_schema_table().ok_or_else(|| {
                SqlError::Unannotated(format!("Select item isn't a table: {}", item))
            })?;
            column_types.extend(item_type.column_types);
        }

        if let Some(selection) = &select.selection {
            boolean(selection)?;
        }
        if let Some(having) = &select.having {
            boolean(having)?;
        }

        let aggregate_without_grouping =
            select.group_by.is_empty() && select.info.agg_type()? == AggType::Aggregate;
        let constant_query =
            select.from.is_none() && select.selection.is_none() && select.having.is_none();
        let single_row_limit = select.limit == Some(1);
        let row_count = if aggregate_without_grouping || constant_query || single_row_limit {
            RowCount::SingleRow
        } else {
            RowCount::UnlimitedRows
        };

        let output = SchemaTableType::new(row_count, column_types);
        tracing::debug!(output_type = %output, "typed query block");
        self.scopes.set_output_type(select.output, output.clone())?;
        select.info.set_type(output.into());
        Ok(())
    }

    fn leave_set_operation(&mut self, op: &mut SetOperation) -> Result<(), SqlError> {
        let left = schema_of(&op.left)?;
        let right = schema_of(&op.right)?;

        let combined: Type = match op.op {
            SetOperator::Union => Type::Table(left.common_supertype(&right)),
            SetOperator::Intersect => left
                .unify_with(&right)
                .ok_or_else(|| {
                    SqlError::TypeMismatch(format!("Can't unify: {} and {}", left, right))
                })?
                .into(),
            SetOperator::Except => left.into(),
        };

        let output = combined
            .coerce_to_schema_table()
            .ok_or_else(|| SqlError::must_be("schema table", &combined))?;
        self.scopes.set_output_type(op.output, output.clone())?;
        op.info.set_type(output.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::parse_statement;
    use crate::passes::{AggTypeChecker, ColumnResolver, CorrelatedColumnFinder};
    use pretty_assertions::assert_eq;
    use veil_core::Schema;

    fn check(sql: &str) -> Result<Statement, SqlError> {
        let schema = Schema::parse(
            "CREATE TABLE t (a NUMERIC, b STRING);\nCREATE TABLE u (a NUMERIC, c BOOL);",
        )?;
        let mut statement = parse_statement(sql, Default::default())?;
        ColumnResolver::new(schema).execute(&mut statement)?;
        CorrelatedColumnFinder.execute(&mut statement)?;
        AggTypeChecker.execute(&mut statement)?;
        TypeChecker.execute(&mut statement)?;
        Ok(statement)
    }

    fn output(sql: &str) -> String {
        check(sql).unwrap().body.info().node_type().unwrap().to_string()
    }

    #[test]
    fn test_select_output_types() {
        assert_eq!(output("SELECT a, b FROM t"), "TABLE(NUMERIC, STRING) UNLIMITED_ROWS");
        assert_eq!(output("SELECT COUNT(*) FROM t"), "TABLE(NUMERIC) SINGLE_ROW");
        assert_eq!(output("SELECT 1, 'x'"), "TABLE(NUMERIC, STRING) SINGLE_ROW");
        assert_eq!(
            output("SELECT a, COUNT(*) FROM t GROUP BY a"),
            "TABLE(NUMERIC, NUMERIC) UNLIMITED_ROWS"
        );
        assert_eq!(output("SELECT a = 1, NULL FROM t"), "TABLE(BOOLEAN, NULL) UNLIMITED_ROWS");
    }

    #[test]
    fn test_limit_bounds_row_count() {
        assert_eq!(output("SELECT a FROM t LIMIT 1"), "TABLE(NUMERIC) SINGLE_ROW");
        assert_eq!(output("SELECT a FROM t LIMIT 1 OFFSET 5"), "TABLE(NUMERIC) SINGLE_ROW");
        assert_eq!(output("SELECT a FROM t LIMIT 5"), "TABLE(NUMERIC) UNLIMITED_ROWS");
        assert_eq!(output("SELECT a FROM t LIMIT ALL"), "TABLE(NUMERIC) UNLIMITED_ROWS");
        assert_eq!(
            output("SELECT a FROM t WHERE a = (SELECT a FROM u LIMIT 1)"),
            "TABLE(NUMERIC) UNLIMITED_ROWS"
        );
        assert!(check("SELECT a FROM t WHERE a > (SELECT a FROM u LIMIT 1)").is_ok());
        assert!(check("SELECT a FROM t WHERE a > (SELECT a FROM u LIMIT 2)").is_err());
    }

    #[test]
    fn test_operand_errors() {
        let err = check("SELECT b + 1 FROM t").unwrap_err();
        assert_eq!(err.to_string(), "Must be numeric: b");

        let err = check("SELECT a FROM t WHERE a").unwrap_err();
        assert_eq!(err.to_string(), "Must be bool: a");

        let err = check("SELECT a FROM t WHERE b LIKE 1").unwrap_err();
        assert_eq!(err.to_string(), "Must be string: 1");

        let err = check("SELECT a FROM t WHERE c AND a > 1").unwrap_err();
        assert_eq!(err.to_string(), "Couldn't resolve column: c");
    }

    #[test]
    fn test_scalar_subquery_coerces() {
        assert!(check("SELECT a FROM t WHERE a > (SELECT COUNT(*) FROM u)").is_ok());
        let err = check("SELECT a FROM t WHERE a > (SELECT a FROM u)").unwrap_err();
        assert_eq!(err.to_string(), "Must be numeric: (SELECT a AS a FROM u)");
    }

    #[test]
    fn test_in_and_quantified_comparisons() {
        assert!(check("SELECT a FROM t WHERE a IN (1, 2, NULL)").is_ok());
        assert!(check("SELECT a FROM t WHERE a IN (SELECT a FROM u)").is_ok());
        assert!(check("SELECT a FROM t WHERE a >= ALL (SELECT a FROM u)").is_ok());
        assert!(check("SELECT a FROM t WHERE a IN (SELECT a, c FROM u)").is_err());
        assert!(check("SELECT a FROM t WHERE b > ANY (SELECT a FROM u)").is_err());
    }

    #[test]
    fn test_derived_table_columns_are_typed() {
        assert_eq!(
            output("SELECT x.n + 1 FROM (SELECT COUNT(*) AS n FROM t) AS x"),
            "TABLE(NUMERIC) UNLIMITED_ROWS"
        );
        assert_eq!(
            output("SELECT * FROM (SELECT b, a + 1 AS m FROM t) AS x"),
            "TABLE(STRING, NUMERIC) UNLIMITED_ROWS"
        );
    }

    #[test]
    fn test_set_operations() {
        assert_eq!(
            output("SELECT a FROM t UNION SELECT NULL FROM u"),
            "TABLE(NUMERIC) UNLIMITED_ROWS"
        );
        assert_eq!(
            output("SELECT a FROM t UNION SELECT c FROM u"),
            "TABLE(PRIMITIVE) UNLIMITED_ROWS"
        );
        assert_eq!(
            output("SELECT a FROM t EXCEPT SELECT c FROM u"),
            "TABLE(NUMERIC) UNLIMITED_ROWS"
        );

        let err = check("SELECT a FROM t INTERSECT SELECT c FROM u").unwrap_err();
        assert!(err.to_string().starts_with("Can't unify"));

        let err = check("SELECT a, b FROM t UNION SELECT a FROM u").unwrap_err();
        assert_eq!(err.to_string(), "Must be schema table: TABLE");
    }

    #[test]
    fn test_equality_args() {
        let statement = check("SELECT a FROM t WHERE a = 3").unwrap();
        let SelectStmt::Plain(select) = &statement.body else {
            panic!("expected plain select");
        };
        let ExprKind::Binary { left, right, .. } = &select.selection.as_ref().unwrap().kind else {
            panic!("expected comparison");
        };
        assert_eq!(left.equality_arg().unwrap().to_string(), "t.a");
        assert_eq!(right.equality_arg().unwrap().to_string(), "3");
    }
}
