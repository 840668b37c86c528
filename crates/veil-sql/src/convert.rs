//! Conversion from `sqlparser` output to the analysis AST.
//!
//! Only a single `SELECT` statement is accepted. Constructs the analyzer
//! does not model are rejected with [`SqlError::Unsupported`] rather than
//! being silently dropped.

use crate::ast::{
    AggregateFunction, BinaryOp, ColumnRef, Expr, ExprKind, FromItem, JoinKind, PlainSelect,
    Quantifier, SelectItem, SelectStmt, SetOperation, SetOperator, Statement, SubSelect,
};
use sqlparser::ast as sql;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;
use veil_core::{ConstantValue, ScopeTree, SqlError};

/// Knobs for the conversion step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Accept NATURAL and USING joins as inner joins without a condition.
    pub allow_unsupported_joins: bool,
}

/// Parse `sql` and convert it into a [`Statement`].
pub fn parse_statement(sql: &str, options: ConvertOptions) -> Result<Statement, SqlError> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| SqlError::Parse(e.to_string()))?;

    let [statement] = statements.as_slice() else {
        return Err(SqlError::Unsupported(format!(
            "expected exactly one statement, found {}",
            statements.len()
        )));
    };

    let sql::Statement::Query(query) = statement else {
        return Err(SqlError::Unsupported(format!(
            "only SELECT statements can be analyzed: {}",
            statement
        )));
    };

    let mut converter = Converter {
        scopes: ScopeTree::new(),
        options,
    };
    let body = converter.query(query)?;
    tracing::debug!(query = %body, "converted statement");
    Ok(Statement::new(body, converter.scopes))
}

struct Converter {
    scopes: ScopeTree,
    options: ConvertOptions,
}

impl Converter {
    fn query(&mut self, query: &sql::Query) -> Result<SelectStmt, SqlError> {
        if query.with.is_some() {
            return Err(SqlError::Unsupported("WITH".to_string()));
        }
        if query.order_by.is_some() {
            return Err(SqlError::Unsupported("ORDER BY".to_string()));
        }
        if query.fetch.is_some() {
            return Err(SqlError::Unsupported("FETCH".to_string()));
        }
        if !query.locks.is_empty() || query.for_clause.is_some() {
            return Err(SqlError::Unsupported("FOR clause".to_string()));
        }
        if query.settings.is_some()
            || query.format_clause.is_some()
            || !query.pipe_operators.is_empty()
        {
            return Err(SqlError::Unsupported(format!("query modifier: {}", query)));
        }

        let body = self.set_expr(&query.body)?;
        let Some(limit_clause) = &query.limit_clause else {
            return Ok(body);
        };

        // LIMIT is only modeled on a single query block.
        match body {
            SelectStmt::Plain(mut select) if select.limit.is_none() && select.offset.is_none() => {
                let (limit, offset) = limit_offset(limit_clause)?;
                select.limit = Some(limit);
                select.offset = offset;
                Ok(SelectStmt::Plain(select))
            }
            SelectStmt::Plain(_) => Err(SqlError::Unsupported("nested LIMIT".to_string())),
            SelectStmt::SetOperation(_) => {
                Err(SqlError::Unsupported("SetOperationList LIMIT".to_string()))
            }
        }
    }

    fn set_expr(&mut self, body: &sql::SetExpr) -> Result<SelectStmt, SqlError> {
        match body {
            sql::SetExpr::Select(select) => Ok(SelectStmt::Plain(Box::new(self.select(select)?))),
            sql::SetExpr::Query(query) => self.query(query),
            sql::SetExpr::SetOperation {
                op,
                set_quantifier,
                left,
                right,
            } => {
                match set_quantifier {
                    sql::SetQuantifier::None | sql::SetQuantifier::Distinct => {}
                    other => return Err(SqlError::Unsupported(format!("{} {}", op, other))),
                }
                let op = match op {
                    sql::SetOperator::Union => SetOperator::Union,
                    sql::SetOperator::Intersect => SetOperator::Intersect,
                    sql::SetOperator::Except => SetOperator::Except,
                    other => return Err(SqlError::Unsupported(other.to_string())),
                };
                let left = self.set_expr(left)?;
                let right = self.set_expr(right)?;
                Ok(SelectStmt::SetOperation(Box::new(SetOperation {
                    op,
                    left,
                    right,
                    output: self.scopes.create_output(),
                    info: Default::default(),
                })))
            }
            other => Err(SqlError::Unsupported(format!("query body: {}", other))),
        }
    }

    fn select(&mut self, select: &sql::Select) -> Result<PlainSelect, SqlError> {
        if select.projection.is_empty() {
            return Err(SqlError::Unsupported("empty SELECT list".to_string()));
        }
        if select.top.is_some() {
            return Err(SqlError::Unsupported("TOP".to_string()));
        }
        if select.into.is_some() {
            return Err(SqlError::Unsupported("INTO".to_string()));
        }
        if select.exclude.is_some()
            || select.prewhere.is_some()
            || select.qualify.is_some()
            || select.connect_by.is_some()
            || select.value_table_mode.is_some()
            || !select.lateral_views.is_empty()
            || !select.cluster_by.is_empty()
            || !select.distribute_by.is_empty()
            || !select.sort_by.is_empty()
            || !select.named_window.is_empty()
        {
            return Err(SqlError::Unsupported(format!("SELECT clause: {}", select)));
        }

        let output = self.scopes.create_output();

        let items = select
            .projection
            .iter()
            .map(|item| self.select_item(item))
            .collect::<Result<Vec<_>, _>>()?;

        let mut plain = PlainSelect::new(items, output);
        plain.distinct = match &select.distinct {
            None => false,
            Some(sql::Distinct::Distinct) => true,
            Some(sql::Distinct::On(_)) => {
                return Err(SqlError::Unsupported("SELECT DISTINCT ON".to_string()));
            }
        };
        plain.from = self.from(&select.from)?;
        plain.selection = select
            .selection
            .as_ref()
            .map(|e| self.expr(e))
            .transpose()?;

        plain.group_by = match &select.group_by {
            sql::GroupByExpr::Expressions(exprs, _) => exprs
                .iter()
                .map(|e| self.group_by_column(e))
                .collect::<Result<Vec<_>, _>>()?,
            sql::GroupByExpr::All(_) => {
                return Err(SqlError::Unsupported("GROUP BY ALL".to_string()));
            }
        };

        plain.having = select.having.as_ref().map(|e| self.expr(e)).transpose()?;

        if plain.group_by.is_empty() && plain.having.is_some() {
            return Err(SqlError::InvalidQuery(
                "Can't have HAVING without GROUP BY".to_string(),
            ));
        }

        Ok(plain)
    }

    fn select_item(&mut self, item: &sql::SelectItem) -> Result<SelectItem, SqlError> {
        match item {
            sql::SelectItem::UnnamedExpr(expr) => {
                let value = self.expr(expr)?;
                let alias = match &value.kind {
                    ExprKind::Column(column) => Some(column.name.clone()),
                    _ => None,
                };
                Ok(SelectItem::expr(value, alias))
            }
            sql::SelectItem::ExprWithAlias { expr, alias } => {
                Ok(SelectItem::expr(self.expr(expr)?, Some(alias.value.clone())))
            }
            sql::SelectItem::Wildcard(_) => Ok(SelectItem::all_columns(None)),
            sql::SelectItem::QualifiedWildcard(..) => {
                let text = item.to_string();
                match text.strip_suffix(".*") {
                    Some(table) if !table.contains('.') => {
                        Ok(SelectItem::all_columns(Some(table.to_string())))
                    }
                    _ => Err(SqlError::Unsupported(format!("SELECT item: {}", text))),
                }
            }
            #[allow(unreachable_patterns)]
            other => Err(SqlError::Unsupported(format!("SELECT item: {}", other))),
        }
    }

    fn group_by_column(&mut self, expr: &sql::Expr) -> Result<Expr, SqlError> {
        let converted = self.expr(expr)?;
        match converted.kind {
            ExprKind::Column(_) => Ok(converted),
            _ => Err(SqlError::Unsupported(format!("GROUP BY expression: {}", expr))),
        }
    }

    /// Comma-separated FROM entries are inner joins without a condition.
    fn from(&mut self, from: &[sql::TableWithJoins]) -> Result<Option<FromItem>, SqlError> {
        let mut result: Option<FromItem> = None;
        for table_with_joins in from {
            let item = self.table_with_joins(table_with_joins)?;
            result = Some(match result {
                None => item,
                Some(left) => FromItem::Join {
                    left: Box::new(left),
                    right: Box::new(item),
                    kind: JoinKind::Inner,
                    on: None,
                },
            });
        }
        Ok(result)
    }

    fn table_with_joins(
        &mut self,
        table_with_joins: &sql::TableWithJoins,
    ) -> Result<FromItem, SqlError> {
        let mut item = self.table_factor(&table_with_joins.relation)?;

        for join in &table_with_joins.joins {
            let right = self.table_factor(&join.relation)?;
            let (kind, constraint) = match &join.join_operator {
                sql::JoinOperator::Join(c) | sql::JoinOperator::Inner(c) => (JoinKind::Inner, Some(c)),
                sql::JoinOperator::Left(c) | sql::JoinOperator::LeftOuter(c) => {
                    (JoinKind::LeftOuter, Some(c))
                }
                sql::JoinOperator::Right(c) | sql::JoinOperator::RightOuter(c) => {
                    (JoinKind::RightOuter, Some(c))
                }
                sql::JoinOperator::FullOuter(c) => (JoinKind::FullOuter, Some(c)),
                sql::JoinOperator::CrossJoin { .. } => (JoinKind::Inner, None),
                _ => {
                    return Err(SqlError::Unsupported(format!("join: {}", join)));
                }
            };

            let on = match constraint {
                Some(sql::JoinConstraint::On(expr)) => Some(self.expr(expr)?),
                Some(sql::JoinConstraint::None) | None => None,
                Some(_) if self.options.allow_unsupported_joins => {
                    tracing::warn!(join = %join, "treating join as an unconditional inner join");
                    None
                }
                Some(_) => {
                    return Err(SqlError::Unsupported(format!("NATURAL/USING join: {}", join)));
                }
            };

            item = FromItem::Join {
                left: Box::new(item),
                right: Box::new(right),
                kind,
                on,
            };
        }

        Ok(item)
    }

    fn table_factor(&mut self, factor: &sql::TableFactor) -> Result<FromItem, SqlError> {
        match factor {
            sql::TableFactor::Table { name, alias, .. } => Ok(FromItem::BaseTable {
                name: name.to_string(),
                alias: alias.as_ref().map(|a| a.name.value.clone()),
                table: None,
            }),
            sql::TableFactor::Derived {
                subquery, alias, ..
            } => {
                let Some(alias) = alias else {
                    return Err(SqlError::InvalidQuery(format!(
                        "SubSelect in FROM clause must have alias: {}",
                        factor
                    )));
                };
                Ok(FromItem::SubSelect {
                    body: Box::new(self.query(subquery)?),
                    alias: alias.name.value.clone(),
                })
            }
            sql::TableFactor::NestedJoin {
                table_with_joins,
                alias: None,
                ..
            } => self.table_with_joins(table_with_joins),
            other => Err(SqlError::Unsupported(format!("FROM item: {}", other))),
        }
    }

    fn subselect(&mut self, query: &sql::Query) -> Result<Expr, SqlError> {
        Ok(Expr::new(ExprKind::SubSelect(SubSelect::new(self.query(query)?))))
    }

    fn quantified(
        &mut self,
        left: &sql::Expr,
        compare_op: &sql::BinaryOperator,
        right: &sql::Expr,
        quantifier: Quantifier,
    ) -> Result<ExprKind, SqlError> {
        let sql::Expr::Subquery(query) = right else {
            return Err(SqlError::Unsupported(format!(
                "ANY/ALL over a non-subquery: {}",
                right
            )));
        };
        let subquery = self.subselect(query)?;
        Ok(ExprKind::Binary {
            op: binary_op(compare_op)?,
            left: Box::new(self.expr(left)?),
            right: Box::new(Expr::new(ExprKind::TableComparison {
                quantifier,
                subquery: Box::new(subquery),
            })),
        })
    }

    fn expr(&mut self, expr: &sql::Expr) -> Result<Expr, SqlError> {
        let kind = match expr {
            sql::Expr::Identifier(ident) => ExprKind::Column(ColumnRef::new(None, ident.value.clone())),
            sql::Expr::CompoundIdentifier(idents) => match idents.as_slice() {
                [table, column] => ExprKind::Column(ColumnRef::new(
                    Some(table.value.clone()),
                    column.value.clone(),
                )),
                _ => return Err(SqlError::Unsupported(format!("Column Schema: {}", expr))),
            },
            sql::Expr::Value(value) => value_kind(&value.value)?,
            sql::Expr::Nested(inner) => return self.expr(inner),
            sql::Expr::BinaryOp { left, op, right } => ExprKind::Binary {
                op: binary_op(op)?,
                left: Box::new(self.expr(left)?),
                right: Box::new(self.expr(right)?),
            },
            sql::Expr::UnaryOp {
                op: sql::UnaryOperator::Minus,
                expr: inner,
            } => ExprKind::Negate(Box::new(self.expr(inner)?)),
            sql::Expr::UnaryOp {
                op: sql::UnaryOperator::Plus,
                expr: inner,
            } => return self.expr(inner),
            sql::Expr::IsNull(inner) => ExprKind::IsNull {
                expr: Box::new(self.expr(inner)?),
                negated: false,
            },
            sql::Expr::IsNotNull(inner) => ExprKind::IsNull {
                expr: Box::new(self.expr(inner)?),
                negated: true,
            },
            sql::Expr::InList {
                expr: inner,
                list,
                negated,
            } => {
                let elements = list
                    .iter()
                    .map(|e| self.expr(e))
                    .collect::<Result<Vec<_>, _>>()?;
                ExprKind::In {
                    expr: Box::new(self.expr(inner)?),
                    set: Box::new(Expr::new(ExprKind::List(elements))),
                    negated: *negated,
                }
            }
            sql::Expr::InSubquery {
                expr: inner,
                subquery,
                negated,
            } => ExprKind::In {
                expr: Box::new(self.expr(inner)?),
                set: Box::new(self.subselect(subquery)?),
                negated: *negated,
            },
            sql::Expr::Like {
                negated,
                expr: inner,
                pattern,
                escape_char,
                ..
            } => {
                if escape_char.is_some() {
                    return Err(SqlError::Unsupported("LIKE ESCAPE".to_string()));
                }
                ExprKind::Like {
                    expr: Box::new(self.expr(inner)?),
                    pattern: Box::new(self.expr(pattern)?),
                    negated: *negated,
                }
            }
            sql::Expr::Exists { subquery, negated } => ExprKind::Exists {
                subquery: Box::new(self.subselect(subquery)?),
                negated: *negated,
            },
            sql::Expr::Subquery(query) => return self.subselect(query),
            sql::Expr::AnyOp {
                left,
                compare_op,
                right,
                ..
            } => self.quantified(left, compare_op, right, Quantifier::Any)?,
            sql::Expr::AllOp {
                left,
                compare_op,
                right,
                ..
            } => self.quantified(left, compare_op, right, Quantifier::All)?,
            sql::Expr::Function(function) => self.function(function)?,
            other => return Err(SqlError::Unsupported(other.to_string())),
        };
        Ok(Expr::new(kind))
    }

    fn function(&mut self, function: &sql::Function) -> Result<ExprKind, SqlError> {
        let name = function.name.to_string().to_ascii_uppercase();
        let aggregate = match name.as_str() {
            "AVG" => AggregateFunction::Avg,
            "COUNT" => AggregateFunction::Count,
            "MAX" => AggregateFunction::Max,
            "MIN" => AggregateFunction::Min,
            "SUM" => AggregateFunction::Sum,
            _ => {
                return Err(SqlError::Unsupported(format!(
                    "Unrecognized Function: {}",
                    function.name
                )));
            }
        };

        if function.over.is_some() {
            return Err(SqlError::Unsupported("AnalyticExpression".to_string()));
        }

        let sql::FunctionArguments::List(list) = &function.args else {
            return Err(SqlError::InvalidQuery(format!(
                "{} takes exactly one argument",
                aggregate
            )));
        };
        let distinct = matches!(
            list.duplicate_treatment,
            Some(sql::DuplicateTreatment::Distinct)
        );

        match list.args.as_slice() {
            [sql::FunctionArg::Unnamed(sql::FunctionArgExpr::Wildcard)]
                if aggregate == AggregateFunction::Count =>
            {
                if distinct {
                    return Err(SqlError::Unsupported("COUNT(DISTINCT *)".to_string()));
                }
                Ok(ExprKind::CountAll)
            }
            [sql::FunctionArg::Unnamed(sql::FunctionArgExpr::Expr(arg))] => Ok(ExprKind::Aggregate {
                function: aggregate,
                arg: Box::new(self.expr(arg)?),
                distinct,
            }),
            _ => Err(SqlError::InvalidQuery(format!(
                "{} takes exactly one argument",
                aggregate
            ))),
        }
    }
}

fn value_kind(value: &sql::Value) -> Result<ExprKind, SqlError> {
    match value {
        sql::Value::Number(n, _) => Ok(ExprKind::Constant(ConstantValue::Numeric(n.to_string()))),
        sql::Value::SingleQuotedString(s) => Ok(ExprKind::Constant(ConstantValue::String(s.clone()))),
        sql::Value::Null => Ok(ExprKind::Null),
        other => Err(SqlError::Unsupported(format!(
            "Unsupported Constant Type: {}",
            other
        ))),
    }
}

/// `LIMIT n [OFFSET m]` with a non-zero literal row count. A zero offset is
/// dropped.
fn limit_offset(clause: &sql::LimitClause) -> Result<(u64, Option<u64>), SqlError> {
    let sql::LimitClause::LimitOffset {
        limit,
        offset,
        limit_by,
    } = clause
    else {
        return Err(SqlError::Unsupported(format!("LIMIT form: {}", clause)));
    };
    if !limit_by.is_empty() {
        return Err(SqlError::Unsupported("LIMIT BY".to_string()));
    }
    let Some(limit) = limit else {
        return Err(SqlError::Unsupported("OFFSET without LIMIT".to_string()));
    };

    let limit = row_count_literal(limit, "LIMIT")?;
    if limit == 0 {
        return Err(SqlError::Unsupported(
            "LIMIT row count cannot be zero".to_string(),
        ));
    }
    let offset = match offset {
        Some(offset) => Some(row_count_literal(&offset.value, "OFFSET")?).filter(|&n| n != 0),
        None => None,
    };
    Ok((limit, offset))
}

fn row_count_literal(expr: &sql::Expr, clause: &str) -> Result<u64, SqlError> {
    match expr {
        sql::Expr::Value(value) => match &value.value {
            sql::Value::Number(n, _) => n
                .parse()
                .map_err(|_| SqlError::Unsupported(format!("{} {}", clause, expr))),
            _ => Err(SqlError::Unsupported(format!("{} {}", clause, expr))),
        },
        _ => Err(SqlError::Unsupported(format!("{} {}", clause, expr))),
    }
}

fn binary_op(op: &sql::BinaryOperator) -> Result<BinaryOp, SqlError> {
    use sql::BinaryOperator as B;
    Ok(match op {
        B::Plus => BinaryOp::Plus,
        B::Minus => BinaryOp::Minus,
        B::Multiply => BinaryOp::Multiply,
        B::Divide => BinaryOp::Divide,
        B::Modulo => BinaryOp::Modulo,
        B::BitwiseAnd => BinaryOp::BitwiseAnd,
        B::BitwiseOr => BinaryOp::BitwiseOr,
        B::BitwiseXor | B::PGBitwiseXor => BinaryOp::BitwiseXor,
        B::Gt => BinaryOp::Gt,
        B::GtEq => BinaryOp::GtEq,
        B::Lt => BinaryOp::Lt,
        B::LtEq => BinaryOp::LtEq,
        B::Eq => BinaryOp::Eq,
        B::NotEq => BinaryOp::NotEq,
        B::And => BinaryOp::And,
        B::Or => BinaryOp::Or,
        other => return Err(SqlError::Unsupported(format!("operator {}", other))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{SelectItemKind, SelectStmt};
    use pretty_assertions::assert_eq;

    fn plain(sql: &str) -> PlainSelect {
        match parse_statement(sql, ConvertOptions::default()).unwrap().body {
            SelectStmt::Plain(select) => *select,
            other => panic!("expected plain select, got {}", other),
        }
    }

    #[test]
    fn test_round_trips_display() {
        let select = plain("SELECT t.a, COUNT(*) AS n FROM t WHERE t.b = 'x' GROUP BY t.a");
        assert_eq!(
            select.to_string(),
            "SELECT t.a AS a, COUNT(*) AS n FROM t WHERE (t.b = 'x') GROUP BY t.a"
        );
    }

    #[test]
    fn test_column_items_named_after_column() {
        let select = plain("SELECT a, b + 1, c AS d FROM t");
        let names: Vec<Option<String>> = select.items.iter().flat_map(|i| i.column_names()).collect();
        assert_eq!(names, vec![Some("a".into()), None, Some("d".into())]);
    }

    #[test]
    fn test_comma_join_is_inner_join() {
        let select = plain("SELECT * FROM a, b JOIN c ON b.x = c.x");
        let Some(FromItem::Join { kind, on, left, .. }) = &select.from else {
            panic!("expected join");
        };
        assert_eq!(*kind, JoinKind::Inner);
        assert!(on.is_none());
        assert!(matches!(**left, FromItem::BaseTable { .. }));
        assert!(matches!(select.items[0].kind, SelectItemKind::AllColumns { table: None, .. }));
    }

    #[test]
    fn test_qualified_wildcard() {
        let select = plain("SELECT t.* FROM t");
        assert!(matches!(
            &select.items[0].kind,
            SelectItemKind::AllColumns { table: Some(t), .. } if t == "t"
        ));
    }

    #[test]
    fn test_any_becomes_table_comparison() {
        let select = plain("SELECT a FROM t WHERE a > ANY (SELECT b FROM u)");
        assert_eq!(
            select.selection.unwrap().to_string(),
            "(a > ANY (SELECT b AS b FROM u))"
        );
    }

    #[test]
    fn test_rejections() {
        let options = ConvertOptions::default();
        let cases = [
            "SELECT a FROM t HAVING a > 1",
            "SELECT a FROM (SELECT a FROM t)",
            "SELECT UPPER(a) FROM t",
            "SELECT COUNT(a, b) FROM t",
            "INSERT INTO t VALUES (1)",
            "SELECT a FROM t; SELECT b FROM t",
            "SELECT a FROM t JOIN u USING (a)",
        ];
        for sql in cases {
            assert!(parse_statement(sql, options).is_err(), "accepted: {}", sql);
        }
    }

    #[test]
    fn test_unmodeled_clauses_rejected() {
        let cases = [
            ("SELECT a FROM t ORDER BY a", "Unsupported SQL Feature: ORDER BY"),
            ("SELECT DISTINCT ON (a) a, b FROM t", "Unsupported SQL Feature: SELECT DISTINCT ON"),
            ("SELECT a FROM t UNION ALL SELECT a FROM u", "Unsupported SQL Feature: UNION ALL"),
            ("SELECT a FROM t FETCH FIRST 1 ROWS ONLY", "Unsupported SQL Feature: FETCH"),
            ("SELECT FROM t", "Unsupported SQL Feature: empty SELECT list"),
            ("SELECT a FROM t OFFSET 10", "Unsupported SQL Feature: OFFSET without LIMIT"),
            ("SELECT a FROM t LIMIT 0", "Unsupported SQL Feature: LIMIT row count cannot be zero"),
            (
                "SELECT a FROM t UNION SELECT a FROM u LIMIT 1",
                "Unsupported SQL Feature: SetOperationList LIMIT",
            ),
            ("SELECT a FROM t FOR UPDATE", "Unsupported SQL Feature: FOR clause"),
        ];
        for (sql, expected) in cases {
            let err = parse_statement(sql, ConvertOptions::default()).unwrap_err();
            assert_eq!(err.to_string(), expected, "for {}", sql);
        }
        assert!(parse_statement("SELECT a FROM t LIMIT a", ConvertOptions::default()).is_err());
    }

    #[test]
    fn test_limit_and_offset_kept_on_plain_select() {
        let select = plain("SELECT a FROM t LIMIT 5 OFFSET 10");
        assert_eq!(select.limit, Some(5));
        assert_eq!(select.offset, Some(10));
        assert_eq!(select.to_string(), "SELECT a AS a FROM t LIMIT 5 OFFSET 10");

        let select = plain("SELECT a FROM t LIMIT ALL");
        assert_eq!(select.limit, None);

        assert!(parse_statement(
            "SELECT a FROM t UNION DISTINCT SELECT a FROM u",
            ConvertOptions::default()
        )
        .is_ok());
    }

    #[test]
    fn test_using_join_allowed_when_configured() {
        let options = ConvertOptions {
            allow_unsupported_joins: true,
        };
        assert!(parse_statement("SELECT a FROM t JOIN u USING (a)", options).is_ok());
    }
}
