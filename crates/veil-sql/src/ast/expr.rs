//! Scalar and table-valued expressions.

use super::{NodeInfo, SelectStmt};
use std::fmt;
use veil_core::{ColumnId, ConstantValue, EqualityArg};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Gt,
    GtEq,
    Lt,
    LtEq,
    Eq,
    NotEq,
    And,
    Or,
}

/// How a binary operator constrains its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Arithmetic,
    NumericComparison,
    EqualityComparison,
    Logical,
}

impl BinaryOp {
    pub fn class(self) -> OperatorClass {
        use BinaryOp::*;
        match self {
            Plus | Minus | Multiply | Divide | Modulo | BitwiseAnd | BitwiseOr | BitwiseXor => {
                OperatorClass::Arithmetic
            }
            Gt | GtEq | Lt | LtEq => OperatorClass::NumericComparison,
            Eq | NotEq => OperatorClass::EqualityComparison,
            And | Or => OperatorClass::Logical,
        }
    }

    pub fn symbol(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            Modulo => "%",
            BitwiseAnd => "&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            Gt => ">",
            GtEq => ">=",
            Lt => "<",
            LtEq => "<=",
            Eq => "=",
            NotEq => "<>",
            And => "AND",
            Or => "OR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Avg,
    Count,
    Max,
    Min,
    Sum,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Max => "MAX",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Sum => "SUM",
        };
        f.write_str(name)
    }
}

/// `ANY` / `ALL` in `x op ANY (subquery)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Any,
    All,
}

/// A possibly-qualified column name, bound to a column by column resolution.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub name: String,
    pub(crate) column: Option<ColumnId>,
}

impl ColumnRef {
    pub fn new(table: Option<String>, name: impl Into<String>) -> Self {
        Self {
            table,
            name: name.into(),
            column: None,
        }
    }

    /// The bound column, once resolved.
    pub fn column(&self) -> Option<ColumnId> {
        self.column
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A query used as an expression.
#[derive(Debug, Clone)]
pub struct SubSelect {
    pub body: Box<SelectStmt>,
    /// Columns of the enclosing query block referenced inside the body.
    pub(crate) correlated: Vec<ColumnId>,
}

impl SubSelect {
    pub fn new(body: SelectStmt) -> Self {
        Self {
            body: Box::new(body),
            correlated: Vec::new(),
        }
    }

    pub fn correlated_columns(&self) -> &[ColumnId] {
        &self.correlated
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Column(ColumnRef),
    Constant(ConstantValue),
    Null,
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Negate(Box<Expr>),
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
    /// `expr [NOT] IN set`, where `set` is a list or a subquery.
    In {
        expr: Box<Expr>,
        set: Box<Expr>,
        negated: bool,
    },
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
    },
    Exists {
        subquery: Box<Expr>,
        negated: bool,
    },
    Aggregate {
        function: AggregateFunction,
        arg: Box<Expr>,
        distinct: bool,
    },
    CountAll,
    List(Vec<Expr>),
    SubSelect(SubSelect),
    /// The right-hand side of `x op ANY/ALL (subquery)`.
    TableComparison {
        quantifier: Quantifier,
        subquery: Box<Expr>,
    },
}

/// An expression node with the annotations analysis passes attach to it.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub(crate) info: NodeInfo,
    pub(crate) equality_arg: Option<EqualityArg>,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            info: NodeInfo::default(),
            equality_arg: None,
        }
    }

    pub fn column(table: Option<&str>, name: &str) -> Self {
        Self::new(ExprKind::Column(ColumnRef::new(table.map(str::to_string), name)))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    /// The constant or base column this expression stands for in an
    /// equality predicate, if any.
    pub fn equality_arg(&self) -> Option<&EqualityArg> {
        self.equality_arg.as_ref()
    }

    /// Direct sub-expressions, left to right. Subquery bodies are not
    /// expressions and are not included.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Column(_)
            | ExprKind::Constant(_)
            | ExprKind::Null
            | ExprKind::CountAll
            | ExprKind::SubSelect(_) => Vec::new(),
            ExprKind::Binary { left, right, .. }
            | ExprKind::In {
                expr: left,
                set: right,
                ..
            }
            | ExprKind::Like {
                expr: left,
                pattern: right,
                ..
            } => vec![&**left, &**right],
            ExprKind::Negate(inner)
            | ExprKind::IsNull { expr: inner, .. }
            | ExprKind::Exists {
                subquery: inner, ..
            }
            | ExprKind::Aggregate { arg: inner, .. }
            | ExprKind::TableComparison {
                subquery: inner, ..
            } => vec![&**inner],
            ExprKind::List(elements) => elements.iter().collect(),
        }
    }

    /// Split a conjunction into its conjuncts, left to right.
    pub fn conjuncts(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let mut result = left.conjuncts();
                result.extend(right.conjuncts());
                result
            }
            _ => vec![self],
        }
    }
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Expr::new(kind)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Column(column) => column.fmt(f),
            ExprKind::Constant(value) => value.fmt(f),
            ExprKind::Null => f.write_str("NULL"),
            ExprKind::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            ExprKind::Negate(value) => write!(f, "-{}", value),
            ExprKind::IsNull { expr, negated } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "({} IS{} NULL)", expr, not)
            }
            ExprKind::In { expr, set, negated } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "({}{} IN {})", expr, not, set)
            }
            ExprKind::Like {
                expr,
                pattern,
                negated,
            } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "{}{} LIKE {}", expr, not, pattern)
            }
            ExprKind::Exists { subquery, negated } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "({}EXISTS {})", not, subquery)
            }
            ExprKind::Aggregate {
                function,
                arg,
                distinct,
            } => {
                if *distinct {
                    write!(f, "{}(DISTINCT {})", function, arg)
                } else {
                    write!(f, "{}({})", function, arg)
                }
            }
            ExprKind::CountAll => f.write_str("COUNT(*)"),
            ExprKind::List(elements) => {
                let parts: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            ExprKind::SubSelect(sub) => write!(f, "({})", sub.body),
            ExprKind::TableComparison {
                quantifier,
                subquery,
            } => {
                let q = match quantifier {
                    Quantifier::Any => "ANY",
                    Quantifier::All => "ALL",
                };
                write!(f, "{} {}", q, subquery)
            }
        }
    }
}
