//! Query blocks, FROM items and select items.

use super::{Expr, ExprKind, NodeInfo};
use std::fmt;
use veil_core::{ColumnId, EqualityConstraint, OutputId, ScopeId, TableId};

/// A query: a single block or a set operation over two queries.
#[derive(Debug, Clone)]
pub enum SelectStmt {
    Plain(Box<PlainSelect>),
    SetOperation(Box<SetOperation>),
}

impl SelectStmt {
    pub fn info(&self) -> &NodeInfo {
        match self {
            SelectStmt::Plain(select) => &select.info,
            SelectStmt::SetOperation(op) => &op.info,
        }
    }

    /// Where this query's output names and type are recorded.
    pub fn output(&self) -> OutputId {
        match self {
            SelectStmt::Plain(select) => select.output,
            SelectStmt::SetOperation(op) => op.output,
        }
    }

    /// Every plain select in this query, each before the blocks nested in
    /// it. Nested blocks follow clause order.
    pub fn blocks(&self) -> Vec<&PlainSelect> {
        let mut blocks = Vec::new();
        collect_stmt(self, &mut blocks);
        blocks
    }
}

fn collect_stmt<'a>(stmt: &'a SelectStmt, blocks: &mut Vec<&'a PlainSelect>) {
    match stmt {
        SelectStmt::Plain(select) => {
            blocks.push(select);
            if let Some(from) = &select.from {
                collect_from(from, blocks);
            }
            let exprs = select
                .selection
                .iter()
                .chain(&select.group_by)
                .chain(&select.having)
                .chain(select.items.iter().filter_map(|item| match &item.kind {
                    SelectItemKind::Expr { value, .. } => Some(value),
                    SelectItemKind::AllColumns { .. } => None,
                }));
            for expr in exprs {
                collect_expr(expr, blocks);
            }
        }
        SelectStmt::SetOperation(op) => {
            collect_stmt(&op.left, blocks);
            collect_stmt(&op.right, blocks);
        }
    }
}

fn collect_from<'a>(from: &'a FromItem, blocks: &mut Vec<&'a PlainSelect>) {
    match from {
        FromItem::BaseTable { .. } => {}
        FromItem::SubSelect { body, .. } => collect_stmt(body, blocks),
        FromItem::Join {
            left, right, on, ..
        } => {
            collect_from(left, blocks);
            collect_from(right, blocks);
            if let Some(on) = on {
                collect_expr(on, blocks);
            }
        }
    }
}

fn collect_expr<'a>(expr: &'a Expr, blocks: &mut Vec<&'a PlainSelect>) {
    for child in expr.children() {
        collect_expr(child, blocks);
    }
    if let ExprKind::SubSelect(sub) = &expr.kind {
        collect_stmt(&sub.body, blocks);
    }
}

impl fmt::Display for SelectStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectStmt::Plain(select) => select.fmt(f),
            SelectStmt::SetOperation(op) => op.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetOperator::Union => f.write_str("UNION"),
            SetOperator::Intersect => f.write_str("INTERSECT"),
            SetOperator::Except => f.write_str("EXCEPT"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SetOperation {
    pub op: SetOperator,
    pub left: SelectStmt,
    pub right: SelectStmt,
    pub(crate) output: OutputId,
    pub(crate) info: NodeInfo,
}

impl fmt::Display for SetOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// One `SELECT ... FROM ... WHERE ... GROUP BY ... HAVING ...` block.
#[derive(Debug, Clone)]
pub struct PlainSelect {
    pub items: Vec<SelectItem>,
    pub from: Option<FromItem>,
    pub selection: Option<Expr>,
    /// Column references only.
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub distinct: bool,
    /// Row count bound; `LIMIT ALL` is `None`.
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub(crate) scope: Option<ScopeId>,
    pub(crate) output: OutputId,
    pub(crate) info: NodeInfo,
    pub(crate) constraints: Option<Vec<EqualityConstraint>>,
}

impl PlainSelect {
    pub fn new(items: Vec<SelectItem>, output: OutputId) -> Self {
        Self {
            items,
            from: None,
            selection: None,
            group_by: Vec::new(),
            having: None,
            distinct: false,
            limit: None,
            offset: None,
            scope: None,
            output,
            info: NodeInfo::default(),
            constraints: None,
        }
    }

    /// The scope created for this block by column resolution.
    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    pub fn output(&self) -> OutputId {
        self.output
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    /// Equality constraints found in this block's WHERE and ON clauses.
    pub fn constraints(&self) -> Option<&[EqualityConstraint]> {
        self.constraints.as_deref()
    }

    /// The columns listed in GROUP BY, once resolved.
    pub fn group_by_columns(&self) -> Vec<ColumnId> {
        self.group_by
            .iter()
            .filter_map(|e| match &e.kind {
                super::ExprKind::Column(column) => column.column(),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for PlainSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        let items: Vec<String> = self.items.iter().map(|i| i.to_string()).collect();
        f.write_str(&items.join(", "))?;
        if let Some(from) = &self.from {
            write!(f, " FROM {}", from)?;
        }
        if let Some(selection) = &self.selection {
            write!(f, " WHERE {}", selection)?;
        }
        if !self.group_by.is_empty() {
            let columns: Vec<String> = self.group_by.iter().map(|c| c.to_string()).collect();
            write!(f, " GROUP BY {}", columns.join(", "))?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {}", having)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum SelectItemKind {
    /// `value [AS alias]`
    Expr { value: Expr, alias: Option<String> },
    /// `*` or `table.*`, bound to columns by column resolution.
    AllColumns {
        table: Option<String>,
        columns: Vec<ColumnId>,
        names: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct SelectItem {
    pub kind: SelectItemKind,
    pub(crate) info: NodeInfo,
}

impl SelectItem {
    pub fn expr(value: Expr, alias: Option<String>) -> Self {
        Self {
            kind: SelectItemKind::Expr { value, alias },
            info: NodeInfo::default(),
        }
    }

    pub fn all_columns(table: Option<String>) -> Self {
        Self {
            kind: SelectItemKind::AllColumns {
                table,
                columns: Vec::new(),
                names: Vec::new(),
            },
            info: NodeInfo::default(),
        }
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    /// Output names contributed by this item. An unaliased expression
    /// contributes one unnamed output.
    pub fn column_names(&self) -> Vec<Option<String>> {
        match &self.kind {
            SelectItemKind::Expr { alias, .. } => vec![alias.clone()],
            SelectItemKind::AllColumns { names, .. } => names.iter().cloned().map(Some).collect(),
        }
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SelectItemKind::Expr { value, alias: None } => value.fmt(f),
            SelectItemKind::Expr {
                value,
                alias: Some(alias),
            } => write!(f, "{} AS {}", value, alias),
            SelectItemKind::AllColumns { table: None, .. } => f.write_str("*"),
            SelectItemKind::AllColumns {
                table: Some(table), ..
            } => write!(f, "{}.*", table),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => f.write_str("INNER"),
            JoinKind::LeftOuter => f.write_str("LEFT OUTER"),
            JoinKind::RightOuter => f.write_str("RIGHT OUTER"),
            JoinKind::FullOuter => f.write_str("FULL OUTER"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FromItem {
    BaseTable {
        name: String,
        alias: Option<String>,
        table: Option<TableId>,
    },
    SubSelect {
        body: Box<SelectStmt>,
        alias: String,
    },
    Join {
        left: Box<FromItem>,
        right: Box<FromItem>,
        kind: JoinKind,
        on: Option<Expr>,
    },
}

impl FromItem {
    pub fn base_table(name: &str, alias: Option<&str>) -> Self {
        FromItem::BaseTable {
            name: name.to_string(),
            alias: alias.map(str::to_string),
            table: None,
        }
    }

    /// True when every join in this item is an inner join.
    pub fn has_only_inner_joins(&self) -> bool {
        match self {
            FromItem::BaseTable { .. } | FromItem::SubSelect { .. } => true,
            FromItem::Join {
                left, right, kind, ..
            } => {
                *kind == JoinKind::Inner && left.has_only_inner_joins() && right.has_only_inner_joins()
            }
        }
    }
}

impl fmt::Display for FromItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FromItem::BaseTable {
                name, alias: None, ..
            } => f.write_str(name),
            FromItem::BaseTable {
                name,
                alias: Some(alias),
                ..
            } => write!(f, "{} AS {}", name, alias),
            FromItem::SubSelect { body, alias } => write!(f, "({}) AS {}", body, alias),
            FromItem::Join {
                left,
                right,
                kind,
                on,
            } => {
                write!(f, "{} {} JOIN {}", left, kind, right)?;
                if let Some(on) = on {
                    write!(f, " ON {}", on)?;
                }
                Ok(())
            }
        }
    }
}
