//! Depth-first traversal with enter/leave callbacks.
//!
//! [`walk_select`] calls `enter_*` before a node's children and `leave_*`
//! after them. All callbacks default to doing nothing, so a pass only
//! overrides the node kinds it cares about. Any error stops the walk.
//!
//! Within a plain select the clauses are visited in the order FROM, WHERE,
//! GROUP BY, HAVING, select items, so tables are declared before any column
//! reference is seen.

use super::{Expr, ExprKind, FromItem, PlainSelect, SelectItem, SelectItemKind, SelectStmt, SetOperation};
use veil_core::SqlError;

/// The clause of a plain select currently being visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    From,
    Where,
    GroupBy,
    Having,
    Items,
}

#[allow(unused_variables)]
pub trait Visitor {
    fn enter_select(&mut self, select: &mut PlainSelect) -> Result<(), SqlError> {
        Ok(())
    }

    fn leave_select(&mut self, select: &mut PlainSelect) -> Result<(), SqlError> {
        Ok(())
    }

    fn enter_set_operation(&mut self, op: &mut SetOperation) -> Result<(), SqlError> {
        Ok(())
    }

    fn leave_set_operation(&mut self, op: &mut SetOperation) -> Result<(), SqlError> {
        Ok(())
    }

    fn enter_clause(&mut self, clause: Clause) -> Result<(), SqlError> {
        Ok(())
    }

    fn leave_clause(&mut self, clause: Clause) -> Result<(), SqlError> {
        Ok(())
    }

    fn enter_from(&mut self, from: &mut FromItem) -> Result<(), SqlError> {
        Ok(())
    }

    fn leave_from(&mut self, from: &mut FromItem) -> Result<(), SqlError> {
        Ok(())
    }

    fn enter_expr(&mut self, expr: &mut Expr) -> Result<(), SqlError> {
        Ok(())
    }

    fn leave_expr(&mut self, expr: &mut Expr) -> Result<(), SqlError> {
        Ok(())
    }

    fn leave_select_item(&mut self, item: &mut SelectItem) -> Result<(), SqlError> {
        Ok(())
    }
}

pub fn walk_select<V: Visitor + ?Sized>(stmt: &mut SelectStmt, visitor: &mut V) -> Result<(), SqlError> {
    match stmt {
        SelectStmt::Plain(select) => walk_plain_select(select, visitor),
        SelectStmt::SetOperation(op) => {
            visitor.enter_set_operation(op)?;
            walk_select(&mut op.left, visitor)?;
            walk_select(&mut op.right, visitor)?;
            visitor.leave_set_operation(op)
        }
    }
}

fn walk_plain_select<V: Visitor + ?Sized>(
    select: &mut PlainSelect,
    visitor: &mut V,
) -> Result<(), SqlError> {
    visitor.enter_select(select)?;

    if let Some(from) = &mut select.from {
        visitor.enter_clause(Clause::From)?;
        walk_from(from, visitor)?;
        visitor.leave_clause(Clause::From)?;
    }

    if let Some(selection) = &mut select.selection {
        visitor.enter_clause(Clause::Where)?;
        walk_expr(selection, visitor)?;
        visitor.leave_clause(Clause::Where)?;
    }

    if !select.group_by.is_empty() {
        visitor.enter_clause(Clause::GroupBy)?;
        for expr in &mut select.group_by {
            walk_expr(expr, visitor)?;
        }
        visitor.leave_clause(Clause::GroupBy)?;
    }

    if let Some(having) = &mut select.having {
        visitor.enter_clause(Clause::Having)?;
        walk_expr(having, visitor)?;
        visitor.leave_clause(Clause::Having)?;
    }

    visitor.enter_clause(Clause::Items)?;
    for item in &mut select.items {
        if let SelectItemKind::Expr { value, .. } = &mut item.kind {
            walk_expr(value, visitor)?;
        }
        visitor.leave_select_item(item)?;
    }
    visitor.leave_clause(Clause::Items)?;

    visitor.leave_select(select)
}

pub fn walk_from<V: Visitor + ?Sized>(from: &mut FromItem, visitor: &mut V) -> Result<(), SqlError> {
    visitor.enter_from(from)?;
    match from {
        FromItem::BaseTable { .. } => {}
        FromItem::SubSelect { body, .. } => walk_select(body, visitor)?,
        FromItem::Join {
            left, right, on, ..
        } => {
            walk_from(left, visitor)?;
            walk_from(right, visitor)?;
            if let Some(on) = on {
                walk_expr(on, visitor)?;
            }
        }
    }
    visitor.leave_from(from)
}

pub fn walk_expr<V: Visitor + ?Sized>(expr: &mut Expr, visitor: &mut V) -> Result<(), SqlError> {
    visitor.enter_expr(expr)?;
    match &mut expr.kind {
        ExprKind::Column(_) | ExprKind::Constant(_) | ExprKind::Null | ExprKind::CountAll => {}
        ExprKind::Binary { left, right, .. } => {
            walk_expr(left, visitor)?;
            walk_expr(right, visitor)?;
        }
        ExprKind::Negate(value) => walk_expr(value, visitor)?,
        ExprKind::IsNull { expr, .. } => walk_expr(expr, visitor)?,
        ExprKind::In { expr, set, .. } => {
            walk_expr(expr, visitor)?;
            walk_expr(set, visitor)?;
        }
        ExprKind::Like { expr, pattern, .. } => {
            walk_expr(expr, visitor)?;
            walk_expr(pattern, visitor)?;
        }
        ExprKind::Exists { subquery, .. } => walk_expr(subquery, visitor)?,
        ExprKind::Aggregate { arg, .. } => walk_expr(arg, visitor)?,
        ExprKind::List(elements) => {
            for element in elements {
                walk_expr(element, visitor)?;
            }
        }
        ExprKind::SubSelect(sub) => walk_select(&mut sub.body, visitor)?,
        ExprKind::TableComparison { subquery, .. } => walk_expr(subquery, visitor)?,
    }
    visitor.leave_expr(expr)
}
