//! Column resolution.
//!
//! Creates a scope per query block, registers the block's FROM items in it
//! and binds every column reference and `*` item to concrete columns.
//! Output names of every query block are recorded on the way out so that
//! derived tables can expose them as columns.

use crate::ast::visit::{Visitor, walk_select};
use crate::ast::{
    Expr, ExprKind, FromItem, PlainSelect, SelectItem, SelectItemKind, SetOperation, Statement,
};
use crate::pipeline::{PassId, TransformationPass};
use veil_core::{Schema, ScopeId, ScopeTree, SqlError};

/// Binds tables and columns against a [`Schema`].
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    schema: Schema,
}

impl ColumnResolver {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }
}

impl TransformationPass for ColumnResolver {
    fn id(&self) -> PassId {
        PassId::COLUMN_RESOLVER
    }

    fn execute(&self, statement: &mut Statement) -> Result<(), SqlError> {
        let mut visitor = ResolveVisitor {
            schema: &self.schema,
            scopes: &mut statement.scopes,
            stack: Vec::new(),
        };
        walk_select(&mut statement.body, &mut visitor)
    }
}

struct ResolveVisitor<'a> {
    schema: &'a Schema,
    scopes: &'a mut ScopeTree,
    stack: Vec<ScopeId>,
}

impl ResolveVisitor<'_> {
    fn current(&self) -> Result<ScopeId, SqlError> {
        self.stack
            .last()
            .copied()
            .ok_or_else(|| SqlError::Unannotated("no enclosing query block".to_string()))
    }
}

impl Visitor for ResolveVisitor<'_> {
    fn enter_select(&mut self, select: &mut PlainSelect) -> Result<(), SqlError> {
        let scope = self.scopes.create_scope(self.stack.last().copied());
        select.scope = Some(scope);
        self.stack.push(scope);
        Ok(())
    }

    fn leave_select(&mut self, select: &mut PlainSelect) -> Result<(), SqlError> {
        let names = select.items.iter().flat_map(|i| i.column_names()).collect();
        self.scopes.set_output_names(select.output, names)?;
        self.stack.pop();
        Ok(())
    }

    fn leave_set_operation(&mut self, op: &mut SetOperation) -> Result<(), SqlError> {
        let names = self
            .scopes
            .output(op.left.output())
            .names()
            .map(<[Option<String>]>::to_vec)
            .ok_or_else(|| SqlError::Unannotated(format!("Output names missing for: {}", op.left)))?;
        self.scopes.set_output_names(op.output, names)
    }

    fn leave_from(&mut self, from: &mut FromItem) -> Result<(), SqlError> {
        let scope = self.current()?;
        match from {
            FromItem::BaseTable { name, alias, table } => {
                let schema = self.schema;
                let relation = schema
                    .find_relation(name)
                    .ok_or_else(|| SqlError::UnknownRelation(name.clone()))?;
                let alias = alias.as_deref().unwrap_or(name.as_str());
                *table = Some(self.scopes.create_base_table(scope, relation, alias)?);
            }
            FromItem::SubSelect { body, alias } => {
                self.scopes.create_temporary_table(scope, body.output(), alias);
            }
            FromItem::Join { .. } => {}
        }
        Ok(())
    }

    fn leave_expr(&mut self, expr: &mut Expr) -> Result<(), SqlError> {
        if let ExprKind::Column(reference) = &mut expr.kind {
            let scope = self.current()?;
            let column = self
                .scopes
                .find_column(scope, reference.table.as_deref(), &reference.name)?;
            tracing::debug!(reference = %reference, column = %column, "bound column");
            reference.column = Some(column);
        }
        Ok(())
    }

    fn leave_select_item(&mut self, item: &mut SelectItem) -> Result<(), SqlError> {
        let SelectItemKind::AllColumns {
            table,
            columns,
            names,
        } = &mut item.kind
        else {
            return Ok(());
        };

        let scope = self.current()?;
        *columns = match table {
            None => self.scopes.local_columns(scope)?,
            Some(alias) => self.scopes.columns_in_table(scope, alias)?,
        };
        *names = columns
            .iter()
            .map(|c| self.scopes.column(*c).map(|c| c.name().to_string()))
            .collect::<Result<_, _>>()?;
        Ok(())
    }
}
