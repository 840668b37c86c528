//! Tables and columns registered in a scope.
//!
//! A table exclusively owns its columns. The column list is built on first
//! access and never changes afterwards. Columns refer back to their table
//! through a [`ColumnId`] rather than a pointer.

use super::{ColumnId, OutputId, ScopeId, TableId};
use crate::constraint::{BaseColumnArg, EqualityArg};
use crate::relation::TypedRelation;
use crate::types::{PrimitiveType, SchemaTableType};
use std::cell::OnceCell;

/// What a table is backed by.
#[derive(Debug, Clone)]
pub enum TableKind {
    /// A relation from the schema.
    Base(TypedRelation),
    /// The output of a nested query in a FROM clause.
    Temp(OutputId),
}

/// A table visible in one query block under an alias.
#[derive(Debug)]
pub struct Table {
    pub(crate) id: TableId,
    pub(crate) alias: String,
    pub(crate) scope: ScopeId,
    pub(crate) kind: TableKind,
    pub(crate) columns: OnceCell<Vec<Column>>,
}

impl Table {
    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The scope the table was declared in.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn kind(&self) -> &TableKind {
        &self.kind
    }

    pub fn is_base(&self) -> bool {
        matches!(self.kind, TableKind::Base(_))
    }

    /// The backing relation of a base table.
    pub fn relation(&self) -> Option<&TypedRelation> {
        match &self.kind {
            TableKind::Base(relation) => Some(relation),
            TableKind::Temp(_) => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum ColumnKind {
    Base {
        column_type: PrimitiveType,
        equality_arg: OnceCell<EqualityArg>,
    },
    /// Position of the column in the nested query's output.
    Temp { output: OutputId, position: usize },
}

/// A column of a [`Table`].
#[derive(Debug)]
pub struct Column {
    pub(crate) id: ColumnId,
    pub(crate) name: String,
    pub(crate) qualified_name: String,
    pub(crate) kind: ColumnKind,
}

impl Column {
    pub(crate) fn base(id: ColumnId, alias: &str, name: &str, column_type: PrimitiveType) -> Self {
        Self {
            id,
            name: name.to_string(),
            qualified_name: format!("{}.{}", alias, name),
            kind: ColumnKind::Base {
                column_type,
                equality_arg: OnceCell::new(),
            },
        }
    }

    pub(crate) fn temp(
        id: ColumnId,
        alias: &str,
        name: &str,
        output: OutputId,
        position: usize,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            qualified_name: format!("{}.{}", alias, name),
            kind: ColumnKind::Temp { output, position },
        }
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }

    pub fn table(&self) -> TableId {
        self.id.table
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `alias.name`
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn is_base(&self) -> bool {
        matches!(self.kind, ColumnKind::Base { .. })
    }

    /// The equality argument standing for this column in join and filter
    /// predicates. Only base columns have one; it is created on first use.
    pub fn equality_arg(&self) -> Option<&EqualityArg> {
        match &self.kind {
            ColumnKind::Base { equality_arg, .. } => Some(equality_arg.get_or_init(|| {
                EqualityArg::BaseColumn(BaseColumnArg::new(self.id, &self.qualified_name))
            })),
            ColumnKind::Temp { .. } => None,
        }
    }
}

/// The output of one query block, filled in by later analysis stages and
/// read lazily by the temporary tables built from it.
#[derive(Debug, Default)]
pub struct QueryOutput {
    pub(crate) names: OnceCell<Vec<Option<String>>>,
    pub(crate) output_type: OnceCell<SchemaTableType>,
}

impl QueryOutput {
    pub fn names(&self) -> Option<&[Option<String>]> {
        self.names.get().map(Vec::as_slice)
    }

    pub fn output_type(&self) -> Option<&SchemaTableType> {
        self.output_type.get()
    }
}
