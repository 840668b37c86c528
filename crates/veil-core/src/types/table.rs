//! Table types: the generic table and schema-typed tables.
//!
//! A schema table knows its row-count bound and the type of every column.
//! A schema table with exactly one column is a *schema list*; there is no
//! separate representation, so equality between the two is structural.

use super::{PrimitiveType, RowCount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A table whose column types are known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaTableType {
    pub row_count: RowCount,
    pub column_types: Vec<PrimitiveType>,
}

impl SchemaTableType {
    pub fn new(row_count: RowCount, column_types: Vec<PrimitiveType>) -> Self {
        Self {
            row_count,
            column_types,
        }
    }

    /// Shorthand for a one-column table.
    pub fn list(row_count: RowCount, column_type: PrimitiveType) -> Self {
        Self::new(row_count, vec![column_type])
    }

    pub fn arity(&self) -> usize {
        self.column_types.len()
    }

    pub fn is_list(&self) -> bool {
        self.arity() == 1
    }

    /// The element type of a schema list.
    pub fn column_type(&self) -> Option<PrimitiveType> {
        match self.column_types.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// The single column of a one-row, one-column table, used when a
    /// subquery appears where a scalar is expected.
    pub fn scalar(&self) -> Option<PrimitiveType> {
        if self.row_count == RowCount::SingleRow {
            self.column_type()
        } else {
            None
        }
    }

    /// Join with another schema table. Unequal arity collapses to the generic table.
    pub fn common_supertype(&self, other: &SchemaTableType) -> TableType {
        if self.arity() != other.arity() {
            return TableType::Table;
        }

        let column_types = self
            .column_types
            .iter()
            .zip(&other.column_types)
            .map(|(a, b)| a.common_supertype(*b))
            .collect();

        TableType::Schema(SchemaTableType::new(
            self.row_count.common_supertype(other.row_count),
            column_types,
        ))
    }

    /// Meet with another schema table. Fails on unequal arity or on the
    /// first column pair without a meet.
    pub fn unify_with(&self, other: &SchemaTableType) -> Option<SchemaTableType> {
        if self.arity() != other.arity() {
            return None;
        }

        let column_types = self
            .column_types
            .iter()
            .zip(&other.column_types)
            .map(|(a, b)| a.unify_with(*b))
            .collect::<Option<Vec<_>>>()?;

        Some(SchemaTableType::new(
            self.row_count.unify_with(other.row_count),
            column_types,
        ))
    }

    pub fn is_supertype_of(&self, other: &SchemaTableType) -> bool {
        self.row_count.is_supertype_of(other.row_count)
            && self.arity() == other.arity()
            && self
                .column_types
                .iter()
                .zip(&other.column_types)
                .all(|(a, b)| a.is_supertype_of(*b))
    }
}

impl fmt::Display for SchemaTableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self.column_types.iter().map(|t| t.to_string()).collect();
        write!(f, "TABLE({}) {}", columns.join(", "), self.row_count)
    }
}

/// A table-sorted type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableType {
    /// A table with unknown shape, e.g. the type of a FROM clause.
    Table,
    /// A table with known column types.
    Schema(SchemaTableType),
}

impl TableType {
    pub fn common_supertype(&self, other: &TableType) -> TableType {
        match (self, other) {
            (TableType::Schema(a), TableType::Schema(b)) => a.common_supertype(b),
            _ => TableType::Table,
        }
    }

    pub fn unify_with(&self, other: &TableType) -> Option<TableType> {
        match (self, other) {
            (TableType::Table, x) => Some(x.clone()),
            (TableType::Schema(_), TableType::Table) => None,
            (TableType::Schema(a), TableType::Schema(b)) => a.unify_with(b).map(TableType::Schema),
        }
    }

    pub fn is_supertype_of(&self, other: &TableType) -> bool {
        match (self, other) {
            (TableType::Table, _) => true,
            (TableType::Schema(_), TableType::Table) => false,
            (TableType::Schema(a), TableType::Schema(b)) => a.is_supertype_of(b),
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableType::Table => f.write_str("TABLE"),
            TableType::Schema(schema) => schema.fmt(f),
        }
    }
}
