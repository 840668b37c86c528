//! The two-sorted type system used to check query expressions.
//!
//! A [`Type`] is either a value type ([`PrimitiveType`]) or a table type
//! ([`TableType`]). Coercions return `None` when a type cannot be used in
//! the requested role; join and meet are only defined within one sort.
//!
//! A schema table coerces to a scalar kind only when it has a single row and
//! a single column, which is how scalar subqueries are typed.

mod primitive;
mod row_count;
mod table;

pub use primitive::PrimitiveType;
pub use row_count::RowCount;
pub use table::{SchemaTableType, TableType};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of an expression or query node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Value(PrimitiveType),
    Table(TableType),
}

impl Type {
    pub const BOOL: Type = Type::Value(PrimitiveType::Bool);
    pub const NUMERIC: Type = Type::Value(PrimitiveType::Numeric);
    pub const STRING: Type = Type::Value(PrimitiveType::String);
    pub const NULL: Type = Type::Value(PrimitiveType::Bottom);
    pub const PRIMITIVE: Type = Type::Value(PrimitiveType::Primitive);
    pub const TABLE: Type = Type::Table(TableType::Table);

    /// A schema-typed table.
    pub fn schema_table(row_count: RowCount, column_types: Vec<PrimitiveType>) -> Type {
        Type::Table(TableType::Schema(SchemaTableType::new(row_count, column_types)))
    }

    pub fn coerce_to_bool(&self) -> Option<PrimitiveType> {
        self.coerce_scalar(PrimitiveType::coerce_to_bool)
    }

    pub fn coerce_to_numeric(&self) -> Option<PrimitiveType> {
        self.coerce_scalar(PrimitiveType::coerce_to_numeric)
    }

    pub fn coerce_to_string(&self) -> Option<PrimitiveType> {
        self.coerce_scalar(PrimitiveType::coerce_to_string)
    }

    pub fn coerce_to_primitive(&self) -> Option<PrimitiveType> {
        self.coerce_scalar(PrimitiveType::coerce_to_primitive)
    }

    pub fn coerce_to_table(&self) -> Option<TableType> {
        match self {
            Type::Table(table) => Some(table.clone()),
            Type::Value(_) => None,
        }
    }

    pub fn coerce_to_schema_table(&self) -> Option<SchemaTableType> {
        match self {
            Type::Table(TableType::Schema(schema)) => Some(schema.clone()),
            _ => None,
        }
    }

    pub fn coerce_to_schema_list(&self) -> Option<SchemaTableType> {
        self.coerce_to_schema_table().filter(SchemaTableType::is_list)
    }

    pub fn common_supertype(&self, other: &Type) -> Option<Type> {
        match (self, other) {
            (Type::Value(a), Type::Value(b)) => Some(Type::Value(a.common_supertype(*b))),
            (Type::Table(a), Type::Table(b)) => Some(Type::Table(a.common_supertype(b))),
            _ => None,
        }
    }

    pub fn unify_with(&self, other: &Type) -> Option<Type> {
        match (self, other) {
            (Type::Value(a), Type::Value(b)) => a.unify_with(*b).map(Type::Value),
            (Type::Table(a), Type::Table(b)) => a.unify_with(b).map(Type::Table),
            _ => None,
        }
    }

    pub fn is_supertype_of(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Value(a), Type::Value(b)) => a.is_supertype_of(*b),
            (Type::Table(a), Type::Table(b)) => a.is_supertype_of(b),
            _ => false,
        }
    }

    fn coerce_scalar(
        &self,
        coerce: impl Fn(PrimitiveType) -> Option<PrimitiveType>,
    ) -> Option<PrimitiveType> {
        match self {
            Type::Value(value) => coerce(*value),
            Type::Table(TableType::Schema(schema)) => schema.scalar().and_then(coerce),
            Type::Table(TableType::Table) => None,
        }
    }
}

impl From<PrimitiveType> for Type {
    fn from(value: PrimitiveType) -> Self {
        Type::Value(value)
    }
}

impl From<SchemaTableType> for Type {
    fn from(schema: SchemaTableType) -> Self {
        Type::Table(TableType::Schema(schema))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Value(value) => value.fmt(f),
            Type::Table(table) => table.fmt(f),
        }
    }
}
