//! Typed relations and the schema mini-language.
//!
//! A schema file is a sequence of statements of the form
//!
//! ```text
//! CREATE TABLE name ( col TYPE {, col TYPE} ) ;
//! ```
//!
//! where `TYPE` is one of `PRIMITIVE`, `BOOL`, `NUMERIC` or `STRING`.
//! Keywords and type names are case-insensitive and whitespace is free-form.

use crate::error::SqlError;
use crate::types::{PrimitiveType, RowCount};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static CREATE_TABLE: Pattern = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*CREATE\s+TABLE\s+([A-Za-z][A-Za-z0-9_]*)\s*\((.*)\)\s*;\s*$")
});

static COLUMN_DEF: Pattern =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*)\s+([A-Za-z]+)\s*$"));

fn compiled(pattern: &'static Pattern) -> Result<&'static Regex, SqlError> {
    LazyLock::force(pattern)
        .as_ref()
        .map_err(|e| SqlError::Parse(format!("invalid schema grammar: {}", e)))
}

/// A named relation with typed columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedRelation {
    name: String,
    columns: Vec<(String, PrimitiveType)>,
    row_count: RowCount,
}

impl TypedRelation {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<(String, PrimitiveType)>,
        row_count: RowCount,
    ) -> Self {
        Self {
            name: name.into(),
            columns,
            row_count,
        }
    }

    /// Parse a single `CREATE TABLE` statement.
    pub fn parse(statement: &str) -> Result<Self, SqlError> {
        let captures = compiled(&CREATE_TABLE)?
            .captures(statement)
            .ok_or_else(|| SqlError::Parse(format!("not a CREATE TABLE statement: {}", statement.trim())))?;

        let name = &captures[1];
        let columns = captures[2]
            .split(',')
            .map(parse_column)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(name, columns, RowCount::UnlimitedRows))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[(String, PrimitiveType)] {
        &self.columns
    }

    pub fn row_count(&self) -> RowCount {
        self.row_count
    }

    pub fn arity(&self) -> usize {
        self.columns.len()
    }
}

fn parse_column(definition: &str) -> Result<(String, PrimitiveType), SqlError> {
    let captures = compiled(&COLUMN_DEF)?
        .captures(definition)
        .ok_or_else(|| SqlError::Parse(format!("bad column definition: {}", definition.trim())))?;

    let column_type = match captures[2].to_ascii_uppercase().as_str() {
        "PRIMITIVE" => PrimitiveType::Primitive,
        "BOOL" => PrimitiveType::Bool,
        "NUMERIC" => PrimitiveType::Numeric,
        "STRING" => PrimitiveType::String,
        other => return Err(SqlError::Parse(format!("unknown column type: {}", other))),
    };

    Ok((captures[1].to_string(), column_type))
}

impl fmt::Display for TypedRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|(name, t)| format!("{}: {}", name, t))
            .collect();
        write!(f, "{}({})", self.name, columns.join(", "))
    }
}

/// The relations a query may reference, in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    relations: Vec<TypedRelation>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a sequence of `CREATE TABLE` statements, each terminated by `;`.
    pub fn parse(text: &str) -> Result<Self, SqlError> {
        let mut schema = Self::new();
        for statement in text.split_inclusive(';') {
            if statement.trim().is_empty() {
                continue;
            }
            schema.add(TypedRelation::parse(statement)?);
        }
        Ok(schema)
    }

    /// Add a relation, replacing any earlier relation with the same name.
    pub fn add(&mut self, relation: TypedRelation) {
        if let Some(existing) = self.relations.iter_mut().find(|r| r.name == relation.name) {
            tracing::warn!(relation = %relation.name, "relation redefined in schema");
            *existing = relation;
        } else {
            self.relations.push(relation);
        }
    }

    pub fn find_relation(&self, name: &str) -> Option<&TypedRelation> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub fn relations(&self) -> &[TypedRelation] {
        &self.relations
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
