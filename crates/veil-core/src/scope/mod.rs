//! Scope resolution for nested, possibly correlated, queries.
//!
//! Each query block gets a nested scope that owns a [`FlatScope`] and may
//! have a parent. Lookups consult the local flat scope first and then walk
//! outward; they never look into child scopes. A miss at the outermost scope
//! is an error.
//!
//! All scopes, tables and query outputs of one statement live in a single
//! [`ScopeTree`] arena and are addressed by index.

mod flat;
mod table;

pub use flat::FlatScope;
pub use table::{Column, QueryOutput, Table, TableKind};

use crate::error::SqlError;
use crate::relation::TypedRelation;
use crate::types::{PrimitiveType, SchemaTableType};
use serde::{Deserialize, Serialize};
use std::fmt;
use table::ColumnKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId(pub usize);

/// A column, addressed by its owning table and position within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnId {
    pub table: TableId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId(pub usize);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.table.0, self.index)
    }
}

#[derive(Debug)]
struct NestedScope {
    parent: Option<ScopeId>,
    flat: FlatScope,
}

/// Arena holding every scope, table and query output of one statement.
#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: Vec<NestedScope>,
    tables: Vec<Table>,
    outputs: Vec<QueryOutput>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a scope. A scope without a parent is a root.
    pub fn create_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(NestedScope {
            parent,
            flat: FlatScope::new(),
        });
        id
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0].parent
    }

    pub fn flat_scope(&self, scope: ScopeId) -> &FlatScope {
        &self.scopes[scope.0].flat
    }

    /// Allocate the output slot of a query block.
    pub fn create_output(&mut self) -> OutputId {
        let id = OutputId(self.outputs.len());
        self.outputs.push(QueryOutput::default());
        id
    }

    pub fn output(&self, output: OutputId) -> &QueryOutput {
        &self.outputs[output.0]
    }

    /// Record the output column names of a query block. Unnamed outputs
    /// still occupy a position.
    pub fn set_output_names(
        &self,
        output: OutputId,
        names: Vec<Option<String>>,
    ) -> Result<(), SqlError> {
        self.outputs[output.0].names.set(names).map_err(|_| {
            SqlError::InvalidQuery(format!("Output names already set for {:?}", output))
        })
    }

    pub fn set_output_type(
        &self,
        output: OutputId,
        output_type: SchemaTableType,
    ) -> Result<(), SqlError> {
        self.outputs[output.0]
            .output_type
            .set(output_type)
            .map_err(|_| SqlError::InvalidQuery(format!("Output type already set for {:?}", output)))
    }

    /// Register a schema relation under `alias` in `scope`.
    pub fn create_base_table(
        &mut self,
        scope: ScopeId,
        relation: &TypedRelation,
        alias: &str,
    ) -> Result<TableId, SqlError> {
        let id = self.push_table(scope, alias, TableKind::Base(relation.clone()));
        self.register(scope, id)?;
        Ok(id)
    }

    /// Queue a table backed by a nested query's output. It becomes visible
    /// at the next lookup in `scope`.
    pub fn create_temporary_table(&mut self, scope: ScopeId, output: OutputId, alias: &str) -> TableId {
        let id = self.push_table(scope, alias, TableKind::Temp(output));
        self.scopes[scope.0].flat.pending.push(id);
        tracing::debug!(alias = %alias, scope = scope.0, "queued temporary table");
        id
    }

    fn push_table(&mut self, scope: ScopeId, alias: &str, kind: TableKind) -> TableId {
        let id = TableId(self.tables.len());
        self.tables.push(Table {
            id,
            alias: alias.to_string(),
            scope,
            kind,
            columns: Default::default(),
        });
        id
    }

    fn register(&mut self, scope: ScopeId, table: TableId) -> Result<(), SqlError> {
        let alias = self.tables[table.0].alias.clone();
        if self.scopes[scope.0].flat.tables_by_alias.contains_key(&alias) {
            return Err(SqlError::DuplicateAlias(alias));
        }

        let is_base = self.tables[table.0].is_base();
        let columns: Vec<(ColumnId, String)> = self
            .table_columns(table)?
            .iter()
            .map(|c| (c.id, c.name.clone()))
            .collect();

        let flat = &mut self.scopes[scope.0].flat;
        flat.tables_by_alias.insert(alias.clone(), table);
        if is_base {
            flat.base_tables.push(table);
        }
        for (id, name) in columns {
            flat.columns_by_name.entry(name).or_default().push(id);
            flat.columns.push(id);
            if is_base {
                flat.base_columns.push(id);
            }
        }

        tracing::debug!(alias = %alias, scope = scope.0, "registered table");
        Ok(())
    }

    fn drain_pending(&mut self, scope: ScopeId) -> Result<(), SqlError> {
        let pending = std::mem::take(&mut self.scopes[scope.0].flat.pending);
        for table in pending {
            self.register(scope, table)?;
        }
        Ok(())
    }

    // =========================================================================
    // Tables and columns
    // =========================================================================

    pub fn table(&self, table: TableId) -> &Table {
        &self.tables[table.0]
    }

    pub fn column(&self, column: ColumnId) -> Result<&Column, SqlError> {
        self.table_columns(column.table)?
            .get(column.index)
            .ok_or_else(|| SqlError::Unannotated(format!("No such column: {}", column)))
    }

    /// The scope that declared the column's table.
    pub fn column_scope(&self, column: ColumnId) -> ScopeId {
        self.tables[column.table.0].scope
    }

    /// The columns of a table, built on first access.
    ///
    /// A temporary table can only build its columns once the output names of
    /// its query have been recorded.
    pub fn table_columns(&self, table: TableId) -> Result<&[Column], SqlError> {
        let entry = &self.tables[table.0];
        if let Some(columns) = entry.columns.get() {
            return Ok(columns.as_slice());
        }

        let built = match &entry.kind {
            TableKind::Base(relation) => relation
                .columns()
                .iter()
                .enumerate()
                .map(|(index, (name, column_type))| {
                    Column::base(ColumnId { table, index }, &entry.alias, name, *column_type)
                })
                .collect(),
            TableKind::Temp(output) => {
                let names = self.outputs[output.0].names().ok_or_else(|| {
                    SqlError::Unannotated(format!(
                        "Output columns of subquery {} are not known yet",
                        entry.alias
                    ))
                })?;
                names
                    .iter()
                    .enumerate()
                    .filter_map(|(position, name)| name.as_deref().map(|n| (position, n)))
                    .enumerate()
                    .map(|(index, (position, name))| {
                        Column::temp(ColumnId { table, index }, &entry.alias, name, *output, position)
                    })
                    .collect()
            }
        };

        Ok(entry.columns.get_or_init(|| built).as_slice())
    }

    /// The type of a column. Temporary columns read it from their query's
    /// output type, which must have been computed already.
    pub fn column_type(&self, column: ColumnId) -> Result<PrimitiveType, SqlError> {
        let entry = self.column(column)?;
        match &entry.kind {
            ColumnKind::Base { column_type, .. } => Ok(*column_type),
            ColumnKind::Temp { output, position } => self.outputs[output.0]
                .output_type()
                .and_then(|t| t.column_types.get(*position).copied())
                .ok_or_else(|| {
                    SqlError::Unannotated(format!(
                        "Type hasn't yet been set for column: {}",
                        entry.qualified_name
                    ))
                }),
        }
    }

    // =========================================================================
    // Flat (single-block) lookups
    // =========================================================================

    /// Look up a column among the tables declared directly in `scope`.
    pub fn find_local_column(
        &mut self,
        scope: ScopeId,
        alias: Option<&str>,
        name: &str,
    ) -> Result<Option<ColumnId>, SqlError> {
        self.drain_pending(scope)?;
        let flat = &self.scopes[scope.0].flat;

        let Some(alias) = alias else {
            return match flat.columns_named(name) {
                [] => Ok(None),
                [only] => Ok(Some(*only)),
                _ => Err(SqlError::AmbiguousColumn(name.to_string())),
            };
        };

        let Some(table) = flat.table(alias) else {
            return Ok(None);
        };
        let matches: Vec<ColumnId> = self
            .table_columns(table)?
            .iter()
            .filter(|c| c.name == name)
            .map(|c| c.id)
            .collect();
        match matches.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(*only)),
            _ => Err(SqlError::AmbiguousColumn(format!("{}.{}", alias, name))),
        }
    }

    /// All columns of the table registered under `alias` in `scope`.
    pub fn local_columns_in_table(
        &mut self,
        scope: ScopeId,
        alias: &str,
    ) -> Result<Option<Vec<ColumnId>>, SqlError> {
        self.drain_pending(scope)?;
        let Some(table) = self.scopes[scope.0].flat.table(alias) else {
            return Ok(None);
        };
        Ok(Some(self.table_columns(table)?.iter().map(|c| c.id).collect()))
    }

    /// Every column declared in `scope`, in declaration order.
    pub fn local_columns(&mut self, scope: ScopeId) -> Result<Vec<ColumnId>, SqlError> {
        self.drain_pending(scope)?;
        Ok(self.scopes[scope.0].flat.columns.clone())
    }

    pub fn local_base_columns(&mut self, scope: ScopeId) -> Result<Vec<ColumnId>, SqlError> {
        self.drain_pending(scope)?;
        Ok(self.scopes[scope.0].flat.base_columns.clone())
    }

    pub fn local_base_tables(&mut self, scope: ScopeId) -> Result<Vec<TableId>, SqlError> {
        self.drain_pending(scope)?;
        Ok(self.scopes[scope.0].flat.base_tables.clone())
    }

    // =========================================================================
    // Nested lookups
    // =========================================================================

    /// Resolve a column reference from `scope`, walking outward through
    /// enclosing scopes. Fails only when no scope up to the root has it.
    pub fn find_column(
        &mut self,
        scope: ScopeId,
        alias: Option<&str>,
        name: &str,
    ) -> Result<ColumnId, SqlError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(column) = self.find_local_column(id, alias, name)? {
                return Ok(column);
            }
            current = self.scopes[id.0].parent;
        }

        Err(SqlError::UnresolvedColumn(match alias {
            Some(alias) => format!("{}.{}", alias, name),
            None => name.to_string(),
        }))
    }

    /// Resolve `alias.*` from `scope`, walking outward like [`find_column`](Self::find_column).
    pub fn columns_in_table(
        &mut self,
        scope: ScopeId,
        alias: &str,
    ) -> Result<Vec<ColumnId>, SqlError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(columns) = self.local_columns_in_table(id, alias)? {
                return Ok(columns);
            }
            current = self.scopes[id.0].parent;
        }

        Err(SqlError::UnresolvedTable(alias.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowCount;
    use pretty_assertions::assert_eq;

    fn relation(name: &str, columns: &[&str]) -> TypedRelation {
        TypedRelation::new(
            name,
            columns
                .iter()
                .map(|c| (c.to_string(), PrimitiveType::Numeric))
                .collect(),
            RowCount::UnlimitedRows,
        )
    }

    #[test]
    fn test_unqualified_lookup() {
        let mut tree = ScopeTree::new();
        let root = tree.create_scope(None);
        let t = tree
            .create_base_table(root, &relation("t", &["a", "b"]), "t")
            .unwrap();

        let b = tree.find_column(root, None, "b").unwrap();
        assert_eq!(b, ColumnId { table: t, index: 1 });
        assert_eq!(tree.column(b).unwrap().qualified_name(), "t.b");
        assert_eq!(tree.find_local_column(root, None, "z").unwrap(), None);
    }

    #[test]
    fn test_ambiguous_unqualified_lookup() {
        let mut tree = ScopeTree::new();
        let root = tree.create_scope(None);
        tree.create_base_table(root, &relation("t", &["a"]), "t").unwrap();
        tree.create_base_table(root, &relation("u", &["a"]), "u").unwrap();

        assert_eq!(
            tree.find_column(root, None, "a"),
            Err(SqlError::AmbiguousColumn("a".into()))
        );
        assert!(tree.find_column(root, Some("u"), "a").is_ok());
    }

    #[test]
    fn test_duplicate_alias() {
        let mut tree = ScopeTree::new();
        let root = tree.create_scope(None);
        tree.create_base_table(root, &relation("t", &["a"]), "x").unwrap();
        assert_eq!(
            tree.create_base_table(root, &relation("u", &["b"]), "x"),
            Err(SqlError::DuplicateAlias("x".into()))
        );
    }

    #[test]
    fn test_unresolved_at_root() {
        let mut tree = ScopeTree::new();
        let root = tree.create_scope(None);
        assert_eq!(
            tree.find_column(root, Some("t"), "a"),
            Err(SqlError::UnresolvedColumn("t.a".into()))
        );
        assert_eq!(
            tree.columns_in_table(root, "t"),
            Err(SqlError::UnresolvedTable("t".into()))
        );
    }

    #[test]
    fn test_temporary_table_columns_follow_output() {
        let mut tree = ScopeTree::new();
        let root = tree.create_scope(None);
        let output = tree.create_output();
        tree.set_output_names(output, vec![Some("x".into()), None, Some("y".into())])
            .unwrap();
        tree.create_temporary_table(root, output, "sub");
        assert!(tree.flat_scope(root).has_pending());

        let y = tree.find_column(root, Some("sub"), "y").unwrap();
        assert!(!tree.flat_scope(root).has_pending());
        assert_eq!(y.index, 1);
        assert!(tree.column_type(y).is_err());

        tree.set_output_type(
            output,
            SchemaTableType::new(
                RowCount::UnlimitedRows,
                vec![PrimitiveType::Bool, PrimitiveType::Numeric, PrimitiveType::String],
            ),
        )
        .unwrap();
        assert_eq!(tree.column_type(y).unwrap(), PrimitiveType::String);
        assert_eq!(tree.column(y).unwrap().equality_arg(), None);
    }
}
