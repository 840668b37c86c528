use super::{ColumnId, TableId};
use std::collections::HashMap;

/// Tables and columns declared directly in one query block.
///
/// Temporary tables are queued rather than indexed when they are created;
/// the owning [`ScopeTree`](super::ScopeTree) drains the queue, in order,
/// before answering any lookup.
#[derive(Debug, Default)]
pub struct FlatScope {
    pub(crate) tables_by_alias: HashMap<String, TableId>,
    pub(crate) columns_by_name: HashMap<String, Vec<ColumnId>>,
    pub(crate) columns: Vec<ColumnId>,
    pub(crate) base_columns: Vec<ColumnId>,
    pub(crate) base_tables: Vec<TableId>,
    pub(crate) pending: Vec<TableId>,
}

impl FlatScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn table(&self, alias: &str) -> Option<TableId> {
        self.tables_by_alias.get(alias).copied()
    }

    pub(crate) fn columns_named(&self, name: &str) -> &[ColumnId] {
        self.columns_by_name
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
