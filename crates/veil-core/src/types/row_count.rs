use serde::{Deserialize, Serialize};
use std::fmt;

/// Cardinality bound on a table type. `SingleRow ⊑ UnlimitedRows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowCount {
    SingleRow,
    UnlimitedRows,
}

impl RowCount {
    pub fn common_supertype(self, other: RowCount) -> RowCount {
        if self == RowCount::UnlimitedRows || other == RowCount::UnlimitedRows {
            RowCount::UnlimitedRows
        } else {
            RowCount::SingleRow
        }
    }

    pub fn unify_with(self, other: RowCount) -> RowCount {
        if self == RowCount::SingleRow || other == RowCount::SingleRow {
            RowCount::SingleRow
        } else {
            RowCount::UnlimitedRows
        }
    }

    pub fn is_supertype_of(self, other: RowCount) -> bool {
        self == RowCount::UnlimitedRows || other == RowCount::SingleRow
    }
}

impl fmt::Display for RowCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowCount::SingleRow => f.write_str("SINGLE_ROW"),
            RowCount::UnlimitedRows => f.write_str("UNLIMITED_ROWS"),
        }
    }
}
