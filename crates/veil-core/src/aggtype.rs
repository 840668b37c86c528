//! Aggregate classification.
//!
//! Every expression is classified as aggregate, non-aggregate, or both
//! ([`AggType::Bottom`], e.g. constants). Joining an aggregate with a
//! non-aggregate is undefined, which is how illegal mixing is detected.

use crate::scope::ColumnId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The three-point aggregate lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggType {
    Aggregate,
    NonAggregate,
    /// Valid in both aggregate and non-aggregate positions.
    Bottom,
}

impl AggType {
    pub fn common_supertype(self, other: AggType) -> Option<AggType> {
        match (self, other) {
            (AggType::Bottom, x) | (x, AggType::Bottom) => Some(x),
            (a, b) if a == b => Some(a),
            _ => None,
        }
    }

    pub fn to_aggregate(self) -> Option<AggType> {
        matches!(self, AggType::Aggregate | AggType::Bottom).then_some(self)
    }

    pub fn to_non_aggregate(self) -> Option<AggType> {
        matches!(self, AggType::NonAggregate | AggType::Bottom).then_some(self)
    }
}

impl fmt::Display for AggType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggType::Aggregate => f.write_str("AGGREGATE"),
            AggType::NonAggregate => f.write_str("NON_AGGREGATE"),
            AggType::Bottom => f.write_str("AGGREGATE_OR_NOT"),
        }
    }
}

/// Assigns an [`AggType`] to each column visible in one query block.
///
/// Columns default to non-aggregate. Instances are never mutated; entering a
/// GROUP BY or a subquery derives a new classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggTypeForColumn {
    aggregate: HashSet<ColumnId>,
    bottom: HashSet<ColumnId>,
}

impl AggTypeForColumn {
    /// Every column is non-aggregate.
    pub fn all_non_aggregate() -> Self {
        Self::default()
    }

    pub fn agg_type(&self, column: ColumnId) -> AggType {
        if self.aggregate.contains(&column) {
            AggType::Aggregate
        } else if self.bottom.contains(&column) {
            AggType::Bottom
        } else {
            AggType::NonAggregate
        }
    }

    /// Classifier for a subquery: this classifier's bottom columns and the
    /// subquery's correlated columns act as constants inside it.
    pub fn for_subquery(&self, correlated: impl IntoIterator<Item = ColumnId>) -> Self {
        let mut bottom = self.bottom.clone();
        bottom.extend(correlated);
        Self {
            aggregate: HashSet::new(),
            bottom,
        }
    }

    /// Classifier once the GROUP BY list is known.
    pub fn with_aggregates(&self, columns: impl IntoIterator<Item = ColumnId>) -> Self {
        let mut derived = self.clone();
        for column in columns {
            derived.bottom.remove(&column);
            derived.aggregate.insert(column);
        }
        derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::TableId;

    fn column(index: usize) -> ColumnId {
        ColumnId {
            table: TableId(0),
            index,
        }
    }

    #[test]
    fn test_lattice_join() {
        use AggType::*;
        assert_eq!(Aggregate.common_supertype(NonAggregate), None);
        assert_eq!(NonAggregate.common_supertype(Aggregate), None);
        assert_eq!(Bottom.common_supertype(Aggregate), Some(Aggregate));
        assert_eq!(Bottom.common_supertype(NonAggregate), Some(NonAggregate));
        assert_eq!(Bottom.common_supertype(Bottom), Some(Bottom));
        assert_eq!(Aggregate.common_supertype(Aggregate), Some(Aggregate));
    }

    #[test]
    fn test_narrowing() {
        use AggType::*;
        assert_eq!(Bottom.to_aggregate(), Some(Bottom));
        assert_eq!(Bottom.to_non_aggregate(), Some(Bottom));
        assert_eq!(Aggregate.to_non_aggregate(), None);
        assert_eq!(NonAggregate.to_aggregate(), None);
    }

    #[test]
    fn test_classifier_derivations() {
        let (a, b, c) = (column(0), column(1), column(2));
        let base = AggTypeForColumn::all_non_aggregate();
        assert_eq!(base.agg_type(a), AggType::NonAggregate);

        let grouped = base.with_aggregates([a]);
        assert_eq!(grouped.agg_type(a), AggType::Aggregate);
        assert_eq!(base.agg_type(a), AggType::NonAggregate);

        let inner = grouped.for_subquery([b]);
        assert_eq!(inner.agg_type(a), AggType::NonAggregate);
        assert_eq!(inner.agg_type(b), AggType::Bottom);

        let nested = inner.for_subquery([c]);
        assert_eq!(nested.agg_type(b), AggType::Bottom);
        assert_eq!(nested.agg_type(c), AggType::Bottom);
    }
}
