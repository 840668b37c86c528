//! Error types for query analysis.
//!
//! Every input-time contract violation found while binding or checking a
//! query is reported as a [`SqlError`]. Callers treat it as fatal for the
//! query being analyzed.

use thiserror::Error;

/// Errors raised while resolving, typing or classifying a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// An unqualified column name matched more than one column.
    #[error("Ambiguous column name: {0}")]
    AmbiguousColumn(String),

    /// A column reference could not be bound in any enclosing scope.
    #[error("Couldn't resolve column: {0}")]
    UnresolvedColumn(String),

    /// A table alias could not be bound in any enclosing scope.
    #[error("Couldn't resolve table: {0}")]
    UnresolvedTable(String),

    /// A FROM item names a relation missing from the schema.
    #[error("Couldn't find table: {0}")]
    UnknownRelation(String),

    /// A table alias was registered twice in the same query block.
    #[error("Table alias is already in use: {0}")]
    DuplicateAlias(String),

    /// Aggregate and non-aggregate expressions were mixed illegally.
    #[error("{0}")]
    AggregateMismatch(String),

    /// An expression does not have the type its context requires.
    #[error("{0}")]
    TypeMismatch(String),

    /// The query is structurally invalid (e.g. HAVING without GROUP BY).
    #[error("{0}")]
    InvalidQuery(String),

    /// The query uses SQL the analyzer does not model.
    #[error("Unsupported SQL Feature: {0}")]
    Unsupported(String),

    /// Text could not be parsed.
    #[error("failed to parse: {0}")]
    Parse(String),

    /// A pass read an annotation that an earlier pass should have written.
    #[error("{0}")]
    Unannotated(String),
}

impl SqlError {
    /// Build an aggregate mismatch error for two operands.
    pub fn agg_mismatch(left: impl std::fmt::Display, right: impl std::fmt::Display) -> Self {
        Self::AggregateMismatch(format!(
            "Aggregate/non-aggregate mismatch: {} and {}",
            left, right
        ))
    }

    /// Build a type error of the form `Must be <kind>: <what>`.
    pub fn must_be(kind: &str, what: impl std::fmt::Display) -> Self {
        Self::TypeMismatch(format!("Must be {}: {}", kind, what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_reported_text() {
        assert_eq!(
            SqlError::AmbiguousColumn("x".into()).to_string(),
            "Ambiguous column name: x"
        );
        assert_eq!(
            SqlError::must_be("numeric", "'a'").to_string(),
            "Must be numeric: 'a'"
        );
        assert_eq!(
            SqlError::agg_mismatch("COUNT(*)", "a").to_string(),
            "Aggregate/non-aggregate mismatch: COUNT(*) and a"
        );
    }
}
