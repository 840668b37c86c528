//! # veil-core
//!
//! Shared building blocks for analyzing SQL queries:
//!
//! - [`types`]: the value/table type lattice used to check expressions
//! - [`aggtype`]: aggregate classification of expressions and columns
//! - [`scope`]: binding of table aliases and column names across nested queries
//! - [`constraint`]: equality constraints between base columns and constants
//! - [`relation`]: typed relations and the `CREATE TABLE` schema language
//! - [`config`]: YAML analyzer configuration

pub mod aggtype;
pub mod config;
pub mod constraint;
pub mod error;
pub mod relation;
pub mod scope;
pub mod types;

pub use aggtype::{AggType, AggTypeForColumn};
pub use config::{AnalyzerConfig, ConfigError, PassToggles};
pub use constraint::{
    BaseColumnArg, ConstantValue, EqualityArg, EqualityConstraint, EqualityConstraintMatcher,
};
pub use error::SqlError;
pub use relation::{Schema, TypedRelation};
pub use scope::{ColumnId, OutputId, ScopeId, ScopeTree, TableId};
pub use types::{PrimitiveType, RowCount, SchemaTableType, TableType, Type};
