//! Value types: the five-point primitive lattice.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar value type.
///
/// `Bottom` is the type of `NULL`; `Primitive` is the top of the lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrimitiveType {
    Bool,
    Numeric,
    String,
    Bottom,
    Primitive,
}

impl PrimitiveType {
    /// Exact-kind membership. Only `Primitive` covers other kinds, so
    /// `Bool.is_supertype_of(Bottom)` is false even though NULL coerces to
    /// every kind; use the `coerce_to_*` methods to ask that question.
    pub fn is_supertype_of(self, other: PrimitiveType) -> bool {
        match self {
            PrimitiveType::Primitive => true,
            kind => kind == other,
        }
    }

    /// Least upper bound. Always defined.
    pub fn common_supertype(self, other: PrimitiveType) -> PrimitiveType {
        match (self, other) {
            (PrimitiveType::Bottom, x) | (x, PrimitiveType::Bottom) => x,
            (a, b) if a == b => a,
            _ => PrimitiveType::Primitive,
        }
    }

    /// Greatest lower bound, absent for unrelated concrete kinds.
    pub fn unify_with(self, other: PrimitiveType) -> Option<PrimitiveType> {
        match (self, other) {
            (PrimitiveType::Bottom, _) | (_, PrimitiveType::Bottom) => Some(PrimitiveType::Bottom),
            (a, b) if a.is_supertype_of(b) => Some(b),
            (a, b) if b.is_supertype_of(a) => Some(a),
            _ => None,
        }
    }

    pub fn coerce_to_bool(self) -> Option<PrimitiveType> {
        self.coerce_to(PrimitiveType::Bool)
    }

    pub fn coerce_to_numeric(self) -> Option<PrimitiveType> {
        self.coerce_to(PrimitiveType::Numeric)
    }

    pub fn coerce_to_string(self) -> Option<PrimitiveType> {
        self.coerce_to(PrimitiveType::String)
    }

    /// Every value type is representable as a primitive.
    pub fn coerce_to_primitive(self) -> Option<PrimitiveType> {
        Some(self)
    }

    // NULL stands in for any concrete kind even though it is not their subtype.
    fn coerce_to(self, kind: PrimitiveType) -> Option<PrimitiveType> {
        (self == kind || self == PrimitiveType::Bottom).then_some(self)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::Bool => "BOOLEAN",
            PrimitiveType::Numeric => "NUMERIC",
            PrimitiveType::String => "STRING",
            PrimitiveType::Bottom => "NULL",
            PrimitiveType::Primitive => "PRIMITIVE",
        };
        f.write_str(name)
    }
}
