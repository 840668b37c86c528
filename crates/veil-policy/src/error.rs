//! Error types for labelers and `EXECUTE` parsing.

use std::fmt;
use thiserror::Error;

/// Errors raised while constructing a labeler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelerError {
    /// The supplied bottom label does not precede the supplied top label.
    #[error("bottom label {bottom} does not precede top label {top}")]
    BottomAboveTop { bottom: String, top: String },
}

/// Error type for `EXECUTE` statements that fail to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecParseError {
    /// The kind of parse error.
    pub kind: ExecParseErrorKind,
    /// Human-readable error message, including the offending input.
    pub message: String,
}

impl ExecParseError {
    pub fn new(kind: ExecParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Input is not of the form `EXECUTE name(args);`.
    pub fn malformed_statement(input: &str) -> Self {
        Self::new(
            ExecParseErrorKind::MalformedStatement,
            format!("Expected EXECUTE name(arg, ...); but found: {}", input.trim()),
        )
    }

    /// An argument is neither an unsigned integer nor a quoted string.
    pub fn malformed_argument(argument: &str) -> Self {
        Self::new(
            ExecParseErrorKind::MalformedArgument,
            format!("Invalid EXECUTE argument: {}", argument.trim()),
        )
    }

    /// One of the statement grammar's regular expressions failed to compile.
    pub fn invalid_pattern(error: &regex::Error) -> Self {
        Self::new(
            ExecParseErrorKind::InvalidPattern,
            format!("Invalid EXECUTE grammar: {}", error),
        )
    }

    /// An integer argument does not fit in 64 bits.
    pub fn integer_out_of_range(literal: &str) -> Self {
        Self::new(
            ExecParseErrorKind::IntegerOutOfRange,
            format!("Integer argument out of range: {}", literal),
        )
    }
}

impl fmt::Display for ExecParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExecParseError {}

/// Categories of `EXECUTE` parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecParseErrorKind {
    MalformedStatement,
    MalformedArgument,
    IntegerOutOfRange,
    InvalidPattern,
}
