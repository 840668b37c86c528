//! Prepared statement invocations: `EXECUTE name(1, 'a');`
//!
//! Security views may contain placeholders `$1..$n` standing for the
//! arguments of the statement being executed. A [`SubstitutionMap`] built
//! from an [`ExecStatement`] replaces them before labeling.

use crate::error::ExecParseError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

type Pattern = LazyLock<Result<Regex, regex::Error>>;

static EXECUTE: Pattern = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*EXECUTE\s+([A-Za-z][A-Za-z0-9_]*)\s*\((.*)\)\s*;\s*$")
});

static ARGUMENT: Pattern =
    LazyLock::new(|| Regex::new(r"^\s*(?:([0-9]+)|'([^']*)')\s*(,|$)"));

static PLACEHOLDER: Pattern = LazyLock::new(|| Regex::new(r"\$[0-9]+"));

fn compiled(pattern: &'static Pattern) -> Result<&'static Regex, ExecParseError> {
    LazyLock::force(pattern)
        .as_ref()
        .map_err(ExecParseError::invalid_pattern)
}

/// A literal argument of an `EXECUTE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecArg {
    Integer(u64),
    /// Quoted string without escapes.
    String(String),
}

impl fmt::Display for ExecArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecArg::Integer(n) => write!(f, "{}", n),
            ExecArg::String(s) => write!(f, "'{}'", s),
        }
    }
}

/// A parsed `EXECUTE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecStatement {
    pub name: String,
    pub args: Vec<ExecArg>,
}

impl ExecStatement {
    pub fn parse(input: &str) -> Result<Self, ExecParseError> {
        let captures = compiled(&EXECUTE)?
            .captures(input)
            .ok_or_else(|| ExecParseError::malformed_statement(input))?;

        Ok(Self {
            name: captures[1].to_string(),
            args: parse_arguments(&captures[2])?,
        })
    }

    pub fn substitutions(&self) -> SubstitutionMap {
        SubstitutionMap::new(&self.args)
    }
}

impl fmt::Display for ExecStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EXECUTE {}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(");")
    }
}

fn parse_arguments(list: &str) -> Result<Vec<ExecArg>, ExecParseError> {
    let mut args = Vec::new();
    let mut rest = list;
    if rest.trim().is_empty() {
        return Ok(args);
    }

    loop {
        let captures = compiled(&ARGUMENT)?
            .captures(rest)
            .ok_or_else(|| ExecParseError::malformed_argument(rest))?;

        let arg = match (captures.get(1), captures.get(2)) {
            (Some(digits), _) => ExecArg::Integer(
                digits
                    .as_str()
                    .parse()
                    .map_err(|_| ExecParseError::integer_out_of_range(digits.as_str()))?,
            ),
            (None, Some(text)) => ExecArg::String(text.as_str().to_string()),
            (None, None) => return Err(ExecParseError::malformed_argument(rest)),
        };
        args.push(arg);

        let separator = captures.get(3).map(|m| m.as_str()).unwrap_or_default();
        rest = &rest[captures.get(0).map(|m| m.end()).unwrap_or(rest.len())..];
        if separator.is_empty() {
            return Ok(args);
        }
    }
}

/// Maps the placeholders `$1..$n` to the arguments of a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    substitutions: HashMap<String, ExecArg>,
}

impl SubstitutionMap {
    pub fn new(args: &[ExecArg]) -> Self {
        let substitutions = args
            .iter()
            .enumerate()
            .map(|(i, arg)| (format!("${}", i + 1), arg.clone()))
            .collect();
        Self { substitutions }
    }

    pub fn get(&self, placeholder: &str) -> Option<&ExecArg> {
        self.substitutions.get(placeholder)
    }

    /// The argument's literal for a placeholder; any other token unchanged.
    pub fn apply(&self, token: &str) -> String {
        match self.get(token) {
            Some(arg) => arg.to_string(),
            None => token.to_string(),
        }
    }

    /// Replace every placeholder in `text`. Placeholders beyond the
    /// argument count stay as they are.
    pub fn substitute(&self, text: &str) -> Result<String, ExecParseError> {
        Ok(compiled(&PLACEHOLDER)?
            .replace_all(text, |caps: &regex::Captures<'_>| self.apply(&caps[0]))
            .into_owned())
    }

    /// Placeholders in argument order.
    pub fn placeholders(&self) -> Vec<(String, &ExecArg)> {
        let mut entries: Vec<(usize, String, &ExecArg)> = self
            .substitutions
            .iter()
            .filter_map(|(k, v)| Some((k[1..].parse().ok()?, k.clone(), v)))
            .collect();
        entries.sort_by_key(|(index, _, _)| *index);
        entries.into_iter().map(|(_, k, v)| (k, v)).collect()
    }

    pub fn len(&self) -> usize {
        self.substitutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty()
    }
}
