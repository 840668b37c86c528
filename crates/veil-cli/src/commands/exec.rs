//! `veil exec` command implementation.

use anyhow::Result;
use std::fmt::Write;
use veil_policy::ExecStatement;

pub fn run(text: &str, template: Option<&str>) -> Result<String> {
    let statement = ExecStatement::parse(text)?;
    let substitutions = statement.substitutions();

    let mut out = String::new();
    writeln!(out, "{}", statement)?;
    for (placeholder, arg) in substitutions.placeholders() {
        writeln!(out, "  {} -> {}", placeholder, arg)?;
    }
    if let Some(template) = template {
        writeln!(out, "{}", substitutions.substitute(template)?)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lists_placeholders() {
        let out = run("EXECUTE adams('a', 6);", Some("x = $2 OR y = $1")).unwrap();
        assert_eq!(
            out,
            "EXECUTE adams('a', 6);\n  $1 -> 'a'\n  $2 -> 6\nx = 6 OR y = 'a'\n"
        );
    }

    #[test]
    fn test_reports_offending_input() {
        let err = run("EXECUTE adams(;", None).unwrap_err();
        assert!(err.to_string().contains("EXECUTE adams(;"));
    }
}
