//! Invocation descriptions handed to process executors.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{MatrixError, MatrixResult};

/// Environment overrides applied to a tool process, ordered by name.
pub type Environment = BTreeMap<String, String>;

/// A fully resolved way of running the external tool once.
///
/// Built once per variant and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<String>,
    env: Environment,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, env: Environment) -> Self {
        Self {
            program: program.into(),
            args,
            env,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Render as a shell-like command line (`NAME=value program arg ...`).
    ///
    /// Arguments containing whitespace or quotes are single-quoted. The result is for display and dry runs only;
    /// executors never re-parse it.
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = self.env.iter().map(|(k, v)| format!("{k}={}", quote(v))).collect();
        parts.push(quote(&self.program.to_string_lossy()));
        parts.extend(self.args.iter().map(|a| quote(a)));
        parts.join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote(token: &str) -> String {
    if token.is_empty() {
        return "''".to_string();
    }
    if token.chars().any(|c| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", token.replace('\'', r"'\''"))
    } else {
        token.to_string()
    }
}

/// Parse a `NAME=VALUE` environment assignment.
///
/// The value may be empty and may itself contain `=`; the name may not be empty.
pub fn parse_env_assignment(text: &str) -> MatrixResult<(String, String)> {
    match text.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(MatrixError::InvalidEnvAssignment(text.to_string())),
    }
}

/// Collect a list of `NAME=VALUE` assignments into an [`Environment`]. Later assignments win.
pub fn parse_environment<'a>(assignments: impl IntoIterator<Item = &'a str>) -> MatrixResult<Environment> {
    let mut env = Environment::new();
    for assignment in assignments {
        let (name, value) = parse_env_assignment(assignment)?;
        env.insert(name, value);
    }
    Ok(env)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_assignment() {
        assert_eq!(
            parse_env_assignment("MYSQLSH_TERM_COLOR_MODE=nocolor").unwrap(),
            ("MYSQLSH_TERM_COLOR_MODE".to_string(), "nocolor".to_string())
        );
    }

    #[test]
    fn test_parse_env_assignment_keeps_equals_in_value() {
        assert_eq!(
            parse_env_assignment("CONN=a=b;c=d").unwrap(),
            ("CONN".to_string(), "a=b;c=d".to_string())
        );
    }

    #[test]
    fn test_parse_env_assignment_empty_value() {
        assert_eq!(parse_env_assignment("EMPTY=").unwrap().1, "");
    }

    #[test]
    fn test_parse_env_assignment_rejects_missing_name() {
        assert!(matches!(
            parse_env_assignment("=value"),
            Err(MatrixError::InvalidEnvAssignment(_))
        ));
        assert!(matches!(
            parse_env_assignment("novalue"),
            Err(MatrixError::InvalidEnvAssignment(_))
        ));
    }

    #[test]
    fn test_parse_environment_later_wins() {
        let env = parse_environment(["A=1", "B=2", "A=3"]).unwrap();
        assert_eq!(env.get("A").map(String::as_str), Some("3"));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_command_line_quotes_tokens() {
        let mut env = Environment::new();
        env.insert("MODE".to_string(), "no color".to_string());
        let invocation = Invocation::new(
            "mysqlsh",
            vec!["--".to_string(), "it's".to_string(), String::new()],
            env,
        );
        assert_eq!(invocation.command_line(), r"MODE='no color' mysqlsh -- 'it'\''s' ''");
    }
}
