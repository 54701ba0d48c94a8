//! Error types shared by the catalog, executors and runner.

use std::fmt;

use thiserror::Error;

use crate::script::ScriptError;

/// Errors raised while building or running a matrix.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid environment assignment '{0}': expected NAME=VALUE")]
    InvalidEnvAssignment(String),

    #[error("invalid expectation override '{0}': expected VARIANT=TEXT")]
    InvalidOverride(String),

    #[error("unknown variant '{0}'")]
    UnknownVariant(String),

    #[error(transparent)]
    Script(#[from] Box<ScriptError>),

    #[error("{} variant(s) did not produce the expected output", .0.len())]
    Mismatches(Vec<MismatchError>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ScriptError> for MatrixError {
    fn from(err: ScriptError) -> Self {
        MatrixError::Script(Box::new(err))
    }
}

/// A variant whose captured output did not contain its effective expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchError {
    /// Variant name (e.g. `dumpSchemas`).
    pub variant: String,
    /// Expected substring.
    pub expected: String,
    /// Full captured output of the run.
    pub actual: String,
}

impl MismatchError {
    pub fn new(variant: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for MismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "variant '{}': output is missing the expected text", self.variant)?;
        writeln!(f, "  expected (substring):")?;
        writeln!(f, "    {}", self.expected)?;
        write!(f, "  actual:")?;
        if self.actual.is_empty() {
            write!(f, "\n    <no output>")?;
        }
        for line in self.actual.lines() {
            write!(f, "\n    {line}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MismatchError {}

pub type MatrixResult<T> = Result<T, MatrixError>;
