//! Expectation scripts.
//!
//! A plain-text format for expected tool output, chunked by `//@` headers:
//!
//! ```text
//! //@ default
//! ||Invalid options: osBucketName (ArgumentError)
//!
//! //@ loadDump {!__replaying}
//! ||The port '<<<__busy_port>>>' is already in use. (RuntimeError)
//! Loading dump...
//! ```
//!
//! - A header line starts a chunk; an optional trailing `{...}` guard makes it conditional on run flags.
//! - `||` lines are expected error text; an empty `||` means "no error expected".
//! - Any other non-blank line inside a chunk is expected output, kept verbatim.
//! - `<<<name>>>` placeholders in chunk bodies are replaced with variables supplied at parse time.
//!
//! For a matrix run, the active chunk titled `default` provides the default expectation and active chunks titled
//! with a variant name provide its override (see [`ExpectationScript::to_expectations`]). Such chunks hold at most
//! one non-empty line, since a variant is checked against a single substring. Several chunks may share a title
//! under different guards, as long as at most one of them is active.

mod condition;
mod parser;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use tracing::debug;
use varmatrix_core::VariantKind;

use crate::error::MatrixResult;
use crate::runner::Expectations;

pub use condition::{Condition, Term, parse_condition};

/// Title of the chunk holding the default expectation.
pub const DEFAULT_CHUNK: &str = "default";

/// Placeholder values, by name.
pub type Variables = BTreeMap<String, String>;
/// Names of flags that are set for this run.
pub type Flags = BTreeSet<String>;

/// What went wrong while parsing a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptErrorKind {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("placeholder is missing its closing '>>>'")]
    UnterminatedPlaceholder,

    #[error("condition is missing its closing '}}'")]
    UnterminatedCondition,

    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    #[error("chunk header has no title")]
    MissingTitle,

    #[error("expected text appears before the first chunk header")]
    ExpectationOutsideChunk,

    #[error("duplicate chunk title '{0}'")]
    DuplicateTitle(String),

    #[error("chunk '{0}' already has an expected line; a variant is checked against one substring")]
    ExtraExpectation(String),

    #[error("more than one active chunk titled '{0}'")]
    AmbiguousChunk(String),
}

/// Parse error with the script source attached for rendering.
#[derive(Debug, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic(code(varmatrix::script))]
pub struct ScriptError {
    kind: ScriptErrorKind,
    line: usize,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
}

impl ScriptError {
    fn new(kind: ScriptErrorKind, name: &str, source: &str, line: usize, offset: usize, len: usize) -> Self {
        let offset = offset.min(source.len());
        let len = len.min(source.len() - offset);
        Self {
            kind,
            line,
            src: NamedSource::new(name, source.to_string()),
            span: (offset, len).into(),
        }
    }

    pub fn kind(&self) -> &ScriptErrorKind {
        &self.kind
    }

    /// 1-based line of the offending text.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn span(&self) -> SourceSpan {
        self.span
    }
}

/// One `//@` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub title: String,
    pub condition: Option<Condition>,
    /// Expected error lines (`||`), placeholders resolved.
    pub errors: Vec<String>,
    /// Expected output lines, placeholders resolved.
    pub output: Vec<String>,
    /// 1-based line of the header.
    pub line: usize,
    pub title_span: SourceSpan,
}

impl Chunk {
    pub fn is_active(&self, flags: &Flags) -> bool {
        self.condition.as_ref().is_none_or(|c| c.evaluate(flags))
    }

    /// The text a run checked against this chunk must contain: the first non-empty error line, else the first
    /// non-empty output line, else nothing. An empty `||` only says that no error is expected.
    pub fn expected(&self) -> &str {
        self.errors
            .iter()
            .chain(&self.output)
            .map(String::as_str)
            .find(|line| !line.is_empty())
            .unwrap_or("")
    }
}

/// A parsed expectation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectationScript {
    name: String,
    source: String,
    chunks: Vec<Chunk>,
}

impl ExpectationScript {
    /// Parse `source`, resolving placeholders from `vars`.
    ///
    /// ## Errors
    /// - [`ScriptError`] pointing at the first malformed header, condition or placeholder.
    pub fn parse(name: &str, source: &str, vars: &Variables) -> Result<Self, ScriptError> {
        let chunks = parser::parse_chunks(name, source, vars)?;
        Ok(Self {
            name: name.to_string(),
            source: source.to_string(),
            chunks,
        })
    }

    /// Read and parse a script file.
    pub fn load(path: &Path, vars: &Variables) -> MatrixResult<Self> {
        let source = fs::read_to_string(path)?;
        Ok(Self::parse(&path.display().to_string(), &source, vars)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, title: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.title == title)
    }

    pub fn active_chunks<'a>(&'a self, flags: &'a Flags) -> impl Iterator<Item = &'a Chunk> + 'a {
        self.chunks.iter().filter(move |c| c.is_active(flags))
    }

    /// Build matrix expectations from the active chunks.
    ///
    /// `fallback_default` is used when no active `default` chunk exists. Chunks whose title is neither `default`
    /// nor a variant name are ignored.
    ///
    /// ## Errors
    /// - [`ScriptErrorKind::AmbiguousChunk`] when two chunks with the same expectation title are active for `flags`.
    pub fn to_expectations(&self, fallback_default: &str, flags: &Flags) -> Result<Expectations, ScriptError> {
        let mut expectations = Expectations::new(fallback_default);
        let mut used: BTreeSet<&str> = BTreeSet::new();

        for chunk in self.active_chunks(flags) {
            if !is_expectation_title(&chunk.title) {
                debug!(title = %chunk.title, "ignoring chunk that names no variant");
                continue;
            }
            if !used.insert(chunk.title.as_str()) {
                return Err(ScriptError::new(
                    ScriptErrorKind::AmbiguousChunk(chunk.title.clone()),
                    &self.name,
                    &self.source,
                    chunk.line,
                    chunk.title_span.offset(),
                    chunk.title_span.len(),
                ));
            }

            match VariantKind::from_name(&chunk.title) {
                Some(kind) => expectations.set_override(kind, chunk.expected()),
                None => expectations.set_default(chunk.expected()),
            }
        }

        Ok(expectations)
    }
}

/// Whether chunks with this title feed a matrix expectation.
pub fn is_expectation_title(title: &str) -> bool {
    title == DEFAULT_CHUNK || VariantKind::from_name(title).is_some()
}
