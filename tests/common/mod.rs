//! Shared test doubles for matrix runner tests.

#![allow(dead_code)]

use std::collections::HashMap;

use varmatrix::runner::MatrixSummary;
use varmatrix::{
    Invocation, MatrixError, MatrixReporter, MatrixResult, OutputBuffer, ProcessExecutor, RunOutcome, Variant,
    VariantReport,
};

/// What the scripted executor observed for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    pub subcommand: String,
    /// Whether the capture buffer was empty when the call started.
    pub buffer_was_clean: bool,
}

/// Executor that answers each variant with canned output, keyed by utility subcommand.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    responses: HashMap<String, String>,
    fallback: String,
    fail_spawn_for: Option<String>,
    pub calls: Vec<Observed>,
}

impl ScriptedExecutor {
    pub fn new(fallback: &str) -> Self {
        Self {
            fallback: fallback.to_string(),
            ..Self::default()
        }
    }

    pub fn respond(mut self, subcommand: &str, output: &str) -> Self {
        self.responses.insert(subcommand.to_string(), output.to_string());
        self
    }

    pub fn fail_spawn(mut self, subcommand: &str) -> Self {
        self.fail_spawn_for = Some(subcommand.to_string());
        self
    }

    pub fn subcommands(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.subcommand.as_str()).collect()
    }
}

impl ProcessExecutor for ScriptedExecutor {
    fn execute(&mut self, invocation: &Invocation, output: &mut OutputBuffer) -> MatrixResult<RunOutcome> {
        // Args are `<uri> -- util <subcommand> ...`
        let subcommand = invocation.args().get(3).cloned().unwrap_or_default();
        self.calls.push(Observed {
            subcommand: subcommand.clone(),
            buffer_was_clean: output.is_empty(),
        });

        if self.fail_spawn_for.as_deref() == Some(subcommand.as_str()) {
            output.push_str("partial output before failure");
            return Err(MatrixError::Spawn {
                program: invocation.program().display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such tool"),
            });
        }

        let text = self.responses.get(&subcommand).unwrap_or(&self.fallback);
        output.push_str(text);
        Ok(RunOutcome::Exited { code: 1 })
    }
}

/// Reporter that records the events it receives.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub started: Vec<String>,
    pub completed: Vec<String>,
    pub summary: Option<MatrixSummary>,
}

impl MatrixReporter for RecordingReporter {
    fn on_variant_start(&mut self, variant: &Variant) {
        self.started.push(variant.name().to_string());
    }

    fn on_variant_complete(&mut self, report: &VariantReport) {
        self.completed.push(report.kind.to_string());
    }

    fn on_matrix_complete(&mut self, summary: &MatrixSummary) {
        self.summary = Some(*summary);
    }
}
