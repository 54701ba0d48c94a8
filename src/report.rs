//! Matrix progress reporting.
//!
//! ## MatrixReporter Trait
//!
//! The runner uses a `MatrixReporter` trait to separate reporting from
//! execution. Two implementations ship with the crate: a pytest-style console
//! reporter and a JSON-lines reporter for CI tooling.

use std::io::{self, Write};

use serde::Serialize;

use crate::catalog::Variant;
use crate::executor::RunOutcome;
use crate::runner::{MatrixSummary, VariantOutcome, VariantReport};

// ============================================================================
// Reporter Trait
// ============================================================================

/// Trait for reporting matrix progress.
pub trait MatrixReporter {
    /// Called once before the first variant runs
    fn on_matrix_start(&mut self, _variant_count: usize) {}

    /// Called before a variant's process is started
    fn on_variant_start(&mut self, _variant: &Variant) {}

    /// Called after a variant's output has been checked
    fn on_variant_complete(&mut self, report: &VariantReport);

    /// Called when the matrix has finished or stopped
    fn on_matrix_complete(&mut self, summary: &MatrixSummary);
}

/// Reporter that discards every event.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl MatrixReporter for SilentReporter {
    fn on_variant_complete(&mut self, _report: &VariantReport) {}

    fn on_matrix_complete(&mut self, _summary: &MatrixSummary) {}
}

// ============================================================================
// Console Reporter
// ============================================================================

/// Default console reporter (pytest-style)
pub struct ConsoleReporter<W: Write = io::Stderr> {
    out: W,
    verbose: bool,
    color: bool,
}

impl ConsoleReporter<io::Stderr> {
    pub fn new(verbose: bool, color: bool) -> Self {
        Self::with_writer(io::stderr(), verbose, color)
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn with_writer(out: W, verbose: bool, color: bool) -> Self {
        Self { out, verbose, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl<W: Write> MatrixReporter for ConsoleReporter<W> {
    fn on_matrix_start(&mut self, variant_count: usize) {
        let header = self.paint("1", "=================== matrix session starts ===================");
        let _ = writeln!(self.out, "{header}");
        let _ = writeln!(self.out, "collected {variant_count} variant(s)");
        let _ = writeln!(self.out);
    }

    fn on_variant_start(&mut self, variant: &Variant) {
        if self.verbose {
            let _ = writeln!(self.out, "$ {}", variant.invocation);
        }
    }

    fn on_variant_complete(&mut self, report: &VariantReport) {
        let status = match &report.outcome {
            VariantOutcome::Passed => self.paint("32", "PASSED"),
            VariantOutcome::Mismatch(_) => self.paint("31", "FAILED"),
        };
        let exit = match report.run {
            RunOutcome::Exited { code } => format!("exit {code}"),
            RunOutcome::Terminated => "terminated".to_string(),
        };
        if self.verbose {
            let _ = writeln!(
                self.out,
                "{} {} ({}, {}ms)",
                report.kind,
                status,
                exit,
                report.duration.as_millis()
            );
        } else {
            let _ = writeln!(self.out, "{} {}", report.kind, status);
        }

        // Print failure details
        if let VariantOutcome::Mismatch(err) = &report.outcome {
            let title = self.paint("1;31", &format!("___________ {} ___________", report.kind));
            let _ = writeln!(self.out);
            let _ = writeln!(self.out, "{title}");
            let _ = writeln!(self.out, "{err}");
            let _ = writeln!(self.out);
        }
    }

    fn on_matrix_complete(&mut self, summary: &MatrixSummary) {
        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("{} passed", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("{} failed", summary.failed));
        }
        if summary.not_run > 0 {
            parts.push(format!("{} not run", summary.not_run));
        }
        if parts.is_empty() {
            parts.push("no variants".to_string());
        }

        let line = format!(
            "=================== {} in {:.2}s ===================",
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
        let code = if summary.failed > 0 { "1;31" } else { "1;32" };
        let line = self.paint(code, &line);
        let _ = writeln!(self.out);
        let _ = writeln!(self.out, "{line}");
    }
}

// ============================================================================
// JSON Reporter
// ============================================================================

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent<'a> {
    MatrixStart {
        variants: usize,
    },
    VariantComplete {
        variant: &'static str,
        passed: bool,
        expected: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        actual: Option<&'a str>,
        run: RunOutcome,
        duration_ms: u128,
    },
    MatrixComplete {
        total: usize,
        passed: usize,
        failed: usize,
        not_run: usize,
        duration_ms: u128,
    },
}

/// Emits one JSON object per line for each event.
pub struct JsonReporter<W: Write = io::Stdout> {
    out: W,
}

impl JsonReporter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for JsonReporter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &JsonEvent<'_>) {
        match serde_json::to_string(event) {
            Ok(line) => {
                let _ = writeln!(self.out, "{line}");
            }
            Err(e) => tracing::warn!("failed to serialize report event: {e}"),
        }
    }
}

impl<W: Write> MatrixReporter for JsonReporter<W> {
    fn on_matrix_start(&mut self, variant_count: usize) {
        self.emit(&JsonEvent::MatrixStart {
            variants: variant_count,
        });
    }

    fn on_variant_complete(&mut self, report: &VariantReport) {
        let actual = match &report.outcome {
            VariantOutcome::Mismatch(err) => Some(err.actual.as_str()),
            VariantOutcome::Passed => None,
        };
        self.emit(&JsonEvent::VariantComplete {
            variant: report.kind.name(),
            passed: report.passed(),
            expected: &report.expected,
            actual,
            run: report.run,
            duration_ms: report.duration.as_millis(),
        });
    }

    fn on_matrix_complete(&mut self, summary: &MatrixSummary) {
        self.emit(&JsonEvent::MatrixComplete {
            total: summary.total,
            passed: summary.passed,
            failed: summary.failed,
            not_run: summary.not_run,
            duration_ms: summary.duration.as_millis(),
        });
    }
}
