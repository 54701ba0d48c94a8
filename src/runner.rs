//! Scenario matrix runner.
//!
//! Runs every variant of a [`Catalog`] through a [`ProcessExecutor`], strictly one after another, and checks that
//! each run's captured output contains the variant's *effective expectation*: its override if one exists, the
//! shared default otherwise.
//!
//! ## Buffer discipline
//!
//! The runner owns the [`OutputBuffer`]. It is clean when a variant starts, written by the executor, read by the
//! check and cleared again before the next variant, including after a mismatch or an executor error.
//!
//! ## Reporting
//!
//! Progress goes through the [`MatrixReporter`] trait; the returned [`MatrixReport`] holds the same information
//! for callers that want to inspect it programmatically.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use varmatrix_core::VariantKind;

use crate::capture::OutputBuffer;
use crate::catalog::{Catalog, Variant};
use crate::config::FailurePolicy;
use crate::error::{MatrixError, MatrixResult, MismatchError};
use crate::executor::{ProcessExecutor, RunOutcome};
use crate::report::MatrixReporter;

// ============================================================================
// Expectations
// ============================================================================

/// Default expected text plus sparse per-variant overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectations {
    default: String,
    overrides: BTreeMap<VariantKind, String>,
}

impl Expectations {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, kind: VariantKind, expected: impl Into<String>) -> Self {
        self.set_override(kind, expected);
        self
    }

    pub fn set_override(&mut self, kind: VariantKind, expected: impl Into<String>) {
        self.overrides.insert(kind, expected.into());
    }

    /// Add an override keyed by variant name.
    ///
    /// ## Errors
    /// - [`MatrixError::UnknownVariant`] if `name` is not a registered variant.
    pub fn set_override_by_name(&mut self, name: &str, expected: impl Into<String>) -> MatrixResult<()> {
        let kind = VariantKind::from_name(name).ok_or_else(|| MatrixError::UnknownVariant(name.to_string()))?;
        self.set_override(kind, expected);
        Ok(())
    }

    pub fn set_default(&mut self, default: impl Into<String>) {
        self.default = default.into();
    }

    pub fn default_expectation(&self) -> &str {
        &self.default
    }

    pub fn override_for(&self, kind: VariantKind) -> Option<&str> {
        self.overrides.get(&kind).map(String::as_str)
    }

    /// The text `kind`'s output must contain.
    pub fn effective(&self, kind: VariantKind) -> &str {
        self.override_for(kind).unwrap_or(&self.default)
    }
}

/// Parse a `VARIANT=TEXT` override as given on the command line.
pub fn parse_override(text: &str) -> MatrixResult<(VariantKind, String)> {
    let (name, expected) = text
        .split_once('=')
        .ok_or_else(|| MatrixError::InvalidOverride(text.to_string()))?;
    let kind = VariantKind::from_name(name).ok_or_else(|| MatrixError::UnknownVariant(name.to_string()))?;
    Ok((kind, expected.to_string()))
}

// ============================================================================
// Reports
// ============================================================================

/// Check result of one variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantOutcome {
    Passed,
    Mismatch(MismatchError),
}

/// Everything recorded about one executed variant.
#[derive(Debug, Clone)]
pub struct VariantReport {
    pub kind: VariantKind,
    pub expected: String,
    pub outcome: VariantOutcome,
    pub run: RunOutcome,
    pub duration: Duration,
}

impl VariantReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, VariantOutcome::Passed)
    }
}

/// Summary counts of a matrix run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub not_run: usize,
    pub duration: Duration,
}

/// Result of a whole matrix run.
#[derive(Debug, Clone, Default)]
pub struct MatrixReport {
    /// Executed variants, in catalog order.
    pub variants: Vec<VariantReport>,
    /// Variants skipped after a fail-fast stop or an executor error, in catalog order.
    pub not_run: Vec<VariantKind>,
    pub duration: Duration,
}

impl MatrixReport {
    pub fn is_success(&self) -> bool {
        self.variants.iter().all(VariantReport::passed)
    }

    pub fn failures(&self) -> Vec<&MismatchError> {
        self.variants
            .iter()
            .filter_map(|v| match &v.outcome {
                VariantOutcome::Mismatch(err) => Some(err),
                VariantOutcome::Passed => None,
            })
            .collect()
    }

    pub fn summary(&self) -> MatrixSummary {
        let passed = self.variants.iter().filter(|v| v.passed()).count();
        MatrixSummary {
            total: self.variants.len() + self.not_run.len(),
            passed,
            failed: self.variants.len() - passed,
            not_run: self.not_run.len(),
            duration: self.duration,
        }
    }

    /// Turn the report into a plain result: `Err(Mismatches)` if any variant failed.
    pub fn into_result(self) -> MatrixResult<()> {
        let failures: Vec<MismatchError> = self
            .variants
            .into_iter()
            .filter_map(|v| match v.outcome {
                VariantOutcome::Mismatch(err) => Some(err),
                VariantOutcome::Passed => None,
            })
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(MatrixError::Mismatches(failures))
        }
    }
}

// ============================================================================
// Runner
// ============================================================================

/// Run every variant of `catalog` in order and check its output.
///
/// ## Parameters
/// - `catalog`: variants to run, in execution order.
/// - `expectations`: default expected text and per-variant overrides.
/// - `executor`: runs one invocation at a time, blocking until it finishes.
/// - `reporter`: receives progress events.
/// - `policy`: whether a mismatch stops the matrix.
///
/// ## Returns
/// - `Ok(MatrixReport)` once the matrix has finished or stopped on a mismatch. Mismatches are recorded in the
///   report, not returned as errors.
///
/// ## Errors
/// - Any executor error (e.g. the tool cannot be started). The capture buffer is cleared first.
pub fn run_matrix<E, R>(
    catalog: &Catalog,
    expectations: &Expectations,
    mut executor: E,
    reporter: &mut R,
    policy: FailurePolicy,
) -> MatrixResult<MatrixReport>
where
    E: ProcessExecutor,
    R: MatrixReporter + ?Sized,
{
    let start = Instant::now();
    let mut output = OutputBuffer::new();
    let mut report = MatrixReport::default();

    info!(variants = catalog.len(), ?policy, "starting matrix");
    reporter.on_matrix_start(catalog.len());

    let mut variants = catalog.iter();
    while let Some(variant) = variants.next() {
        let expected = expectations.effective(variant.kind);
        reporter.on_variant_start(variant);

        let result = run_variant(variant, expected, &mut executor, &mut output);
        output.clear();
        let variant_report = match result {
            Ok(variant_report) => variant_report,
            Err(err) => {
                // The session still ends for the reporter; this variant and the rest count as not run.
                report.not_run = std::iter::once(variant.kind).chain(variants.by_ref().map(|v| v.kind)).collect();
                report.duration = start.elapsed();
                warn!(variant = variant.name(), error = %err, "aborting matrix");
                reporter.on_matrix_complete(&report.summary());
                return Err(err);
            }
        };

        reporter.on_variant_complete(&variant_report);
        let stop = policy == FailurePolicy::FailFast && !variant_report.passed();
        report.variants.push(variant_report);

        if stop {
            debug!(variant = variant.name(), "stopping matrix on first mismatch");
            break;
        }
    }
    report.not_run = variants.map(|v| v.kind).collect();
    report.duration = start.elapsed();

    let summary = report.summary();
    info!(
        passed = summary.passed,
        failed = summary.failed,
        not_run = summary.not_run,
        "matrix finished"
    );
    reporter.on_matrix_complete(&summary);

    Ok(report)
}

fn run_variant<E: ProcessExecutor>(
    variant: &Variant,
    expected: &str,
    executor: &mut E,
    output: &mut OutputBuffer,
) -> MatrixResult<VariantReport> {
    debug_assert!(output.is_empty(), "output buffer leaked into {}", variant.name());
    let start = Instant::now();

    let run = executor.execute(&variant.invocation, output)?;

    let outcome = if output.contains(expected) {
        debug!(variant = variant.name(), "expectation met");
        VariantOutcome::Passed
    } else {
        debug!(variant = variant.name(), expected, "expectation not met");
        VariantOutcome::Mismatch(MismatchError::new(variant.name(), expected, output.as_str()))
    };

    Ok(VariantReport {
        kind: variant.kind,
        expected: expected.to_string(),
        outcome,
        run,
        duration: start.elapsed(),
    })
}
