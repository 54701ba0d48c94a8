#![forbid(unsafe_code)]
//! Scenario matrix runner
//!
//! Runs one logical operation of an external command-line tool through a fixed, ordered set of variants (the
//! dump/load subcommands of an administration shell), captures each run's combined output, and checks it against
//! an expected substring, with optional per-variant overrides.
//!
//! ## Layout
//!
//! - [`catalog`]: builds one [`invocation::Invocation`] per variant from shared arguments and environment.
//! - [`executor`]: the process boundary ([`executor::ProcessExecutor`]), with real and dry-run implementations.
//! - [`runner`]: runs a catalog serially and checks every variant's output.
//! - [`report`]: console and JSON progress reporting.
//! - [`script`]: `//@`-chunked expectation scripts with placeholders and guard conditions.
//! - [`cli`]: the `varmatrix` command line.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod capture;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod invocation;
pub mod report;
pub mod runner;
pub mod script;
pub mod version;

pub use capture::OutputBuffer;
pub use catalog::{Catalog, ToolTarget, Variant, build_catalog, build_catalog_for};
pub use config::{FailurePolicy, MatrixConfig};
pub use error::{MatrixError, MatrixResult, MismatchError};
pub use executor::{DryRunExecutor, ProcessExecutor, RunOutcome, SystemExecutor};
pub use invocation::{Environment, Invocation};
pub use report::{ConsoleReporter, JsonReporter, MatrixReporter, SilentReporter};
pub use runner::{Expectations, MatrixReport, VariantOutcome, VariantReport, run_matrix};
pub use varmatrix_core::{VariantKind, connection_string};
