//! CLI module for varmatrix
//!
//! This module provides the command-line interface for the matrix runner.
//!
//! ## Commands
//!
//! - `run [-- ARGS]` - Run every variant and check its output
//! - `list [-- ARGS]` - Print the catalog in execution order
//! - `connection-string` - Format a storage connection string
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::catalog::ToolTarget;
use crate::version::VARMATRIX_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Scenario matrix runner for the dump/load utility
#[derive(Parser, Debug)]
#[command(name = "varmatrix")]
#[command(version = VARMATRIX_VERSION)]
#[command(about = "Run one operation through every dump/load variant and check the output", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the tool lives and which server it talks to.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Tool executable (default: $VARMATRIX_SHELL or mysqlsh)
    #[arg(long, value_name = "PATH")]
    pub shell: Option<PathBuf>,
    /// Connection URI without schema (default: $VARMATRIX_URI or root@localhost:3306)
    #[arg(long, value_name = "URI")]
    pub uri: Option<String>,
    /// Schema appended to the connection URI
    #[arg(long, value_name = "SCHEMA")]
    pub schema: Option<String>,
}

impl TargetArgs {
    /// Resolve against the environment-derived default target.
    pub fn resolve(&self) -> ToolTarget {
        let mut target = ToolTarget::from_env();
        if let Some(shell) = &self.shell {
            target = target.with_shell(shell.clone());
        }
        if let Some(uri) = &self.uri {
            target = target.with_uri(uri.clone());
        }
        if let Some(schema) = &self.schema {
            target = target.with_schema(schema.clone());
        }
        target
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every variant and check its output
    Run {
        #[command(flatten)]
        target: TargetArgs,
        /// Extra environment for the tool
        #[arg(long = "env", value_name = "NAME=VALUE")]
        env: Vec<String>,
        /// Text every variant's output must contain
        #[arg(long = "expect", value_name = "TEXT")]
        expect: Option<String>,
        /// Variant-specific expected text
        #[arg(long = "override", value_name = "VARIANT=TEXT")]
        overrides: Vec<String>,
        /// Expectation script (`//@` chunks)
        #[arg(long, value_name = "FILE")]
        script: Option<PathBuf>,
        /// Placeholder value for the expectation script
        #[arg(long = "var", value_name = "NAME=VALUE", requires = "script")]
        vars: Vec<String>,
        /// Flag used to evaluate chunk conditions
        #[arg(long = "flag", value_name = "FLAG", requires = "script")]
        flags: Vec<String>,
        /// Run only these variants (catalog order is kept)
        #[arg(long = "only", value_name = "VARIANT")]
        only: Vec<String>,
        /// Stop on first mismatch (default)
        #[arg(short = 'x', long = "exitfirst", conflicts_with = "collect_all")]
        exit_first: bool,
        /// Run every variant and report all mismatches
        #[arg(long = "collect-all")]
        collect_all: bool,
        /// Emit JSON lines instead of console output
        #[arg(long)]
        json: bool,
        /// Print command lines instead of running the tool
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Disable ANSI colors
        #[arg(long = "no-color")]
        no_color: bool,
        /// Arguments appended to every variant
        #[arg(last = true, value_name = "ARGS")]
        base_args: Vec<String>,
    },

    /// Print the catalog in execution order
    List {
        #[command(flatten)]
        target: TargetArgs,
        /// Extra environment for the tool
        #[arg(long = "env", value_name = "NAME=VALUE")]
        env: Vec<String>,
        /// Arguments appended to every variant
        #[arg(last = true, value_name = "ARGS")]
        base_args: Vec<String>,
    },

    /// Format a storage connection string
    ConnectionString {
        /// Blob endpoint URL
        #[arg(long, value_name = "URL")]
        endpoint: String,
        /// Include account name and key
        #[arg(long)]
        full: bool,
        /// Storage account name
        #[arg(long, value_name = "NAME", default_value = "")]
        account: String,
        /// Storage account key
        #[arg(long, value_name = "KEY", default_value = "")]
        key: String,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Run {
            target,
            env,
            expect,
            overrides,
            script,
            vars,
            flags,
            only,
            exit_first,
            collect_all,
            json,
            dry_run,
            verbose,
            no_color,
            base_args,
        } => commands::run_variants(commands::RunRequest {
            target: target.resolve(),
            env,
            expect,
            overrides,
            script,
            vars,
            flags,
            only,
            exit_first,
            collect_all,
            json,
            dry_run,
            verbose,
            color: !no_color,
            base_args,
        }),
        Command::List { target, env, base_args } => commands::list_variants(&target.resolve(), &env, &base_args),
        Command::ConnectionString {
            endpoint,
            full,
            account,
            key,
        } => commands::print_connection_string(&endpoint, full, &account, &key),
    }
}

// ============================================================================
// Tests
// ============================================================================
