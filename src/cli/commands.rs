//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io::{self, Write};
use std::path::PathBuf;

use tracing::info;
use varmatrix_core::{VariantKind, connection_string};

use crate::catalog::{Catalog, ToolTarget, build_catalog_for};
use crate::config::{FailurePolicy, MatrixConfig};
use crate::error::MatrixError;
use crate::executor::{DryRunExecutor, ProcessExecutor, SystemExecutor};
use crate::invocation::parse_environment;
use crate::report::{ConsoleReporter, JsonReporter, MatrixReporter};
use crate::runner::{Expectations, MatrixReport, parse_override, run_matrix};
use crate::script::{ExpectationScript, Flags, Variables};

use super::{CliError, CliResult, ExitCode};

/// Everything `varmatrix run` needs, after argument parsing.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub target: ToolTarget,
    pub env: Vec<String>,
    pub expect: Option<String>,
    pub overrides: Vec<String>,
    pub script: Option<PathBuf>,
    pub vars: Vec<String>,
    pub flags: Vec<String>,
    pub only: Vec<String>,
    pub exit_first: bool,
    pub collect_all: bool,
    pub json: bool,
    pub dry_run: bool,
    pub verbose: bool,
    pub color: bool,
    pub base_args: Vec<String>,
}

impl RunRequest {
    fn config(&self) -> MatrixConfig {
        let policy = if self.exit_first {
            FailurePolicy::FailFast
        } else if self.collect_all {
            FailurePolicy::CollectAll
        } else {
            FailurePolicy::default()
        };
        MatrixConfig::new()
            .with_policy(policy)
            .with_verbose(self.verbose)
            .with_color(self.color)
            .with_dry_run(self.dry_run)
            .with_json(self.json)
    }
}

// ============================================================================
// run
// ============================================================================

/// Run every selected variant and check its output.
pub fn run_variants(request: RunRequest) -> CliResult<ExitCode> {
    let config = request.config();
    let catalog = prepare_catalog(&request.target, &request.env, &request.base_args, &request.only)?;
    let expectations = resolve_expectations(&request)?;

    info!(
        variants = catalog.len(),
        dry_run = config.dry_run,
        "running {}",
        request.target.shell.display()
    );

    let report = if config.dry_run {
        run_with(&catalog, &expectations, DryRunExecutor, &config)?
    } else {
        run_with(&catalog, &expectations, SystemExecutor, &config)?
    };

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Reporter already printed the failures
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

fn run_with<E: ProcessExecutor>(
    catalog: &Catalog,
    expectations: &Expectations,
    executor: E,
    config: &MatrixConfig,
) -> CliResult<MatrixReport> {
    let mut reporter: Box<dyn MatrixReporter> = if config.json {
        Box::new(JsonReporter::new())
    } else {
        Box::new(ConsoleReporter::new(config.verbose, config.color))
    };
    run_matrix(catalog, expectations, executor, reporter.as_mut(), config.policy).map_err(matrix_error)
}

fn prepare_catalog(target: &ToolTarget, env: &[String], base_args: &[String], only: &[String]) -> CliResult<Catalog> {
    let env = parse_environment(env.iter().map(String::as_str)).map_err(matrix_error)?;
    let mut catalog = build_catalog_for(target, base_args, &env);

    let selected = only
        .iter()
        .map(|name| VariantKind::from_name(name).ok_or_else(|| matrix_error(MatrixError::UnknownVariant(name.clone()))))
        .collect::<CliResult<Vec<_>>>()?;
    catalog.retain_only(&selected);

    Ok(catalog)
}

fn resolve_expectations(request: &RunRequest) -> CliResult<Expectations> {
    let mut expectations = match (&request.script, &request.expect) {
        (Some(path), expect) => {
            let vars: Variables = parse_environment(request.vars.iter().map(String::as_str))
                .map_err(matrix_error)?
                .into_iter()
                .collect();
            let flags: Flags = request.flags.iter().cloned().collect();
            let script = ExpectationScript::load(path, &vars).map_err(matrix_error)?;
            script
                .to_expectations(expect.as_deref().unwrap_or(""), &flags)
                .map_err(|e| matrix_error(e.into()))?
        }
        (None, Some(expect)) => Expectations::new(expect.clone()),
        (None, None) => {
            return Err(CliError::failure("Error: run requires --expect TEXT or --script FILE"));
        }
    };

    for text in &request.overrides {
        let (kind, expected) = parse_override(text).map_err(matrix_error)?;
        expectations.set_override(kind, expected);
    }

    Ok(expectations)
}

fn matrix_error(err: MatrixError) -> CliError {
    match err {
        MatrixError::Script(script_err) => CliError::failure(format!("{:?}", miette::Report::new(*script_err))),
        other => CliError::failure(format!("Error: {other}")),
    }
}

// ============================================================================
// list
// ============================================================================

/// Print the catalog in execution order.
pub fn list_variants(target: &ToolTarget, env: &[String], base_args: &[String]) -> CliResult<ExitCode> {
    let catalog = prepare_catalog(target, env, base_args, &[])?;
    let mut out = io::stdout().lock();
    write_catalog(&mut out, &catalog).map_err(|e| CliError::failure(format!("Error writing catalog: {e}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Render one line per variant: position, name, and command line.
pub fn write_catalog(out: &mut impl Write, catalog: &Catalog) -> io::Result<()> {
    for (index, variant) in catalog.iter().enumerate() {
        writeln!(out, "{}. {:<13} {}", index + 1, variant.name(), variant.invocation)?;
    }
    Ok(())
}

// ============================================================================
// connection-string
// ============================================================================

pub fn print_connection_string(endpoint: &str, full: bool, account: &str, key: &str) -> CliResult<ExitCode> {
    println!("{}", connection_string(endpoint, full, account, key));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    fn request() -> RunRequest {
        RunRequest {
            target: ToolTarget::default(),
            color: false,
            ..RunRequest::default()
        }
    }

    #[test]
    fn test_config_from_request() {
        let mut req = request();
        req.collect_all = true;
        req.verbose = true;
        assert_eq!(req.config().policy, FailurePolicy::CollectAll);
        assert!(req.config().verbose);
        assert_eq!(request().config().policy, FailurePolicy::FailFast);
    }

    #[test]
    fn test_exit_first_selects_fail_fast() {
        let mut req = request();
        req.exit_first = true;
        assert_eq!(req.config().policy, FailurePolicy::FailFast);
    }

    #[test]
    fn test_resolve_expectations_requires_source() {
        let err = resolve_expectations(&request()).unwrap_err();
        assert!(err.message.contains("--expect"));
    }

    #[test]
    fn test_resolve_expectations_overrides() {
        let mut req = request();
        req.expect = Some("x".to_string());
        req.overrides = vec!["dumpTables=y".to_string()];
        let expectations = resolve_expectations(&req).unwrap();
        assert_eq!(expectations.effective(VariantKind::DumpTables), "y");
        assert_eq!(expectations.effective(VariantKind::LoadDump), "x");
    }

    #[test]
    fn test_resolve_expectations_unknown_override() {
        let mut req = request();
        req.expect = Some("x".to_string());
        req.overrides = vec!["dumpAll=y".to_string()];
        let err = resolve_expectations(&req).unwrap_err();
        assert_eq!(err.message, "Error: unknown variant 'dumpAll'");
    }

    #[test]
    fn test_resolve_expectations_from_script() {
        let dir = std::env::temp_dir().join(format!("varmatrix_cmd_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("expect.js");
        fs::write(&path, "//@ default\n||Invalid options\n//@ loadDump\n||port <<<p>>>\n").unwrap();

        let mut req = request();
        req.script = Some(path.clone());
        req.vars = vec!["p=3307".to_string()];
        req.overrides = vec!["importTable=z".to_string()];
        let expectations = resolve_expectations(&req).unwrap();
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(expectations.default_expectation(), "Invalid options");
        assert_eq!(expectations.effective(VariantKind::LoadDump), "port 3307");
        assert_eq!(expectations.effective(VariantKind::ImportTable), "z");
    }

    #[test]
    fn test_prepare_catalog_only() {
        let catalog = prepare_catalog(
            &ToolTarget::default(),
            &[],
            &[],
            &["loadDump".to_string(), "dumpSchemas".to_string()],
        )
        .unwrap();
        assert_eq!(catalog.names(), vec!["dumpSchemas", "loadDump"]);

        let err = prepare_catalog(&ToolTarget::default(), &[], &[], &["nope".to_string()]).unwrap_err();
        assert_eq!(err.message, "Error: unknown variant 'nope'");
    }

    #[test]
    fn test_prepare_catalog_bad_env() {
        let err = prepare_catalog(&ToolTarget::default(), &["NOEQUALS".to_string()], &[], &[]).unwrap_err();
        assert!(err.message.contains("NOEQUALS"));
    }

    #[test]
    fn test_dry_run_succeeds_when_expectation_is_in_command_line() {
        let mut req = request();
        req.dry_run = true;
        req.json = true;
        req.expect = Some("-- util".to_string());
        assert_eq!(run_variants(req).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_dry_run_fails_on_mismatch() {
        let mut req = request();
        req.dry_run = true;
        req.json = true;
        req.expect = Some("never printed".to_string());
        let err = run_variants(req).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.is_empty());
    }

    #[test]
    fn test_write_catalog() {
        let catalog = prepare_catalog(&ToolTarget::default(), &[], &[], &["dumpInstance".to_string()]).unwrap();
        let mut out = Vec::new();
        write_catalog(&mut out, &catalog).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1. dumpInstance  MYSQLSH_TERM_COLOR_MODE=nocolor mysqlsh root@localhost:3306/mysql -- util dump-instance folder\n"
        );
    }
}
