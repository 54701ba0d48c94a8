//! Process execution boundary.
//!
//! The runner never spawns processes itself. It hands each variant's [`Invocation`] to a [`ProcessExecutor`], which
//! blocks until the tool has finished and appends everything it printed to the capture buffer. This keeps the
//! runner testable with scripted executors and allows dry runs.

use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::{debug, warn};

use crate::capture::OutputBuffer;
use crate::error::{MatrixError, MatrixResult};
use crate::invocation::Invocation;

/// How a tool process ended.
///
/// The runner only records this; pass/fail is decided on output text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Normal exit with a status code.
    Exited { code: i32 },
    /// Abnormal termination without a status code (e.g. killed by a signal).
    Terminated,
}

impl RunOutcome {
    pub fn is_clean_exit(self) -> bool {
        matches!(self, RunOutcome::Exited { code: 0 })
    }
}

/// Run one invocation to completion and capture its output.
pub trait ProcessExecutor {
    /// Run `invocation`, blocking until it has terminated, and append its combined output to `output`.
    fn execute(&mut self, invocation: &Invocation, output: &mut OutputBuffer) -> MatrixResult<RunOutcome>;
}

impl<E: ProcessExecutor + ?Sized> ProcessExecutor for &mut E {
    fn execute(&mut self, invocation: &Invocation, output: &mut OutputBuffer) -> MatrixResult<RunOutcome> {
        (**self).execute(invocation, output)
    }
}

/// Spawns the real tool with `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl ProcessExecutor for SystemExecutor {
    fn execute(&mut self, invocation: &Invocation, output: &mut OutputBuffer) -> MatrixResult<RunOutcome> {
        debug!(command = %invocation, "spawning tool");

        let result = Command::new(invocation.program())
            .args(invocation.args())
            .envs(invocation.env())
            .stdin(Stdio::null())
            .output()
            .map_err(|source| MatrixError::Spawn {
                program: invocation.program().display().to_string(),
                source,
            })?;

        output.push_bytes(&result.stdout);
        if !result.stdout.is_empty() && !result.stdout.ends_with(b"\n") && !result.stderr.is_empty() {
            output.push_str("\n");
        }
        output.push_bytes(&result.stderr);

        let outcome = match result.status.code() {
            Some(code) => RunOutcome::Exited { code },
            None => {
                warn!(command = %invocation, "tool terminated without an exit code");
                RunOutcome::Terminated
            }
        };
        debug!(?outcome, bytes = output.as_str().len(), "tool finished");
        Ok(outcome)
    }
}

/// Prints what would run instead of running it.
///
/// The rendered command line becomes the captured output and every run exits cleanly.
#[derive(Debug, Default)]
pub struct DryRunExecutor;

impl ProcessExecutor for DryRunExecutor {
    fn execute(&mut self, invocation: &Invocation, output: &mut OutputBuffer) -> MatrixResult<RunOutcome> {
        output.push_str(&invocation.command_line());
        output.push_str("\n");
        Ok(RunOutcome::Exited { code: 0 })
    }
}
