//! Matrix run configuration.

use serde::Serialize;

/// What the runner does after a variant's output misses its expectation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first mismatch; the remaining variants are not run.
    #[default]
    FailFast,
    /// Run every variant and report all mismatches together.
    CollectAll,
}

/// Matrix run configuration
#[derive(Debug, Clone)]
pub struct MatrixConfig {
    /// Mismatch handling
    pub policy: FailurePolicy,
    /// Print every variant's command line and timing
    pub verbose: bool,
    /// Use ANSI colors in console output
    pub color: bool,
    /// Print command lines instead of running the tool
    pub dry_run: bool,
    /// Emit JSON event lines instead of console output
    pub json: bool,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            policy: FailurePolicy::FailFast,
            verbose: false,
            color: true,
            dry_run: false,
            json: false,
        }
    }
}

impl MatrixConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the failure policy
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}
