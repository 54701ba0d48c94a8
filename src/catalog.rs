//! Variant catalog construction.
//!
//! A catalog holds one [`Invocation`] per [`VariantKind`], in registry order. Each invocation is the variant's fixed
//! command template followed by the caller's shared base arguments:
//!
//! ```text
//! <shell> <uri>/<schema> -- util <subcommand> <leading tokens...> <base args...>
//! ```
//!
//! Building is pure: identical inputs give structurally identical catalogs, and the order never depends on the
//! content of the base arguments.

use std::env;
use std::path::PathBuf;

use varmatrix_core::VariantKind;

use crate::invocation::{Environment, Invocation};

/// Environment variable overriding the default tool executable.
pub const SHELL_ENV_VAR: &str = "VARMATRIX_SHELL";
/// Environment variable overriding the default connection URI.
pub const URI_ENV_VAR: &str = "VARMATRIX_URI";

/// Where and how the external tool is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolTarget {
    /// Tool executable.
    pub shell: PathBuf,
    /// Connection URI of the server the tool talks to (without schema).
    pub uri: String,
    /// Default schema appended to the URI.
    pub schema: String,
    /// Environment applied to every variant before caller overrides.
    pub base_env: Environment,
}

impl Default for ToolTarget {
    fn default() -> Self {
        let mut base_env = Environment::new();
        // Plain output keeps substring expectations free of escape sequences.
        base_env.insert("MYSQLSH_TERM_COLOR_MODE".to_string(), "nocolor".to_string());
        Self {
            shell: PathBuf::from("mysqlsh"),
            uri: "root@localhost:3306".to_string(),
            schema: "mysql".to_string(),
            base_env,
        }
    }
}

impl ToolTarget {
    /// Default target with `VARMATRIX_SHELL` / `VARMATRIX_URI` applied when set and non-empty.
    pub fn from_env() -> Self {
        let mut target = Self::default();
        if let Ok(shell) = env::var(SHELL_ENV_VAR) {
            if !shell.is_empty() {
                target.shell = PathBuf::from(shell);
            }
        }
        if let Ok(uri) = env::var(URI_ENV_VAR) {
            if !uri.is_empty() {
                target.uri = uri;
            }
        }
        target
    }

    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// The connection argument passed first to the tool (`<uri>/<schema>`).
    pub fn connection_arg(&self) -> String {
        if self.schema.is_empty() {
            self.uri.clone()
        } else {
            format!("{}/{}", self.uri, self.schema)
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub kind: VariantKind,
    pub invocation: Invocation,
}

impl Variant {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Ordered set of variants to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    variants: Vec<Variant>,
}

impl Catalog {
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn get(&self, kind: VariantKind) -> Option<&Variant> {
        self.variants.iter().find(|v| v.kind == kind)
    }

    pub fn kinds(&self) -> Vec<VariantKind> {
        self.variants.iter().map(|v| v.kind).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.variants.iter().map(Variant::name).collect()
    }

    /// Keep only the given kinds. Catalog order is preserved regardless of the order of `kinds`; an empty slice
    /// keeps everything.
    pub fn retain_only(&mut self, kinds: &[VariantKind]) {
        if kinds.is_empty() {
            return;
        }
        self.variants.retain(|v| kinds.contains(&v.kind));
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Variant;
    type IntoIter = std::slice::Iter<'a, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.iter()
    }
}

/// Build the catalog for the default [`ToolTarget`].
pub fn build_catalog(base_args: &[String], env: &Environment) -> Catalog {
    build_catalog_for(&ToolTarget::default(), base_args, env)
}

/// Build one invocation per registered variant.
///
/// ## Parameters
/// - `target`: tool executable, connection and base environment.
/// - `base_args`: arguments appended to every variant's fixed template.
/// - `env`: caller environment; wins over `target.base_env` on name clashes.
pub fn build_catalog_for(target: &ToolTarget, base_args: &[String], env: &Environment) -> Catalog {
    let mut merged_env = target.base_env.clone();
    merged_env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));

    let variants = VariantKind::ALL
        .iter()
        .map(|&kind| Variant {
            kind,
            invocation: Invocation::new(target.shell.clone(), variant_args(target, kind, base_args), merged_env.clone()),
        })
        .collect();

    Catalog { variants }
}

fn variant_args(target: &ToolTarget, kind: VariantKind, base_args: &[String]) -> Vec<String> {
    let mut args = vec![
        target.connection_arg(),
        "--".to_string(),
        "util".to_string(),
        kind.subcommand().to_string(),
    ];
    args.extend(kind.leading_args().iter().map(|a| a.to_string()));
    args.extend(base_args.iter().cloned());
    args
}
