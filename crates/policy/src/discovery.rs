//! Locating the policy file.
//!
//! Candidates are tried in order and the first file that exists wins:
//!
//! 1. `$CLAUDE_PROJECT_DIR/.claude/hooks/damage-control/patterns.toml`
//! 2. `patterns.toml` next to the installed binary
//! 3. `patterns.toml` two directories above the binary (the skill root)
//!
//! When nothing exists the path next to the binary is returned, which loads
//! as an empty policy.

use crate::{Policy, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the project root.
pub const PROJECT_DIR_VAR: &str = "CLAUDE_PROJECT_DIR";

/// File name of the policy at every candidate location.
pub const CONFIG_FILE_NAME: &str = "patterns.toml";

/// Inputs to discovery, captured once so resolution never reads the
/// process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Project root from `CLAUDE_PROJECT_DIR`, if set and non-empty.
    pub project_dir: Option<PathBuf>,
    /// Directory containing the guard binary.
    pub install_dir: PathBuf,
}

impl Environment {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: None,
            install_dir: install_dir.into(),
        }
    }

    pub fn with_project_dir(mut self, project_dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(project_dir.into());
        self
    }

    /// Build from an explicit variable mapping, e.g. `std::env::vars_os()`.
    pub fn from_vars<I, K, V>(vars: I, install_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: Into<PathBuf>,
    {
        let project_dir = vars
            .into_iter()
            .find(|(key, _)| key.as_ref() == OsStr::new(PROJECT_DIR_VAR))
            .map(|(_, value)| value.into())
            .filter(|dir: &PathBuf| !dir.as_os_str().is_empty());

        Self {
            project_dir,
            install_dir: install_dir.into(),
        }
    }
}

/// A candidate location for the policy file.
pub type Resolver = fn(&Environment) -> Option<PathBuf>;

/// Candidate locations, highest priority first.
pub const RESOLVERS: [Resolver; 3] = [project_override, co_located, skill_root];

/// Per-project override inside the project's `.claude` directory.
pub fn project_override(env: &Environment) -> Option<PathBuf> {
    env.project_dir.as_ref().map(|dir| {
        dir.join(".claude")
            .join("hooks")
            .join("damage-control")
            .join(CONFIG_FILE_NAME)
    })
}

/// Next to the installed binary.
pub fn co_located(env: &Environment) -> Option<PathBuf> {
    Some(env.install_dir.join(CONFIG_FILE_NAME))
}

/// Two levels above the installed binary.
pub fn skill_root(env: &Environment) -> Option<PathBuf> {
    env.install_dir
        .parent()?
        .parent()
        .map(|root| root.join(CONFIG_FILE_NAME))
}

/// Resolve the policy path against the real filesystem.
pub fn resolve_config_path(env: &Environment) -> PathBuf {
    resolve_with(env, Path::is_file)
}

/// Resolve the policy path using `exists` to test candidates.
pub fn resolve_with(env: &Environment, exists: impl Fn(&Path) -> bool) -> PathBuf {
    RESOLVERS
        .iter()
        .filter_map(|resolve| resolve(env))
        .find(|candidate| exists(candidate.as_path()))
        .unwrap_or_else(|| env.install_dir.join(CONFIG_FILE_NAME))
}

/// Find and load the policy. A missing file yields an empty policy.
pub fn load_policy(env: &Environment) -> Result<Policy> {
    let path = resolve_config_path(env);
    debug!(path = %path.display(), "resolved policy path");
    Policy::load_or_default(path)
}
