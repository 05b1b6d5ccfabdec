//! Process-level configuration: where the policy lives and how `~` expands.

use crate::error::{Error, Result};
use policy::{Environment, Matcher, Policy, discovery};
use std::path::PathBuf;

/// Everything the guard reads from its surroundings, captured once at
/// startup.
#[derive(Debug)]
pub struct Config {
    /// Discovery inputs.
    pub env: Environment,

    /// Policy file given on the command line; skips discovery.
    pub policy_override: Option<PathBuf>,

    /// Matcher bound to the user's home directory.
    pub matcher: Matcher,
}

impl Config {
    /// Capture the current process environment.
    pub fn from_process(policy_override: Option<PathBuf>) -> Result<Self> {
        let exe = std::env::current_exe()?;
        let install_dir = exe
            .parent()
            .map(PathBuf::from)
            .ok_or_else(|| Error::InstallDir { path: exe.clone() })?;

        Ok(Self {
            env: Environment::from_vars(std::env::vars_os(), install_dir),
            policy_override,
            matcher: Matcher::from_env(),
        })
    }

    /// The policy file in effect, whether or not it exists.
    pub fn policy_path(&self) -> PathBuf {
        match &self.policy_override {
            Some(path) => path.clone(),
            None => discovery::resolve_config_path(&self.env),
        }
    }

    /// Load the policy. A missing file is an empty policy.
    pub fn load_policy(&self) -> Result<Policy> {
        let policy = match &self.policy_override {
            Some(path) => Policy::load_or_default(path)?,
            None => discovery::load_policy(&self.env)?,
        };
        Ok(policy)
    }
}
