//! Path protection policy for file edits.
//!
//! Core principle: **an edit is allowed unless a protected pattern covers
//! its target path.**
//!
//! # Overview
//!
//! A [`Policy`] holds ordered lists of path patterns loaded from
//! `patterns.toml`. Two of them drive decisions:
//!
//! - `zero_access_paths` — never modified, checked first
//! - `read_only_paths` — readable but never modified
//!
//! Each pattern is either a glob (`*.pem`, `~/.aws/*`) or a plain path
//! prefix (`~/.ssh/`). See [`Matcher`] for the exact rules.
//!
//! # Example
//!
//! ```
//! use policy::{Matcher, Policy};
//!
//! let policy = Policy::parse(r#"
//! zero_access_paths = ["~/.ssh"]
//! read_only_paths = ["*.lock"]
//! "#)?;
//! let matcher = Matcher::new(Some("/home/alice".into()));
//!
//! let decision = policy.check("/project/Cargo.lock", &matcher);
//! assert_eq!(decision.reason().as_deref(), Some("read-only path *.lock"));
//! assert!(policy.check("/project/src/main.rs", &matcher).is_allowed());
//! # Ok::<(), policy::Error>(())
//! ```
//!
//! The policy file is found with [`discovery::load_policy`], and hook
//! payloads are decoded with [`HookInput`].

pub mod discovery;
mod error;
mod pattern;
mod policy;
mod request;

pub use discovery::Environment;
pub use error::{Error, Result};
pub use pattern::{Matcher, is_glob, normalize};
pub use policy::{Decision, Policy, RuleGroup};
pub use request::{AccessRequest, HookInput, Operation, ToolInput};
