//! Policy configuration and enforcement.

use crate::{AccessRequest, Error, Matcher, Operation, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Protected path patterns loaded from `patterns.toml`.
///
/// Missing keys default to empty lists, so an empty document and a missing
/// file both produce the same empty policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Paths that may not be touched at all.
    #[serde(alias = "zeroAccessPaths")]
    pub zero_access_paths: Vec<String>,

    /// Paths that may be read but not modified.
    #[serde(alias = "readOnlyPaths")]
    pub read_only_paths: Vec<String>,

    /// Paths that may not be deleted. Not consulted for edits.
    #[serde(alias = "noDeletePaths")]
    pub no_delete_paths: Vec<String>,

    /// Shell command patterns. Not consulted for edits.
    #[serde(alias = "bashToolPatterns")]
    pub bash_tool_patterns: Vec<String>,
}

/// The rule group that blocked a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleGroup {
    ZeroAccess,
    ReadOnly,
}

impl fmt::Display for RuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleGroup::ZeroAccess => f.write_str("zero-access path"),
            RuleGroup::ReadOnly => f.write_str("read-only path"),
        }
    }
}

/// Result of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Block { group: RuleGroup, pattern: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_blocked(&self) -> bool {
        !self.is_allowed()
    }

    /// Human-readable reason naming the rule that blocked, if any.
    pub fn reason(&self) -> Option<String> {
        match self {
            Decision::Allow => None,
            Decision::Block {
                group: RuleGroup::ZeroAccess,
                pattern,
            } => Some(format!(
                "{} {pattern} (no operations allowed)",
                RuleGroup::ZeroAccess
            )),
            Decision::Block {
                group: RuleGroup::ReadOnly,
                pattern,
            } => Some(format!("{} {pattern}", RuleGroup::ReadOnly)),
        }
    }
}

impl Policy {
    /// Load policy from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Load policy from a TOML file, or return an empty policy if the file
    /// does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no policy file, using empty policy");
            return Ok(Self::default());
        }
        let policy = Self::load(path)?;
        debug!(
            path = %path.display(),
            zero_access = policy.zero_access_paths.len(),
            read_only = policy.read_only_paths.len(),
            "loaded policy"
        );
        Ok(policy)
    }

    /// Parse policy from TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        let policy: Self = toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))?;
        policy.warn_empty_patterns();
        Ok(policy)
    }

    /// All four pattern groups, keyed by their configuration name.
    pub fn groups(&self) -> [(&'static str, &[String]); 4] {
        [
            ("zero_access_paths", self.zero_access_paths.as_slice()),
            ("read_only_paths", self.read_only_paths.as_slice()),
            ("no_delete_paths", self.no_delete_paths.as_slice()),
            ("bash_tool_patterns", self.bash_tool_patterns.as_slice()),
        ]
    }

    /// Check whether modifying `path` is allowed.
    ///
    /// Zero-access patterns are tried before read-only ones; within a group
    /// the first listed pattern wins.
    pub fn check(&self, path: &str, matcher: &Matcher) -> Decision {
        let ordered = [
            (RuleGroup::ZeroAccess, &self.zero_access_paths),
            (RuleGroup::ReadOnly, &self.read_only_paths),
        ];

        for (group, patterns) in ordered {
            if let Some(pattern) = patterns.iter().find(|p| matcher.matches(path, p.as_str())) {
                debug!(path, %group, pattern = %pattern, "blocked");
                return Decision::Block {
                    group,
                    pattern: pattern.clone(),
                };
            }
        }

        Decision::Allow
    }

    /// Check an access request. Only modifications are restricted.
    pub fn check_request(&self, request: &AccessRequest, matcher: &Matcher) -> Decision {
        match request.operation {
            Operation::Modify => self.check(&request.path, matcher),
            Operation::Other => Decision::Allow,
        }
    }

    fn warn_empty_patterns(&self) {
        for (name, patterns) in self.groups() {
            let empty = patterns.iter().filter(|p| p.is_empty()).count();
            if empty > 0 {
                warn!(group = name, count = empty, "empty pattern covers every path");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn matcher() -> Matcher {
        Matcher::new(Some(PathBuf::from("/home/alice")))
    }

    fn policy(zero_access: &[&str], read_only: &[&str]) -> Policy {
        Policy {
            zero_access_paths: zero_access.iter().map(|s| s.to_string()).collect(),
            read_only_paths: read_only.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_access_blocks() {
        let policy = policy(&["~/.ssh"], &[]);
        let decision = policy.check("~/.ssh/id_rsa", &matcher());
        assert!(decision.is_blocked());
        let reason = decision.reason().unwrap();
        assert!(reason.contains("zero-access path ~/.ssh"));
        assert_eq!(reason, "zero-access path ~/.ssh (no operations allowed)");
    }

    #[test]
    fn test_read_only_blocks() {
        let policy = policy(&[], &["*.lock"]);
        let decision = policy.check("/project/package.lock", &matcher());
        assert_eq!(
            decision,
            Decision::Block {
                group: RuleGroup::ReadOnly,
                pattern: "*.lock".to_string()
            }
        );
        assert_eq!(decision.reason().unwrap(), "read-only path *.lock");
    }

    #[test]
    fn test_unmatched_path_is_allowed() {
        let policy = policy(&[], &["*.lock"]);
        let decision = policy.check("/project/main.py", &matcher());
        assert!(decision.is_allowed());
        assert_eq!(decision.reason(), None);
    }

    #[test]
    fn test_zero_access_takes_precedence() {
        // Read-only listed first in the file still loses to zero-access.
        let policy = Policy::parse(
            r#"
read_only_paths = ["*.env"]
zero_access_paths = ["/project/"]
"#,
        )
        .unwrap();
        let decision = policy.check("/project/.env", &matcher());
        assert_eq!(
            decision.reason().unwrap(),
            "zero-access path /project/ (no operations allowed)"
        );
    }

    #[test]
    fn test_first_pattern_in_group_wins() {
        let policy = policy(&[], &["/project/", "*.lock"]);
        let decision = policy.check("/project/Cargo.lock", &matcher());
        assert_eq!(decision.reason().unwrap(), "read-only path /project/");
    }

    #[test]
    fn test_empty_pattern_blocks_everything() {
        let policy = Policy::parse(r#"zero_access_paths = [""]"#).unwrap();
        let m = matcher();
        for path in ["/etc/passwd", "/project/main.py", "notes.txt"] {
            assert_eq!(
                policy.check(path, &m),
                Decision::Block {
                    group: RuleGroup::ZeroAccess,
                    pattern: String::new()
                }
            );
        }
    }

    #[test]
    fn test_check_is_idempotent() {
        let policy = policy(&["*.pem"], &["/etc/"]);
        let m = matcher();
        for path in ["/srv/tls/server.pem", "/etc/hosts", "/tmp/x"] {
            assert_eq!(policy.check(path, &m), policy.check(path, &m));
        }
    }

    #[test]
    fn test_empty_policy_allows_everything() {
        let policy = Policy::default();
        let m = matcher();
        for path in ["/", "~/.ssh/id_rsa", "/etc/passwd", "relative.txt"] {
            assert!(policy.check(path, &m).is_allowed());
        }
    }

    #[test]
    fn test_only_modify_requests_are_checked() {
        let policy = policy(&["/etc/"], &[]);
        let m = matcher();
        assert!(policy.check_request(&AccessRequest::modify("/etc/hosts"), &m).is_blocked());

        let read = AccessRequest {
            operation: Operation::Other,
            path: "/etc/hosts".to_string(),
        };
        assert!(policy.check_request(&read, &m).is_allowed());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
zero_access_paths = ["~/.ssh/", "*.pem"]
read_only_paths = ["/etc/"]
no_delete_paths = [".git/"]
bash_tool_patterns = ["rm -rf"]
"#;
        let policy = Policy::parse(toml).unwrap();
        assert_eq!(policy.zero_access_paths, vec!["~/.ssh/", "*.pem"]);
        assert_eq!(policy.read_only_paths, vec!["/etc/"]);
        assert_eq!(policy.no_delete_paths, vec![".git/"]);
        assert_eq!(policy.bash_tool_patterns, vec!["rm -rf"]);
    }

    #[test]
    fn test_parse_camel_case_keys() {
        let policy = Policy::parse(r#"zeroAccessPaths = ["~/.aws"]"#).unwrap();
        assert_eq!(policy.zero_access_paths, vec!["~/.aws"]);
        assert!(policy.read_only_paths.is_empty());
    }

    #[test]
    fn test_empty_document_is_empty_policy() {
        assert_eq!(Policy::parse("").unwrap(), Policy::default());
        assert_eq!(Policy::parse("# nothing here\n").unwrap(), Policy::default());
    }

    #[test]
    fn test_malformed_document_fails() {
        assert!(matches!(
            Policy::parse("zero_access_paths = [").unwrap_err(),
            Error::Parse(_)
        ));
        assert!(matches!(
            Policy::parse("zero_access_paths = \"~/.ssh\"").unwrap_err(),
            Error::Parse(_)
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let policy = Policy::load_or_default(dir.path().join("patterns.toml")).unwrap();
        assert_eq!(policy, Policy::default());
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.toml");
        std::fs::write(&path, "read_only_paths = [1, 2").unwrap();

        let err = Policy::load_or_default(&path).unwrap_err();
        assert!(err.to_string().contains("patterns.toml"));
    }
}
