//! Path pattern matching.
//!
//! A pattern is either a glob (it contains `*`, `?` or `[`) or a plain path
//! prefix. Globs are tried case-insensitively against the file name and
//! against the whole path, so `*.env` catches env files in any directory
//! while `~/.aws/*` stays anchored to one directory. Plain patterns match
//! the path itself and anything underneath it.

use glob::{MatchOptions, Pattern};
use std::path::PathBuf;

const GLOB_CHARS: [char; 3] = ['*', '?', '['];

// Candidates are lowercased before matching; `*` and `?` may cross `/`.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Returns true if `pattern` contains glob wildcards.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(&GLOB_CHARS[..])
}

/// Lexically normalize a `/`-separated path.
///
/// Collapses repeated separators, `.` segments and `..` segments and drops
/// any trailing separator. Nothing is resolved against the filesystem, so
/// symlinks are left alone. An empty path normalizes to `.`.
pub fn normalize(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    // POSIX keeps exactly two leading slashes; three or more collapse to one.
    let root = if path.starts_with("//") && !path.starts_with("///") {
        "//"
    } else if path.starts_with('/') {
        "/"
    } else {
        ""
    };

    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if root.is_empty() {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    let normalized = format!("{root}{}", parts.join("/"));
    if normalized.is_empty() {
        ".".to_string()
    } else {
        normalized
    }
}

/// Matches paths against policy patterns.
///
/// Holds the home directory used to expand `~`, so matching never reads the
/// process environment on its own.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    home: Option<PathBuf>,
}

impl Matcher {
    /// Create a matcher that expands `~` to `home`. With `None`, `~` is kept
    /// as a literal character.
    pub fn new(home: Option<PathBuf>) -> Self {
        Self { home }
    }

    /// Create a matcher for the current user's home directory.
    pub fn from_env() -> Self {
        Self::new(dirs::home_dir())
    }

    /// Expand a leading `~` or `~/` to the home directory.
    ///
    /// `~user` forms are returned unchanged.
    pub fn expand_home(&self, path: &str) -> String {
        let Some(home) = &self.home else {
            return path.to_string();
        };
        let rest = match path.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => return path.to_string(),
        };

        let home = home.to_string_lossy();
        let expanded = format!("{}{rest}", home.trim_end_matches('/'));
        if expanded.is_empty() {
            "/".to_string()
        } else {
            expanded
        }
    }

    /// Check whether `path` is covered by `pattern`.
    ///
    /// An empty pattern is a prefix of every path and so matches everything.
    pub fn matches(&self, path: &str, pattern: &str) -> bool {
        let expanded_pattern = self.expand_home(pattern);
        let expanded_path = self.expand_home(&normalize(path));

        if is_glob(pattern) {
            let name = basename(&expanded_path).to_lowercase();
            glob_matches(&expanded_pattern, &name)
                || glob_matches(pattern, &name)
                || glob_matches(&expanded_pattern, &expanded_path.to_lowercase())
        } else {
            expanded_path.starts_with(&expanded_pattern)
                || expanded_path == expanded_pattern.trim_end_matches('/')
        }
    }
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Case-insensitive glob match. `candidate` must already be lowercase.
///
/// Patterns the glob engine rejects (an unclosed `[`, say) are compared as
/// literal text.
fn glob_matches(pattern: &str, candidate: &str) -> bool {
    let pattern = squeeze_stars(&pattern.to_lowercase());
    match Pattern::new(&pattern) {
        Ok(compiled) => compiled.matches_with(candidate, MATCH_OPTIONS),
        Err(_) => pattern == candidate,
    }
}

// `*` already crosses separators, so `**` means the same thing. The glob
// engine only accepts `**` as a whole path component.
fn squeeze_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}
