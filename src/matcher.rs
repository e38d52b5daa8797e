//! Ignore-pattern matching
//!
//! Patterns use a small glob dialect that is compiled to anchored regular
//! expressions:
//!
//! - `**` matches any run of characters, separators included. A `**/` prefix
//!   may also match nothing, and a trailing `/**` may match nothing, so
//!   `**/node_modules/**` covers `node_modules` itself and everything below it
//!   at any depth.
//! - `*` matches any run of characters except `/`.
//! - Every other character matches itself.
//!
//! A pattern matches an entry when it matches either the entry's path relative
//! to the scan root or the entry's bare name.

use regex::Regex;

use crate::error::Result;

/// A single compiled ignore pattern
#[derive(Debug, Clone)]
pub struct GlobPattern {
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob into an anchored matcher
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&glob_to_regex(pattern))?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Translate a glob into the source of an anchored regular expression
pub fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '/' if i + 3 == chars.len() && chars[i + 1] == '*' && chars[i + 2] == '*' => {
                out.push_str("(?:/.*)?");
                i += 3;
            }
            c => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                i += 1;
            }
        }
    }

    out.push('$');
    out
}

/// A set of ignore patterns evaluated together
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    patterns: Vec<GlobPattern>,
    /// Patterns that failed to compile, with the reason. They match nothing.
    rejected: Vec<(String, String)>,
}

impl PathMatcher {
    /// Compile every pattern. Patterns that fail to compile are kept aside
    /// in [`PathMatcher::rejected`] instead of failing the whole set.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut matcher = Self::default();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            match GlobPattern::compile(pattern) {
                Ok(compiled) => matcher.patterns.push(compiled),
                Err(e) => {
                    log::warn!("Ignoring invalid pattern {:?}: {}", pattern, e);
                    matcher.rejected.push((pattern.to_string(), e.to_string()));
                }
            }
        }

        matcher
    }

    /// True when any pattern matches the relative path or the bare name
    pub fn is_ignored(&self, relative_path: &str, name: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.is_match(relative_path) || p.is_match(name))
    }

    pub fn rejected(&self) -> &[(String, String)] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// One-shot check of a relative path against a pattern set
pub fn matches<S: AsRef<str>>(candidate_path: &str, patterns: &[S]) -> bool {
    let name = candidate_path.rsplit('/').next().unwrap_or(candidate_path);
    PathMatcher::new(patterns).is_ignored(candidate_path, name)
}
