/*!
 * Recursive discovery of source files under the scan root
 */

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{IngestError, Result};
use crate::language::is_source_file;
use crate::matcher::PathMatcher;
use crate::progress::CancellationToken;
use crate::types::{Diagnostic, DiagnosticKind};
use crate::utils::{find_non_xml_char, relative_slash_path};

/// Files found by a discovery pass plus whatever could not be visited
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Absolute paths in traversal order
    pub files: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scanner for directory contents
pub struct Scanner {
    root: PathBuf,
    matcher: PathMatcher,
    cancel: CancellationToken,
}

impl Scanner {
    /// Create a scanner for `root` (expected to be absolute)
    pub fn new(root: impl Into<PathBuf>, matcher: PathMatcher) -> Self {
        Self {
            root: root.into(),
            matcher,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop discovery once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Walk the root depth-first in the order the filesystem yields entries.
    /// Ignored directories are not descended into; unreadable ones are
    /// recorded and skipped, as are entries whose names cannot appear in the
    /// artifact verbatim. Only cancellation makes this fail.
    pub fn discover(&self) -> Result<Discovery> {
        let mut discovery = Discovery::default();

        for (pattern, reason) in self.matcher.rejected() {
            discovery.diagnostics.push(Diagnostic::new(
                DiagnosticKind::InvalidPattern,
                pattern.as_str(),
                format!("pattern matches nothing: {}", reason),
            ));
        }

        let mut walker = WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !self.should_ignore(entry.path()));

        while let Some(entry) = walker.next() {
            if self.cancel.is_cancelled() {
                return Err(IngestError::Cancelled);
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| self.display_path(p)).unwrap_or_default();
                    log::warn!("Skipping unreadable entry {:?}: {}", path, e);
                    discovery.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnreadableDirectory,
                        path,
                        e.to_string(),
                    ));
                    continue;
                }
            };

            let is_dir = entry.file_type().is_dir();
            if !is_dir && (!entry.file_type().is_file() || !is_source_file(entry.path())) {
                continue;
            }

            if let Err(reason) = self.check_name(entry.path()) {
                let path = self.display_path(entry.path());
                log::warn!("Skipping {:?}: {}", path, reason);
                discovery.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::InvalidPathName,
                    path,
                    reason,
                ));
                if is_dir {
                    walker.skip_current_dir();
                }
                continue;
            }

            if !is_dir {
                discovery.files.push(entry.into_path());
            }
        }

        log::debug!(
            "Discovered {} source files under {}",
            discovery.files.len(),
            self.root.display()
        );
        Ok(discovery)
    }

    /// Check if an entry is covered by an ignore pattern. The root itself is
    /// never ignored.
    pub fn should_ignore(&self, path: &Path) -> bool {
        let Some(relative) = relative_slash_path(&self.root, path) else {
            return false;
        };
        if relative.is_empty() {
            return false;
        }

        let name = path.file_name().unwrap_or_default().to_string_lossy();
        self.matcher.is_ignored(&relative, &name)
    }

    /// Paths become `path` attributes, so they must be UTF-8 and hold only
    /// characters XML can carry. Lossy conversion could make two names collide.
    fn check_name(&self, path: &Path) -> std::result::Result<(), String> {
        let name = path.file_name().unwrap_or_default();
        let Some(name) = name.to_str() else {
            return Err("name is not valid UTF-8".to_string());
        };
        match find_non_xml_char(name) {
            Some(c) => Err(format!(
                "name contains U+{:04X}, which XML 1.0 cannot represent",
                c as u32
            )),
            None => Ok(()),
        }
    }

    /// Root-relative path for messages, converted lossily
    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}
