/*!
 * Core types and data structures for codedump
 */

use std::fmt;

use serde::Serialize;

use crate::language::Language;
use crate::summary::LanguageCount;

/// One included source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Path relative to the scan root, always using `/` separators
    pub path: String,
    /// File content, line-numbered when the run asked for it
    pub content: String,
    /// Language inferred from the extension
    pub language: Language,
    /// Number of `\n`-delimited segments in the original content
    pub line_count: usize,
    /// Size on disk in bytes
    pub size: u64,
}

impl FileRecord {
    /// Characters of the stored content (including any line-number prefixes)
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Everything a successful run produced, before serialization
#[derive(Debug, Clone, Serialize)]
pub struct IngestionResult {
    /// Rendered summary text
    pub summary: String,
    /// Rendered directory tree text
    pub tree: String,
    /// Included files in discovery order
    pub files: Vec<FileRecord>,
    /// Language histogram, most common first
    pub languages: Vec<LanguageCount>,
    pub total_files: usize,
    pub total_lines: usize,
    pub total_chars: usize,
}

impl IngestionResult {
    /// Assemble a result, deriving every total from `files`
    pub fn new(
        summary: String,
        tree: String,
        files: Vec<FileRecord>,
        languages: Vec<LanguageCount>,
    ) -> Self {
        let total_lines = files.iter().map(|f| f.line_count).sum();
        let total_chars = files.iter().map(FileRecord::char_count).sum();

        Self {
            summary,
            tree,
            total_files: files.len(),
            total_lines,
            total_chars,
            files,
            languages,
        }
    }
}

/// The externally visible output of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SerializedArtifact {
    /// XML document; empty when the run failed
    pub xml: String,
    pub success: bool,
    pub error: Option<String>,
}

impl SerializedArtifact {
    pub fn success(xml: String) -> Self {
        Self {
            xml,
            success: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            xml: String::new(),
            success: false,
            error: Some(message.into()),
        }
    }
}

/// What kind of per-item problem a diagnostic describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A directory (or entry) could not be listed during discovery
    UnreadableDirectory,
    /// A file exceeded the configured size bound
    Oversized,
    /// A file could not be opened or read
    UnreadableFile,
    /// A file was not valid UTF-8 text, or held characters XML cannot carry
    Undecodable,
    /// An entry's name cannot be written into the artifact unchanged
    InvalidPathName,
    /// An ignore pattern could not be compiled and matches nothing
    InvalidPattern,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::UnreadableDirectory => "unreadable directory",
            Self::Oversized => "oversized file",
            Self::UnreadableFile => "unreadable file",
            Self::Undecodable => "undecodable file",
            Self::InvalidPathName => "invalid path name",
            Self::InvalidPattern => "invalid pattern",
        };
        f.write_str(label)
    }
}

/// A recoverable problem recorded during a run. The item it names was
/// excluded from the result; the run itself carried on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Path (or pattern) the problem relates to
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.path, self.message)
    }
}
