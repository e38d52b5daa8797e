/*!
 * codedump - Generate an XML digest of a source tree for LLM context
 *
 * This library walks a directory of source files and produces a single XML
 * document holding a summary, a rendered directory tree and every included
 * file with line numbers, so a Large Language Model gets both the code and
 * precise line references.
 */

pub mod config;
pub mod error;
pub mod language;
pub mod matcher;
pub mod pipeline;
pub mod progress;
pub mod reader;
pub mod report;
pub mod scanner;
pub mod summary;
pub mod tree;
pub mod types;
pub mod utils;
pub mod writer;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use config::{ConfigOverrides, IngestionConfig};
pub use error::{IngestError, Result};
pub use language::Language;
pub use matcher::{matches, PathMatcher};
pub use pipeline::{CancellationToken, IngestionOutcome, Pipeline};
pub use progress::{ProgressReporter, ProgressUpdate, Stage};
pub use reader::FileReader;
pub use report::{ReportFormat, Reporter, ScanReport};
pub use scanner::Scanner;
pub use summary::{summarize, Summary};
pub use tree::{render_tree, DirectoryTree};
pub use types::{Diagnostic, DiagnosticKind, FileRecord, IngestionResult, SerializedArtifact};
pub use writer::XmlWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
