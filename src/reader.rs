/*!
 * Size-bounded file reading and line-number annotation
 */

use std::fs;
use std::path::Path;

use crate::language::Language;
use crate::types::{Diagnostic, DiagnosticKind, FileRecord};
use crate::utils::{find_non_xml_char, format_file_size};

/// Width the line numbers are padded to
pub const LINE_NUMBER_WIDTH: usize = 6;

/// Reads discovered files into [`FileRecord`]s
#[derive(Debug, Clone, Copy)]
pub struct FileReader {
    max_file_size: u64,
    show_line_numbers: bool,
}

impl FileReader {
    pub fn new(max_file_size: u64, show_line_numbers: bool) -> Self {
        Self {
            max_file_size,
            show_line_numbers,
        }
    }

    /// Read one file. Any failure is returned as a diagnostic describing why
    /// the file was left out; it is never fatal for the run.
    pub fn read(&self, path: &Path, relative_path: &str) -> Result<FileRecord, Diagnostic> {
        let metadata = fs::metadata(path).map_err(|e| {
            Diagnostic::new(DiagnosticKind::UnreadableFile, relative_path, e.to_string())
        })?;
        self.check_size(metadata.len(), relative_path)?;

        let bytes = fs::read(path).map_err(|e| {
            Diagnostic::new(DiagnosticKind::UnreadableFile, relative_path, e.to_string())
        })?;
        // The file may have grown since it was stat'ed
        let size = bytes.len() as u64;
        self.check_size(size, relative_path)?;

        let raw = String::from_utf8(bytes).map_err(|e| {
            Diagnostic::new(
                DiagnosticKind::Undecodable,
                relative_path,
                format!("not valid UTF-8 text: {}", e.utf8_error()),
            )
        })?;
        if let Some(c) = find_non_xml_char(&raw) {
            return Err(Diagnostic::new(
                DiagnosticKind::Undecodable,
                relative_path,
                format!("contains U+{:04X}, which XML 1.0 cannot represent", c as u32),
            ));
        }

        let line_count = count_lines(&raw);
        let content = if self.show_line_numbers {
            number_lines(&raw)
        } else {
            raw
        };

        Ok(FileRecord {
            path: relative_path.to_string(),
            content,
            language: Language::from_path(path),
            line_count,
            size,
        })
    }

    fn check_size(&self, size: u64, relative_path: &str) -> Result<(), Diagnostic> {
        if size > self.max_file_size {
            return Err(Diagnostic::new(
                DiagnosticKind::Oversized,
                relative_path,
                format!(
                    "File too large to include content. Size: {} (limit {})",
                    format_file_size(size),
                    format_file_size(self.max_file_size)
                ),
            ));
        }
        Ok(())
    }
}

/// Number of `\n`-delimited segments. A trailing newline yields a final
/// empty segment, which counts.
pub fn count_lines(content: &str) -> usize {
    content.split('\n').count()
}

/// Prefix each `\n`-delimited segment with its 1-based number, right-aligned
/// to [`LINE_NUMBER_WIDTH`], and a `|`. Line boundaries are unchanged.
pub fn number_lines(content: &str) -> String {
    content
        .split('\n')
        .enumerate()
        .map(|(i, line)| format!("{:>width$}|{}", i + 1, line, width = LINE_NUMBER_WIDTH))
        .collect::<Vec<_>>()
        .join("\n")
}
