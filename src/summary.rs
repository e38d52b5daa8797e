/*!
 * Aggregate statistics and the human-readable summary text
 */

use std::fmt::Write;

use serde::Serialize;

use crate::language::Language;
use crate::types::FileRecord;

/// Number of files for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageCount {
    pub language: Language,
    pub files: usize,
}

/// Totals over a set of file records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_files: usize,
    pub total_lines: usize,
    pub total_chars: usize,
    /// Most common language first; ties keep first-seen order
    pub languages: Vec<LanguageCount>,
}

impl Summary {
    pub fn from_records(records: &[FileRecord]) -> Self {
        Self {
            total_files: records.len(),
            total_lines: records.iter().map(|r| r.line_count).sum(),
            total_chars: records.iter().map(FileRecord::char_count).sum(),
            languages: language_histogram(records),
        }
    }

    /// Render the summary block placed at the top of the artifact
    pub fn render(&self) -> String {
        let mut text = String::from(
            "This file is a merged representation of the codebase, combining all \
             included source files into a single document.\n\n",
        );

        // Writing into a String cannot fail
        let _ = writeln!(text, "Total files: {}", self.total_files);
        let _ = writeln!(text, "Total lines: {}", self.total_lines);
        let _ = writeln!(text, "Total characters: {}", self.total_chars);

        if !self.languages.is_empty() {
            text.push_str("\nLanguages:\n");
            for entry in &self.languages {
                let _ = writeln!(text, "- {}: {} files", entry.language, entry.files);
            }
        }

        text.trim_end().to_string()
    }
}

/// Count files per language, sorted by descending count. The sort is stable,
/// so equally common languages stay in the order they were first seen.
pub fn language_histogram(records: &[FileRecord]) -> Vec<LanguageCount> {
    let mut counts: Vec<LanguageCount> = Vec::new();

    for record in records {
        match counts.iter_mut().find(|c| c.language == record.language) {
            Some(entry) => entry.files += 1,
            None => counts.push(LanguageCount {
                language: record.language,
                files: 1,
            }),
        }
    }

    counts.sort_by(|a, b| b.files.cmp(&a.files));
    counts
}

/// Render the summary text for a set of records
pub fn summarize(records: &[FileRecord]) -> String {
    Summary::from_records(records).render()
}
