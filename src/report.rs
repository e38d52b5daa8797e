/*!
 * Reporting functionality for codedump
 *
 * Renders the outcome of a run either as console tables (via the tabled
 * library) or as JSON for scripting.
 */

use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::error::Result;
use crate::pipeline::IngestionOutcome;
use crate::summary::LanguageCount;
use crate::types::Diagnostic;
use crate::utils::format_file_size;

/// Largest-file table is cut to this many rows once a run exceeds
/// [`FULL_LISTING_LIMIT`] files
const TOP_FILES: usize = 10;
const FULL_LISTING_LIMIT: usize = 15;

/// Information about a file in the report
#[derive(Debug, Clone, Serialize)]
pub struct FileReportInfo {
    pub path: String,
    pub language: String,
    pub lines: usize,
    pub chars: usize,
    pub size: u64,
}

/// Statistics for a finished run
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Where the artifact went (`-` for stdout)
    pub output_file: String,
    /// Time taken by the run and the write
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
    pub success: bool,
    pub error: Option<String>,
    pub files_processed: usize,
    pub total_lines: usize,
    pub total_chars: usize,
    pub languages: Vec<LanguageCount>,
    /// Details for each file, in discovery order
    pub file_details: Vec<FileReportInfo>,
    pub warnings: Vec<Diagnostic>,
}

fn serialize_duration<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl ScanReport {
    /// Collect report data from a pipeline outcome
    pub fn from_outcome(outcome: &IngestionOutcome, output_file: String, duration: Duration) -> Self {
        let mut report = Self {
            output_file,
            duration,
            success: outcome.artifact.success,
            error: outcome.artifact.error.clone(),
            files_processed: 0,
            total_lines: 0,
            total_chars: 0,
            languages: Vec::new(),
            file_details: Vec::new(),
            warnings: outcome.diagnostics.clone(),
        };

        if let Some(result) = &outcome.result {
            report.files_processed = result.total_files;
            report.total_lines = result.total_lines;
            report.total_chars = result.total_chars;
            report.languages = result.languages.clone();
            report.file_details = result
                .files
                .iter()
                .map(|f| FileReportInfo {
                    path: f.path.clone(),
                    language: f.language.to_string(),
                    lines: f.line_count,
                    chars: f.char_count(),
                    size: f.size,
                })
                .collect();
        }

        report
    }
}

/// Format of the report output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Console tables
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Report generator for scan results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string based on scan statistics
    pub fn generate_report(&self, report: &ScanReport) -> Result<String> {
        match self.format {
            ReportFormat::Table => Ok(self.generate_console_report(report)),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ScanReport) -> Result<()> {
        println!("\n{}", self.generate_report(report)?);
        Ok(())
    }

    // Truncate long paths from the left, keeping whole trailing segments
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let mut segments = Vec::new();
        let mut current_len = 3; // "..."
        for part in path.rsplit('/') {
            let part_len = part.chars().count() + 1;
            if current_len + part_len > max_len {
                break;
            }
            segments.push(part);
            current_len += part_len;
        }

        if segments.is_empty() {
            let tail: String = path
                .chars()
                .rev()
                .take(max_len.saturating_sub(3))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return format!("...{}", tail);
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    // Create a summary table using the tabled crate
    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "📂 Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Processed".to_string(),
                value: self.format_number(report.files_processed),
            },
            SummaryRow {
                key: "📝 Total Lines".to_string(),
                value: self.format_number(report.total_lines),
            },
            SummaryRow {
                key: "🔤 Total Characters".to_string(),
                value: self.format_number(report.total_chars),
            },
        ];

        if !report.languages.is_empty() {
            let languages = report
                .languages
                .iter()
                .map(|l| format!("{} ({})", l.language, l.files))
                .collect::<Vec<_>>()
                .join(", ");
            rows.push(SummaryRow {
                key: "🗂️ Languages".to_string(),
                value: languages,
            });
        }

        rows.push(SummaryRow {
            key: "⚠️ Warnings".to_string(),
            value: report.warnings.len().to_string(),
        });

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Create a files table using the tabled crate
    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Language")]
            language: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Size")]
            size: String,
        }

        // Sort files by character count
        let mut files: Vec<&FileReportInfo> = report.file_details.iter().collect();
        files.sort_by(|a, b| b.chars.cmp(&a.chars));
        if files.len() > FULL_LISTING_LIMIT {
            files.truncate(TOP_FILES);
        }

        let rows: Vec<FileRow> = files
            .iter()
            .map(|info| FileRow {
                path: self.format_path(&info.path, 60),
                language: info.language.clone(),
                lines: self.format_number(info.lines),
                size: format_file_size(info.size),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    fn create_warnings_list(&self, report: &ScanReport) -> String {
        report
            .warnings
            .iter()
            .map(|w| format!("  • {}", w))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Generate a console table report
    fn generate_console_report(&self, report: &ScanReport) -> String {
        if !report.success {
            return format!(
                "❌  EXTRACTION FAILED\n{}",
                report.error.as_deref().unwrap_or("unknown error")
            );
        }

        let summary_table = self.create_summary_table(report);
        let files_table = self.create_files_table(report);

        let files_title = if report.file_details.len() > FULL_LISTING_LIMIT {
            "📋  TOP 10 LARGEST FILES BY CHARACTER COUNT  📋"
        } else {
            "📋  PROCESSED FILES"
        };

        let mut output = format!(
            "{}\n{}\n\n✅  EXTRACTION COMPLETE\n{}",
            files_title, files_table, summary_table
        );

        if !report.warnings.is_empty() {
            output.push_str("\n\n⚠️  SKIPPED ENTRIES\n");
            output.push_str(&self.create_warnings_list(report));
        }

        output
    }
}
