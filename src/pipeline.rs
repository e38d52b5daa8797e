/*!
 * Orchestration of one ingestion run
 *
 * A run moves through `Idle → Discovering → Reading → BuildingTree →
 * Summarizing → Serializing → Done`, or to `Failed` from any step. Every
 * stage completes before the next one starts. Failures never escape
 * [`Pipeline::run`]; they come back as an unsuccessful artifact.
 */

use std::path::PathBuf;

use crate::config::{ConfigOverrides, IngestionConfig};
use crate::error::{IngestError, Result};
use crate::matcher::PathMatcher;
use crate::progress::{ProgressReporter, ProgressUpdate, Stage};
use crate::reader::FileReader;
use crate::scanner::Scanner;
use crate::summary::Summary;
use crate::tree::render_tree;
use crate::types::{Diagnostic, FileRecord, IngestionResult, SerializedArtifact};
use crate::utils::relative_slash_path;
use crate::writer::XmlWriter;

pub use crate::progress::CancellationToken;

/// Percentage reported when each stage starts
const DISCOVERING_PERCENT: u8 = 5;
const READING_START_PERCENT: u8 = 10;
const READING_END_PERCENT: u8 = 70;
const BUILDING_TREE_PERCENT: u8 = 75;
const SUMMARIZING_PERCENT: u8 = 85;
const SERIALIZING_PERCENT: u8 = 95;

/// Everything a run hands back to its caller
#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    /// The XML document, or the failure that prevented it
    pub artifact: SerializedArtifact,
    /// Structured result; `None` when the run failed
    pub result: Option<IngestionResult>,
    /// Per-item problems, in the order they were met
    pub diagnostics: Vec<Diagnostic>,
    /// Resolved configuration, when resolution got that far
    pub config: Option<IngestionConfig>,
}

impl IngestionOutcome {
    pub fn is_success(&self) -> bool {
        self.artifact.success
    }
}

/// Sequential ingestion pipeline for a single root directory
pub struct Pipeline<'a> {
    root: PathBuf,
    overrides: ConfigOverrides,
    progress: Option<&'a dyn ProgressReporter>,
    cancel: CancellationToken,
    stage: Stage,
    last_percent: u8,
    diagnostics: Vec<Diagnostic>,
    config: Option<IngestionConfig>,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline for `root` using the default configuration
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overrides: ConfigOverrides::default(),
            progress: None,
            cancel: CancellationToken::new(),
            stage: Stage::Idle,
            last_percent: 0,
            diagnostics: Vec::new(),
            config: None,
        }
    }

    /// Apply caller overrides on top of the defaults
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Send progress notifications to `reporter`
    pub fn with_progress(mut self, reporter: &'a dyn ProgressReporter) -> Self {
        self.progress = Some(reporter);
        self
    }

    /// Honor `token` during discovery and reading
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Current position in the state machine
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Execute the run. Never fails: fatal errors yield an outcome whose
    /// artifact has `success == false` and an empty document.
    pub fn run(&mut self) -> IngestionOutcome {
        self.stage = Stage::Idle;
        self.last_percent = 0;
        self.diagnostics.clear();
        self.config = None;

        match self.execute() {
            Ok((result, xml)) => {
                self.transition(Stage::Done, "Done".to_string(), Some(100));
                log::info!(
                    "Ingested {} files ({} lines, {} warnings)",
                    result.total_files,
                    result.total_lines,
                    self.diagnostics.len()
                );
                IngestionOutcome {
                    artifact: SerializedArtifact::success(xml),
                    result: Some(result),
                    diagnostics: std::mem::take(&mut self.diagnostics),
                    config: self.config.take(),
                }
            }
            Err(e) => {
                let message = e.to_string();
                log::error!("Ingestion failed during {}: {}", self.stage, message);
                self.transition(Stage::Failed, message.clone(), None);
                IngestionOutcome {
                    artifact: SerializedArtifact::failure(message),
                    result: None,
                    diagnostics: std::mem::take(&mut self.diagnostics),
                    config: self.config.take(),
                }
            }
        }
    }

    fn execute(&mut self) -> Result<(IngestionResult, String)> {
        self.transition(
            Stage::Discovering,
            format!("Scanning {}", self.root.display()),
            Some(DISCOVERING_PERCENT),
        );
        let config = IngestionConfig::resolve(&self.root, &self.overrides)?;
        self.config = Some(config.clone());

        let matcher = PathMatcher::new(&config.ignore_patterns);
        let discovery = Scanner::new(&config.root, matcher)
            .with_cancellation(self.cancel.clone())
            .discover()?;
        for diagnostic in &discovery.diagnostics {
            log::warn!("{}", diagnostic);
        }
        self.diagnostics.extend(discovery.diagnostics);

        let records = self.read_files(&config, &discovery.files)?;

        self.transition(
            Stage::BuildingTree,
            "Building directory tree".to_string(),
            Some(BUILDING_TREE_PERCENT),
        );
        let tree = render_tree(records.iter().map(|r| r.path.as_str()));

        self.transition(
            Stage::Summarizing,
            "Summarizing".to_string(),
            Some(SUMMARIZING_PERCENT),
        );
        let summary = Summary::from_records(&records);
        let result = IngestionResult::new(summary.render(), tree, records, summary.languages);

        self.transition(
            Stage::Serializing,
            "Writing XML".to_string(),
            Some(SERIALIZING_PERCENT),
        );
        let xml = XmlWriter::new().serialize_result(&result)?;

        Ok((result, xml))
    }

    fn read_files(
        &mut self,
        config: &IngestionConfig,
        files: &[PathBuf],
    ) -> Result<Vec<FileRecord>> {
        self.transition(
            Stage::Reading,
            format!("Reading {} files", files.len()),
            Some(READING_START_PERCENT),
        );

        let reader = FileReader::new(config.max_file_size, config.show_line_numbers);
        let span = usize::from(READING_END_PERCENT - READING_START_PERCENT);
        let mut records = Vec::with_capacity(files.len());

        for (i, path) in files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(IngestError::Cancelled);
            }

            let relative = relative_slash_path(&config.root, path).ok_or_else(|| {
                crate::error!(Unexpected, "{} is outside the scan root", path.display())
            })?;

            match reader.read(path, &relative) {
                Ok(record) => records.push(record),
                Err(diagnostic) => {
                    log::warn!("Skipping {}", diagnostic);
                    self.diagnostics.push(diagnostic);
                }
            }

            let percent = READING_START_PERCENT as usize + span * (i + 1) / files.len();
            self.transition(Stage::Reading, relative, Some(percent as u8));
        }

        Ok(records)
    }

    /// Move to `stage` and tell the reporter, keeping percentages monotonic
    fn transition(&mut self, stage: Stage, message: String, percent: Option<u8>) {
        self.stage = stage;

        let percent = percent.map(|p| {
            self.last_percent = self.last_percent.max(p.min(100));
            self.last_percent
        });

        if let Some(reporter) = self.progress {
            reporter.report(&ProgressUpdate {
                stage,
                message,
                percent,
            });
        }
    }
}
