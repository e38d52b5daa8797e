/*!
 * Configuration handling for codedump
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;
use serde::Deserialize;

use crate::ensure;
use crate::error::{Result, ResultExt};
use crate::report::ReportFormat;
use crate::utils::{DEFAULT_IGNORE_PATTERNS, DEFAULT_MAX_FILE_SIZE, DEFAULT_OUTPUT_FILE};

/// Command-line arguments for codedump
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "codedump",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate a line-numbered XML digest of a source tree for LLM context",
    long_about = "Walks a directory of source files and writes a single XML document holding a summary, a directory tree and every included file with line numbers, ready to be handed to a Large Language Model."
)]
pub struct Args {
    /// Target directory to process
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Output XML file name (a bare name is placed inside the target directory)
    #[clap(default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    /// Skip files larger than this many bytes
    #[clap(long)]
    pub max_file_size: Option<u64>,

    /// Comma-separated list of extra patterns to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Do not apply the built-in ignore patterns
    #[clap(long)]
    pub no_default_ignores: bool,

    /// Emit file content without line numbers
    #[clap(long)]
    pub no_line_numbers: bool,

    /// JSON file with configuration overrides
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Format of the report printed after the run
    #[clap(long, value_enum, default_value_t = ReportFormat::default())]
    pub report: ReportFormat,

    /// Print the XML to stdout instead of writing the output file
    #[clap(long)]
    pub stdout: bool,

    /// Enable debug logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[clap(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

impl Args {
    /// Collect overrides from the optional JSON file, then apply flags on top
    pub fn overrides(&self) -> Result<ConfigOverrides> {
        let mut overrides = match &self.config {
            Some(path) => ConfigOverrides::from_json_file(path)?,
            None => ConfigOverrides::default(),
        };

        if self.max_file_size.is_some() {
            overrides.max_file_size = self.max_file_size;
        }
        if self.no_default_ignores && overrides.ignore_patterns.is_none() {
            overrides.ignore_patterns = Some(Vec::new());
        }
        overrides
            .extra_ignore_patterns
            .extend(self.ignore_patterns.iter().cloned());
        if self.no_line_numbers {
            overrides.show_line_numbers = Some(false);
        }

        Ok(overrides)
    }

    /// Where the artifact goes: a bare file name lands in the target
    /// directory, anything with a directory component is used as given.
    pub fn output_path(&self, root: &Path) -> PathBuf {
        let output = PathBuf::from(&self.output_file);
        if !output.is_absolute()
            && output
                .parent()
                .map_or(true, |parent| parent == Path::new(""))
        {
            root.join(output)
        } else {
            output
        }
    }
}

/// Caller-supplied partial configuration. Unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub max_file_size: Option<u64>,
    /// Replaces the built-in ignore patterns
    pub ignore_patterns: Option<Vec<String>>,
    /// Appended after the (default or replaced) ignore patterns
    pub extra_ignore_patterns: Vec<String>,
    pub show_line_numbers: Option<bool>,
}

impl ConfigOverrides {
    /// Load overrides from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Configuration of a single ingestion run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestionConfig {
    /// Canonical absolute path of the directory to scan
    pub root: PathBuf,
    /// Files strictly larger than this are skipped
    pub max_file_size: u64,
    /// Ignore globs, see [`crate::matcher`]
    pub ignore_patterns: Vec<String>,
    /// Prefix every line with its number
    pub show_line_numbers: bool,
}

impl IngestionConfig {
    /// Merge defaults with `overrides` and check the root is a readable
    /// directory.
    pub fn resolve(root: impl AsRef<Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let root = root.as_ref();
        ensure!(root.exists(), PathNotFound, "{}", root.display());
        ensure!(
            root.is_dir(),
            Config,
            "Target is not a directory: {}",
            root.display()
        );

        let root = fs::canonicalize(root)
            .with_context(|| format!("Failed to resolve {}", root.display()))?;
        fs::read_dir(&root)
            .with_context(|| format!("Target directory is not readable: {}", root.display()))?;

        let mut ignore_patterns = match &overrides.ignore_patterns {
            Some(patterns) => patterns.clone(),
            None => DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        };
        ignore_patterns.extend(overrides.extra_ignore_patterns.iter().cloned());

        Ok(Self {
            root,
            max_file_size: overrides.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE),
            ignore_patterns,
            show_line_numbers: overrides.show_line_numbers.unwrap_or(true),
        })
    }
}
