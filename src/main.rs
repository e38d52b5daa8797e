/*!
 * Command-line interface for codedump
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use codedump::config::Args;
use codedump::pipeline::Pipeline;
use codedump::progress::ProgressUpdate;
use codedump::report::{Reporter, ScanReport};
use codedump::utils::relative_slash_path;
use codedump::writer::XmlWriter;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut command = Args::command();
        clap_complete::generate(shell, &mut command, "codedump", &mut io::stdout());
        return Ok(());
    }

    init_logging(&args);

    let root = PathBuf::from(&args.directory_path);
    let output_path = args.output_path(&root);

    let mut overrides = args.overrides()?;
    // Don't process the output file itself
    if !args.stdout {
        if let Some(pattern) = output_exclusion(&root, &output_path) {
            overrides.extra_ignore_patterns.push(pattern);
        }
    }

    let progress = ProgressBar::new(100);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}% ⏱️  Elapsed: {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    if args.quiet {
        progress.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    progress.enable_steady_tick(Duration::from_millis(100));

    let reporter = |update: &ProgressUpdate| {
        progress.set_prefix(update.stage.to_string());
        progress.set_message(update.message.clone());
        if let Some(percent) = update.percent {
            progress.set_position(u64::from(percent));
        }
    };

    // Start timing both the run and the write
    let start_time = Instant::now();

    let outcome = Pipeline::new(&root)
        .with_overrides(overrides)
        .with_progress(&reporter)
        .run();

    if outcome.is_success() {
        if args.stdout {
            progress.finish_and_clear();
            println!("{}", outcome.artifact.xml);
            return Ok(());
        }
        XmlWriter::new().persist(&outcome.artifact, &output_path)?;
    }

    let total_duration = start_time.elapsed();
    progress.finish_and_clear();

    let scan_report = ScanReport::from_outcome(
        &outcome,
        output_path.display().to_string(),
        total_duration,
    );
    Reporter::new(args.report).print_report(&scan_report)?;

    match outcome.artifact.error {
        Some(message) if !outcome.artifact.success => {
            Err(io::Error::new(io::ErrorKind::Other, message))
        }
        _ => Ok(()),
    }
}

fn init_logging(args: &Args) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// Ignore pattern naming the output file when it lives under the scan root
fn output_exclusion(root: &Path, output: &Path) -> Option<String> {
    let root = fs::canonicalize(root).ok()?;
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let parent = fs::canonicalize(parent).ok()?;
    let relative = relative_slash_path(&root, &parent.join(output.file_name()?))?;
    Some(relative)
}
