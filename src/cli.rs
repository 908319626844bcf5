//! Command-line interface module for files2folders.
//!
//! This module handles all CLI-related functionality including:
//! - Argument definitions and validation
//! - Translating arguments into `OrganizeOptions`
//! - Driving the organizer with progress output or a JSON report

use crate::config::{FilterRules, OrganizeOptions};
use crate::file_organizer::{FileOrganizer, OrganizeError, OrganizeReport};
use crate::operation::{ConflictPolicy, OperationMode, validate_operation};
use crate::output::OutputFormatter;
use clap::Parser;
use std::path::PathBuf;

/// Copy or move files into year/month folders based on their creation time.
#[derive(Debug, Clone, Parser)]
#[command(name = "files2folders", version, long_about = None)]
pub struct Cli {
    /// The directory containing the source files. Defaults to current directory.
    #[arg(
        short,
        long,
        value_name = "source-directory",
        default_value = ".",
        value_parser = parse_path
    )]
    pub source: PathBuf,

    /// The directory that will receive the folders of files. Defaults to current directory.
    #[arg(
        short,
        long,
        value_name = "destination-directory",
        default_value = ".",
        value_parser = parse_path
    )]
    pub dest: PathBuf,

    /// Move or copy the files. Defaults to copy.
    #[arg(
        short,
        long,
        value_name = "move-or-copy",
        default_value = "copy",
        value_parser = validate_operation
    )]
    pub operation: OperationMode,

    /// What to do when a file with the same name already exists in its folder.
    #[arg(long, value_enum, default_value_t = ConflictPolicy::Error)]
    pub on_conflict: ConflictPolicy,

    /// Show where files would go without creating folders or transferring anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Exclude files with this exact name (repeatable).
    #[arg(long = "exclude-name", value_name = "NAME")]
    pub exclude_names: Vec<String>,

    /// Exclude files with this extension (repeatable, case-insensitive).
    #[arg(long = "exclude-ext", value_name = "EXT")]
    pub exclude_extensions: Vec<String>,

    /// Exclude file names matching this glob pattern (repeatable).
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude_patterns: Vec<String>,

    /// Exclude file names matching this regular expression (repeatable).
    #[arg(long = "exclude-regex", value_name = "REGEX")]
    pub exclude_regex: Vec<String>,

    /// Print the run report as JSON instead of progress output.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Builds the run options described by these arguments.
    pub fn to_options(&self) -> OrganizeOptions {
        OrganizeOptions {
            source: self.source.clone(),
            dest: self.dest.clone(),
            mode: self.operation,
            conflict: self.on_conflict,
            dry_run: self.dry_run,
            filters: FilterRules {
                filenames: self.exclude_names.clone(),
                extensions: self.exclude_extensions.clone(),
                patterns: self.exclude_patterns.clone(),
                regex: self.exclude_regex.clone(),
            },
        }
    }
}

/// Trims surrounding whitespace from a directory argument.
fn parse_path(value: &str) -> Result<PathBuf, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("path must not be empty".to_string());
    }
    Ok(PathBuf::from(trimmed))
}

/// Runs the organizer as described by `cli`.
///
/// Fatal errors (unreadable source, invalid filters) are returned before any
/// file is touched. Per-file failures are part of the returned report.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use files2folders::cli::{Cli, run_cli};
///
/// let cli = Cli::parse_from(["files2folders", "-s", "/camera", "-d", "/photos", "-o", "move"]);
/// match run_cli(&cli) {
///     Ok(report) => println!("{} files organized", report.transferred()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(cli: &Cli) -> Result<OrganizeReport, OrganizeError> {
    let organizer = FileOrganizer::new(cli.to_options())?;

    if cli.json {
        let report = organizer.run()?;
        OutputFormatter::json_report(&report);
        return Ok(report);
    }

    organize_with_progress(&organizer)
}

/// Scans and organizes, printing one line per file and a closing summary.
fn organize_with_progress(organizer: &FileOrganizer) -> Result<OrganizeReport, OrganizeError> {
    let options = organizer.options();
    let banner = format!(
        "Organizing contents of: {} into {} ({})",
        options.source.display(),
        options.dest.display(),
        options.mode
    );
    if options.dry_run {
        OutputFormatter::dry_run_notice(&banner);
    } else {
        OutputFormatter::info(&banner);
    }

    let scan = organizer.scan()?;
    let mut report = OrganizeReport::new(options, scan.excluded);

    if scan.entries.is_empty() {
        OutputFormatter::info("No files found to organize.");
        return Ok(report);
    }

    let total = scan.entries.len();
    let pb = OutputFormatter::create_progress_bar(total as u64);

    for (index, entry) in scan.entries.iter().enumerate() {
        pb.set_message(entry.display_name());
        let outcome = organizer.process(entry);
        OutputFormatter::file_result(&pb, index + 1, total, entry, &outcome, options.mode);
        pb.inc(1);
        report.record(outcome);
    }

    pb.finish_and_clear();
    OutputFormatter::report_footer(&report);

    Ok(report)
}
