//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status lines,
//! the per-file progress line, a progress bar, and the folder summary table.
//! Nothing else in the crate prints.

use crate::date_folder::DateFolder;
use crate::file_organizer::{FileOutcome, OrganizeReport, SourceEntry};
use crate::operation::OperationMode;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use files2folders::output::OutputFormatter;
    /// OutputFormatter::error("Source directory is unavailable");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for `total` files.
    ///
    /// The bar draws to stderr and hides itself when stderr is not a terminal.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }

    /// Formats the progress line for one file: running count, name, creation time.
    pub fn progress_line(
        count: usize,
        total: usize,
        entry: &SourceEntry,
        outcome: &FileOutcome,
    ) -> String {
        let counter = format!("[{}/{}]", count, total).dimmed();
        let name = entry.display_name();
        match outcome {
            FileOutcome::Transferred(placement) | FileOutcome::Planned(placement) => format!(
                "{} {} (created {}) → {}/",
                counter,
                name,
                placement.created.format("%Y-%m-%d %H:%M:%S"),
                placement.folder
            ),
            FileOutcome::Skipped { .. } | FileOutcome::Failed { .. } => {
                format!("{} {}", counter, name)
            }
        }
    }

    /// Prints the line for one processed file through the progress bar.
    ///
    /// `suspend` keeps the line from interleaving with the bar and still prints
    /// when the bar is hidden.
    pub fn file_result(
        pb: &ProgressBar,
        count: usize,
        total: usize,
        entry: &SourceEntry,
        outcome: &FileOutcome,
        mode: OperationMode,
    ) {
        let line = Self::progress_line(count, total, entry, outcome);
        pb.suspend(|| match outcome {
            FileOutcome::Transferred(placement) => {
                Self::success(&format!("{} {}", mode.past_tense(), line));
                if let Some(warning) = &placement.warning {
                    Self::warning(&format!("   {}", warning));
                }
            }
            FileOutcome::Planned(_) => Self::dry_run_notice(&format!("Would {} {}", mode, line)),
            FileOutcome::Skipped { reason, .. } => {
                Self::warning(&format!("Skipped {}: {}", line, reason))
            }
            FileOutcome::Failed { error, .. } => Self::error(&format!("{}: {}", line, error)),
        });
    }

    /// Prints the run report as pretty JSON on stdout.
    pub fn json_report(report: &OrganizeReport) {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => Self::error(&format!("Could not serialize report: {}", e)),
        }
    }

    /// Prints a summary table with file counts per date folder.
    pub fn summary_table(folder_counts: &BTreeMap<DateFolder, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = folder_counts
            .keys()
            .map(|folder| folder.to_string().len())
            .max()
            .unwrap_or(0)
            .max(6);

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (folder, count) in folder_counts {
            println!(
                "{:<width$} | {} {}",
                folder.to_string(),
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        );
    }

    /// Prints the closing lines of a run.
    pub fn report_footer(report: &OrganizeReport) {
        if report.dry_run {
            Self::summary_table(&report.folder_counts(), report.planned());
        } else {
            Self::summary_table(&report.folder_counts(), report.transferred());
        }

        if report.excluded > 0 {
            Self::info(&format!(
                "{} hidden or excluded {} left untouched.",
                report.excluded,
                plural(report.excluded)
            ));
        }
        if report.skipped() > 0 {
            Self::warning(&format!(
                "{} {} skipped.",
                report.skipped(),
                plural(report.skipped())
            ));
        }
        if report.warnings() > 0 {
            Self::warning(&format!(
                "Timestamps could not be preserved for {} {}.",
                report.warnings(),
                plural(report.warnings())
            ));
        }

        if report.has_failures() {
            Self::error(&format!(
                "{} {} could not be organized. Please review errors above.",
                report.failed(),
                plural(report.failed())
            ));
        } else if report.dry_run {
            println!();
            Self::success("Dry run complete. No files were modified.");
        } else {
            println!();
            Self::success("Organization complete!");
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
