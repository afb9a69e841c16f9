//! Output formatting and styling module.
//!
//! All terminal rendering of classification and organize results lives here,
//! so the core modules only return data.

use crate::classifier::ClassificationReport;
use crate::organizer::{FolderListing, MoveFailureKind, OrganizeReport};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a green checkmark line.
    ///
    /// # Arguments
    ///
    /// * `message` - What completed
    ///
    /// # Example
    ///
    /// ```no_run
    /// use extsort::output::OutputFormatter;
    /// OutputFormatter::success("Moved 4 files");
    /// ```
    pub fn success(message: &str) {
        Self::mark("✓".green(), message);
    }

    /// Prints a red cross line on stderr, so errors survive `--json` piping.
    ///
    /// # Arguments
    ///
    /// * `message` - The error text, usually an `OrganizeError` rendered with `to_string()`
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a yellow warning line, used for skipped entries and partial runs.
    pub fn warning(message: &str) {
        Self::mark("⚠".yellow(), message);
    }

    /// Prints a cyan line, used for report headings that name the directory.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a bold section title preceded by a blank line.
    ///
    /// # Arguments
    ///
    /// * `title` - Section name, e.g. `FILE TYPES`
    pub fn header(title: &str) {
        println!("\n{}", title.bold());
    }

    /// Prints one planned move of a dry run.
    pub fn dry_run_notice(message: &str) {
        println!("{} {}", "[DRY RUN]".yellow(), message);
    }

    /// Writes an interactive question to stderr without a newline.
    ///
    /// Questions never go to stdout, which stays reserved for reports.
    pub fn prompt(question: &str) -> std::io::Result<()> {
        let mut stderr = std::io::stderr();
        write!(stderr, "{} (y/N): ", question.bold())?;
        stderr.flush()
    }

    fn mark(symbol: ColoredString, message: &str) {
        println!("{} {}", symbol, message);
    }

    /// Creates a progress bar for the move loop.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use extsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a two-column table of `(label, count)` rows with a total line.
    ///
    /// Rows are printed in the order given.
    pub fn summary_table(title: &str, column: &str, rows: &[(String, usize)], total: usize) {
        Self::header(title);

        let width = rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0)
            .max(column.len())
            .max(5);

        println!(
            "{:<width$} | {}",
            column.bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));

        for (label, count) in rows {
            println!(
                "{:<width$} | {} {}",
                label,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = width
        );
    }

    /// Renders a classification report: counts per extension, then the
    /// preview of each group.
    pub fn analysis(report: &ClassificationReport) {
        Self::info(&format!(
            "Analysis of {} ({})",
            report.directory().display(),
            report.scanned_at().format("%Y-%m-%d %H:%M:%S UTC")
        ));

        for warning in report.warnings() {
            Self::warning(&format!(
                "Skipped {}: {}",
                warning.path.display(),
                warning.message
            ));
        }

        if report.is_empty() {
            Self::plain("No files found in the directory.");
            return;
        }

        let rows: Vec<(String, usize)> = report
            .groups()
            .map(|(key, names)| (key.label().to_string(), names.len()))
            .collect();
        Self::summary_table("FILE TYPES", "Extension", &rows, report.total());

        Self::header("FILES BY TYPE");
        for (key, _) in report.groups() {
            let Some(preview) = report.preview(key) else {
                continue;
            };
            println!("\n{}:", key.label().bold());
            for name in preview.names {
                println!("  - {}", name);
            }
            if preview.remaining > 0 {
                println!("  ... and {} more {}", preview.remaining, plural(preview.remaining));
            }
        }
    }

    /// Prints the folder each group would be moved into.
    pub fn plan(report: &ClassificationReport) {
        Self::header("PLANNED MOVES");
        for (key, names) in report.groups() {
            Self::dry_run_notice(&format!(
                "{} {} {} → {}/",
                names.len(),
                key.label(),
                plural(names.len()),
                key.folder_name()
            ));
        }
    }

    /// Renders the outcome of an organize run.
    pub fn organize_report(report: &OrganizeReport) {
        Self::info(&format!("Organized {}", report.directory.display()));

        for group in &report.groups {
            if let Some(reason) = &group.create_error {
                Self::error(&format!(
                    "Could not create {}/: {}. {} files were left in place.",
                    group.folder,
                    reason,
                    group.key.label()
                ));
                continue;
            }

            if group.created {
                Self::plain(&format!("Created directory: {}/", group.folder));
            }
            if group.moved > 0 {
                Self::success(&format!(
                    "Moved {} {} {} to {}/",
                    group.moved,
                    group.key.label(),
                    plural(group.moved),
                    group.folder
                ));
            }
            for name in &group.skipped {
                Self::plain(&format!("  skipped {} (no longer present)", name));
            }
            for failure in &group.failures {
                let label = match failure.kind {
                    MoveFailureKind::Conflict => "Conflict",
                    MoveFailureKind::Io => "Error",
                };
                Self::error(&format!(
                    "{} moving {}: {}",
                    label, failure.file_name, failure.message
                ));
            }
        }

        println!();
        if report.is_complete_success() {
            Self::success(&format!(
                "Organization complete! Moved {} {} total.",
                report.total_moved,
                plural(report.total_moved)
            ));
        } else {
            Self::warning(&format!(
                "Moved {} {}; {} could not be moved. Review the errors above.",
                report.total_moved,
                plural(report.total_moved),
                report.total_failures()
            ));
        }
    }

    /// Renders the post-organize folder listing. Folders that could not be
    /// read are left out of the table and reported as warnings.
    pub fn folders(listing: &FolderListing) {
        let rows: Vec<(String, usize)> = listing
            .folders
            .iter()
            .filter_map(|f| f.file_count.map(|count| (format!("{}/", f.name), count)))
            .collect();
        let total = rows.iter().map(|(_, count)| count).sum();
        Self::summary_table("DIRECTORY STRUCTURE", "Folder", &rows, total);

        for warning in &listing.warnings {
            Self::warning(&format!(
                "Could not read {}: {}",
                warning.path.display(),
                warning.message
            ));
        }
    }
}

/// Picks the singular or plural form of a noun for `count`.
pub(crate) fn noun(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

fn plural(count: usize) -> &'static str {
    noun(count, "file", "files")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(0), "files");
        assert_eq!(plural(1), "file");
        assert_eq!(plural(2), "files");
        assert_eq!(noun(1, "folder", "folders"), "folder");
        assert_eq!(noun(3, "folder", "folders"), "folders");
    }

    #[test]
    fn test_progress_bar_length() {
        let pb = OutputFormatter::create_progress_bar(7);
        assert_eq!(pb.length(), Some(7));
        pb.finish_and_clear();
    }
}
