//! Command-line interface module for extsort.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing with clap
//! - The analyze and organize workflows
//! - The interactive confirmation prompt
//! - JSON output of the reports

use crate::classifier::{ClassificationReport, classify};
use crate::organizer::{
    Confirmation, OrganizeReport, list_folders, organize_with_observer,
};
use crate::output::{OutputFormatter, noun};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "extsort")]
#[command(about = "Sort the files of a directory into per-extension folders", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show how the files of a directory group by extension
    Analyze {
        /// Directory to analyze
        directory: PathBuf,
    },
    /// Move files into per-extension folders
    Organize {
        /// Directory to organize
        directory: PathBuf,
        /// Show the planned folders without moving anything
        #[arg(long)]
        dry_run: bool,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// A command to run against one directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Classify and print the report.
    Analyze,
    /// Classify, confirm, then move.
    Organize {
        /// If true, only print the planned folders.
        dry_run: bool,
        /// If true, skip the confirmation prompt.
        assume_yes: bool,
    },
}

impl Commands {
    /// Splits parsed arguments into the command and its target directory.
    pub fn into_parts(self) -> (OrganizeCommand, PathBuf) {
        match self {
            Commands::Analyze { directory } => (OrganizeCommand::Analyze, directory),
            Commands::Organize {
                directory,
                dry_run,
                yes,
            } => (
                OrganizeCommand::Organize {
                    dry_run,
                    assume_yes: yes,
                },
                directory,
            ),
        }
    }
}

/// Runs a command against stdin and stdout.
///
/// # Examples
///
/// ```no_run
/// use extsort::cli::{run_cli, OrganizeCommand};
/// use std::path::Path;
///
/// if let Err(e) = run_cli(OrganizeCommand::Analyze, Path::new("/path/to/directory"), false) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(command: OrganizeCommand, dir_path: &Path, json: bool) -> Result<(), String> {
    let stdin = io::stdin();
    run_cli_with_io(command, dir_path, json, &mut stdin.lock(), &mut io::stdout())
}

/// Runs a command, reading any confirmation answer from `input`.
///
/// With `json` set, exactly one JSON document is written to `out` and
/// nothing else is; questions go to stderr. Text reports are printed
/// through [`OutputFormatter`].
pub fn run_cli_with_io<R: BufRead, W: Write>(
    command: OrganizeCommand,
    dir_path: &Path,
    json: bool,
    input: &mut R,
    out: &mut W,
) -> Result<(), String> {
    debug!(?command, directory = %dir_path.display(), "running command");
    let report = classify(dir_path).map_err(|e| e.to_string())?;

    let (dry_run, assume_yes) = match command {
        OrganizeCommand::Analyze => {
            if json {
                return write_json(out, &json!({ "classification": report }));
            }
            OutputFormatter::analysis(&report);
            return Ok(());
        }
        OrganizeCommand::Organize { dry_run, assume_yes } => (dry_run, assume_yes),
    };

    if !json {
        OutputFormatter::analysis(&report);
    }
    if report.is_empty() {
        if json {
            write_json(out, &json!({ "classification": report, "organize": null }))?;
        }
        return Ok(());
    }

    if dry_run {
        if json {
            write_json(out, &json!({ "classification": report, "dry_run": true }))?;
        } else {
            OutputFormatter::plan(&report);
            OutputFormatter::success("Dry run complete. No files were modified.");
        }
        return Ok(());
    }

    let confirmation = if assume_yes {
        Confirmation::Confirmed
    } else {
        let question = format!(
            "Move {} {} into {} {} under {}?",
            report.total(),
            noun(report.total(), "file", "files"),
            report.group_count(),
            noun(report.group_count(), "folder", "folders"),
            report.directory().display()
        );
        prompt_confirm(&question, input)
            .map(Confirmation::from)
            .map_err(|e| format!("Error reading confirmation: {}", e))?
    };

    if confirmation == Confirmation::Declined {
        if json {
            write_json(
                out,
                &json!({ "classification": report, "organize": null, "confirmed": false }),
            )?;
        } else {
            OutputFormatter::plain("Aborted. No files were moved.");
        }
        return Ok(());
    }

    let outcome = run_moves(dir_path, report, confirmation, json)?;
    let listing = list_folders(dir_path).map_err(|e| e.to_string())?;

    if json {
        write_json(
            out,
            &json!({ "organize": outcome, "folders": listing, "confirmed": true }),
        )?;
    } else {
        OutputFormatter::organize_report(&outcome);
        OutputFormatter::folders(&listing);
    }
    Ok(())
}

fn run_moves(
    dir_path: &Path,
    report: ClassificationReport,
    confirmation: Confirmation,
    quiet: bool,
) -> Result<OrganizeReport, String> {
    let progress = if quiet {
        None
    } else {
        Some(OutputFormatter::create_progress_bar(report.total() as u64))
    };

    let outcome = organize_with_observer(dir_path, report, confirmation, |_| {
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    })
    .map_err(|e| e.to_string())?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    Ok(outcome)
}

fn write_json<W: Write>(out: &mut W, value: &serde_json::Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("JSON serialization failed: {}", e))?;
    writeln!(out, "{}", text).map_err(|e| format!("Error writing output: {}", e))
}

/// Asks a yes/no question on stderr, defaulting to no on an empty answer or
/// end of input.
pub fn prompt_confirm<R: BufRead>(question: &str, input: &mut R) -> io::Result<bool> {
    let mut answer = String::new();

    loop {
        OutputFormatter::prompt(question)?;

        answer.clear();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }

        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "" | "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}
