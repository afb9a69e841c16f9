//! Operation-fatal errors.
//!
//! Failures local to one file or one extension group are not errors here:
//! they are recorded on the reports (`EntryWarning`, `GroupOutcome`,
//! `MoveFailure`) so a batch always runs to completion.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that abort a classify or organize call.
#[derive(Debug)]
pub enum OrganizeError {
    /// The target path does not exist.
    DirectoryNotFound { path: PathBuf },
    /// The target path exists but is not a directory.
    NotADirectory { path: PathBuf },
    /// The directory exists but could not be inspected or listed.
    DirectoryUnreadable { path: PathBuf, source: io::Error },
    /// The classification report was produced for another directory.
    StaleReport {
        report_path: PathBuf,
        target_path: PathBuf,
    },
    /// The caller did not confirm the organize run.
    NotConfirmed,
}

impl fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryNotFound { path } => {
                write!(f, "Directory not found: {}", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Not a directory: {}", path.display())
            }
            Self::DirectoryUnreadable { path, source } => {
                write!(f, "Cannot read directory {}: {}", path.display(), source)
            }
            Self::StaleReport {
                report_path,
                target_path,
            } => {
                write!(
                    f,
                    "Classification of {} cannot be used to organize {}; analyze the directory again",
                    report_path.display(),
                    target_path.display()
                )
            }
            Self::NotConfirmed => write!(f, "Organization was not confirmed"),
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DirectoryUnreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for classify and organize operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;
