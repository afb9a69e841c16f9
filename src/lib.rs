//! extsort - sort a directory's files into per-extension folders
//!
//! Work happens in two phases. [`classify`] scans one directory and returns a
//! read-only [`ClassificationReport`]; [`organize`] consumes that report and
//! moves each file into a folder named after its extension (`PDF_Files`,
//! `TXT_Files`, `No_Extension`, ...), returning an [`OrganizeReport`].

pub mod classifier;
pub mod cli;
pub mod error;
pub mod extension;
pub mod logging;
pub mod organizer;
pub mod output;

pub use classifier::{ClassificationReport, EntryWarning, Preview, classify};
pub use error::{OrganizeError, OrganizeResult};
pub use extension::ExtensionKey;
pub use organizer::{
    Confirmation, FolderListing, FolderSummary, GroupOutcome, MoveFailure, MoveFailureKind, OrganizeReport,
    list_folders, organize, organize_with_observer,
};

pub use cli::{OrganizeCommand, run_cli};
