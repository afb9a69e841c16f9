/// Moving classified files into per-extension folders.
///
/// This module consumes a [`ClassificationReport`] and relocates every file
/// it lists into the folder named after the file's extension key. Problems
/// with one file or one folder never abort the run; they are recorded on the
/// returned [`OrganizeReport`] and the batch continues. Nothing is rolled
/// back, so a partially organized directory is a valid end state.
use crate::classifier::{ClassificationReport, EntryWarning, resolve_directory};
use crate::error::{OrganizeError, OrganizeResult};
use crate::extension::ExtensionKey;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Explicit go-ahead from the caller. Organize never prompts on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(yes: bool) -> Self {
        if yes {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

/// Why a single file was not moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveFailureKind {
    /// Something already occupies the destination path.
    Conflict,
    /// The move itself failed.
    Io,
}

/// A file that stayed in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveFailure {
    pub file_name: String,
    pub kind: MoveFailureKind,
    pub message: String,
}

/// Result of processing one extension group.
#[derive(Debug, Clone, Serialize)]
pub struct GroupOutcome {
    pub key: ExtensionKey,
    /// Destination folder name, relative to the organized directory.
    pub folder: String,
    /// True if the folder did not exist before this run.
    pub created: bool,
    pub moved: usize,
    /// Files that were no longer present when their turn came.
    pub skipped: Vec<String>,
    pub failures: Vec<MoveFailure>,
    /// Set when the destination folder could not be created; no file of
    /// the group was attempted in that case.
    pub create_error: Option<String>,
}

impl GroupOutcome {
    fn new(key: ExtensionKey) -> Self {
        let folder = key.folder_name();
        Self {
            key,
            folder,
            created: false,
            moved: 0,
            skipped: Vec::new(),
            failures: Vec::new(),
            create_error: None,
        }
    }
}

/// Outcome of one organize run.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizeReport {
    pub directory: PathBuf,
    pub groups: Vec<GroupOutcome>,
    pub total_moved: usize,
}

impl OrganizeReport {
    fn new(directory: PathBuf) -> Self {
        Self {
            directory,
            groups: Vec::new(),
            total_moved: 0,
        }
    }

    /// Number of files that could not be moved.
    pub fn total_failures(&self) -> usize {
        self.groups.iter().map(|g| g.failures.len()).sum()
    }

    /// Number of files that vanished between classify and organize.
    pub fn total_skipped(&self) -> usize {
        self.groups.iter().map(|g| g.skipped.len()).sum()
    }

    /// Groups abandoned because their folder could not be created.
    pub fn failed_groups(&self) -> impl Iterator<Item = &GroupOutcome> {
        self.groups.iter().filter(|g| g.create_error.is_some())
    }

    /// True if every file was either moved or legitimately skipped.
    pub fn is_complete_success(&self) -> bool {
        self.total_failures() == 0 && self.failed_groups().next().is_none()
    }
}

/// What happened to one file, reported to an organize observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveEvent<'a> {
    Moved(&'a str),
    Skipped(&'a str),
    Failed(&'a str),
}

/// A subdirectory and the number of regular files it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderSummary {
    pub name: String,
    /// `None` when the folder could not be listed.
    pub file_count: Option<usize>,
}

/// Subdirectories of an organized directory, plus whatever could not be read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderListing {
    pub folders: Vec<FolderSummary>,
    pub warnings: Vec<EntryWarning>,
}

/// Organizes `directory` according to `report`.
///
/// The report is consumed: a fresh [`classify`](crate::classifier::classify)
/// is needed before organizing again.
///
/// # Errors
///
/// * `NotConfirmed` if `confirmation` is [`Confirmation::Declined`]
/// * `DirectoryNotFound` / `NotADirectory` / `DirectoryUnreadable` for the target
/// * `StaleReport` if the report was produced for another directory
///
/// # Examples
///
/// ```no_run
/// use extsort::classifier::classify;
/// use extsort::organizer::{organize, Confirmation};
/// use std::path::Path;
///
/// let dir = Path::new("/home/user/Downloads");
/// let report = classify(dir).unwrap();
/// let outcome = organize(dir, report, Confirmation::Confirmed).unwrap();
/// println!("Moved {} files", outcome.total_moved);
/// ```
pub fn organize(
    directory: &Path,
    report: ClassificationReport,
    confirmation: Confirmation,
) -> OrganizeResult<OrganizeReport> {
    organize_with_observer(directory, report, confirmation, |_| {})
}

/// Same as [`organize`], calling `observer` once per processed file.
pub fn organize_with_observer<F>(
    directory: &Path,
    report: ClassificationReport,
    confirmation: Confirmation,
    mut observer: F,
) -> OrganizeResult<OrganizeReport>
where
    F: FnMut(MoveEvent<'_>),
{
    if confirmation == Confirmation::Declined {
        return Err(OrganizeError::NotConfirmed);
    }

    let root = resolve_directory(directory)?;
    if report.directory() != root {
        return Err(OrganizeError::StaleReport {
            report_path: report.directory().to_path_buf(),
            target_path: root,
        });
    }

    info!(directory = %root.display(), files = report.total(), "organizing");
    let mut outcome = OrganizeReport::new(root);

    for (key, names) in report.groups() {
        let group = organize_group(&outcome.directory, key, names, &mut observer);
        outcome.total_moved += group.moved;
        outcome.groups.push(group);
    }

    info!(
        moved = outcome.total_moved,
        failures = outcome.total_failures(),
        "organize complete"
    );
    Ok(outcome)
}

fn organize_group<F>(
    root: &Path,
    key: &ExtensionKey,
    names: &[String],
    observer: &mut F,
) -> GroupOutcome
where
    F: FnMut(MoveEvent<'_>),
{
    let mut group = GroupOutcome::new(key.clone());
    let folder_path = root.join(&group.folder);

    match ensure_folder(&folder_path) {
        Ok(created) => {
            if created {
                debug!(folder = %folder_path.display(), "created folder");
            }
            group.created = created;
        }
        Err(e) => {
            warn!(folder = %folder_path.display(), error = %e, "cannot create folder, skipping group");
            group.create_error = Some(e.to_string());
            for name in names {
                observer(MoveEvent::Failed(name));
            }
            return group;
        }
    }

    for name in names {
        let source = root.join(name);
        let destination = folder_path.join(name);

        match move_file(&source, &destination) {
            Ok(MoveStatus::Moved) => {
                group.moved += 1;
                observer(MoveEvent::Moved(name));
            }
            Ok(MoveStatus::Skipped) => {
                debug!(file = %name, "source gone or already in place");
                group.skipped.push(name.clone());
                observer(MoveEvent::Skipped(name));
            }
            Err((kind, message)) => {
                warn!(file = %name, %message, "move failed");
                group.failures.push(MoveFailure {
                    file_name: name.clone(),
                    kind,
                    message,
                });
                observer(MoveEvent::Failed(name));
            }
        }
    }

    group
}

/// Creates `path` as a directory unless one is already there.
/// Returns whether it was newly created.
fn ensure_folder(path: &Path) -> io::Result<bool> {
    match fs::create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            if fs::metadata(path)?.is_dir() {
                Ok(false)
            } else {
                Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} exists and is not a directory", path.display()),
                ))
            }
        }
        Err(e) => Err(e),
    }
}

enum MoveStatus {
    Moved,
    Skipped,
}

/// Moves `source` to `destination` without ever replacing an existing file.
///
/// The file is hard-linked into place first, which fails if the destination
/// is taken, and the source link is removed afterwards. Filesystems without
/// hard links fall back to a checked rename.
fn move_file(
    source: &Path,
    destination: &Path,
) -> Result<MoveStatus, (MoveFailureKind, String)> {
    match fs::symlink_metadata(source) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(MoveStatus::Skipped),
        Err(e) => return Err((MoveFailureKind::Io, e.to_string())),
    }

    match fs::hard_link(source, destination) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(source) {
                // Leave the file where it was rather than in both places.
                let _ = fs::remove_file(destination);
                return Err((MoveFailureKind::Io, e.to_string()));
            }
            Ok(MoveStatus::Moved)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(conflict(destination)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(MoveStatus::Skipped),
        Err(e) => {
            debug!(error = %e, "hard link unavailable, falling back to rename");
            rename_unless_taken(source, destination)
        }
    }
}

fn rename_unless_taken(
    source: &Path,
    destination: &Path,
) -> Result<MoveStatus, (MoveFailureKind, String)> {
    if fs::symlink_metadata(destination).is_ok() {
        return Err(conflict(destination));
    }

    fs::rename(source, destination)
        .map(|()| MoveStatus::Moved)
        .map_err(|e| (MoveFailureKind::Io, e.to_string()))
}

fn conflict(destination: &Path) -> (MoveFailureKind, String) {
    (
        MoveFailureKind::Conflict,
        format!("{} already exists", destination.display()),
    )
}

/// Lists the immediate subdirectories of `directory` with their file counts,
/// sorted by name.
///
/// Entries or folders that cannot be read are reported as warnings; an
/// unreadable folder is still listed, with an unknown file count.
pub fn list_folders(directory: &Path) -> OrganizeResult<FolderListing> {
    let root = resolve_directory(directory)?;
    let entries = fs::read_dir(&root).map_err(|e| OrganizeError::DirectoryUnreadable {
        path: root.clone(),
        source: e,
    })?;

    let mut listing = FolderListing::default();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                listing.warnings.push(listing_warning(root.clone(), e));
                continue;
            }
        };

        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => continue,
            Err(e) => {
                listing.warnings.push(listing_warning(path, e));
                continue;
            }
        }

        let file_count = match count_files(&path, &mut listing.warnings) {
            Ok(count) => Some(count),
            Err(e) => {
                listing.warnings.push(listing_warning(path.clone(), e));
                None
            }
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        listing.folders.push(FolderSummary { name, file_count });
    }

    listing.folders.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}

fn count_files(folder: &Path, warnings: &mut Vec<EntryWarning>) -> io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(folder)? {
        match entry.and_then(|e| fs::metadata(e.path())) {
            Ok(metadata) if metadata.is_file() => count += 1,
            Ok(_) => {}
            Err(e) => warnings.push(listing_warning(folder.to_path_buf(), e)),
        }
    }
    Ok(count)
}

fn listing_warning(path: PathBuf, error: io::Error) -> EntryWarning {
    warn!(path = %path.display(), %error, "cannot list entry");
    EntryWarning {
        path,
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use tempfile::TempDir;

    fn dir_with(files: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in files {
            fs::write(temp_dir.path().join(name), name).expect("Failed to write test file");
        }
        temp_dir
    }

    #[test]
    fn test_moves_files_into_extension_folders() {
        let temp_dir = dir_with(&["report.pdf", "notes.txt", "data.txt", "README"]);
        let base = temp_dir.path();
        let report = classify(base).unwrap();

        let outcome = organize(base, report, Confirmation::Confirmed).unwrap();

        assert_eq!(outcome.total_moved, 4);
        assert!(outcome.is_complete_success());
        assert!(base.join("PDF_Files/report.pdf").is_file());
        assert!(base.join("TXT_Files/notes.txt").is_file());
        assert!(base.join("TXT_Files/data.txt").is_file());
        assert!(base.join("No_Extension/README").is_file());
        assert!(!base.join("report.pdf").exists());
    }

    #[test]
    fn test_groups_processed_in_key_order() {
        let temp_dir = dir_with(&["b.txt", "a.csv", "noext"]);
        let report = classify(temp_dir.path()).unwrap();

        let outcome = organize(temp_dir.path(), report, Confirmation::Confirmed).unwrap();
        let folders: Vec<&str> = outcome.groups.iter().map(|g| g.folder.as_str()).collect();
        assert_eq!(folders, vec!["CSV_Files", "TXT_Files", "No_Extension"]);
        assert!(outcome.groups.iter().all(|g| g.created));
    }

    #[test]
    fn test_declined_confirmation_moves_nothing() {
        let temp_dir = dir_with(&["keep.txt"]);
        let report = classify(temp_dir.path()).unwrap();

        let err = organize(temp_dir.path(), report, Confirmation::Declined).unwrap_err();
        assert!(matches!(err, OrganizeError::NotConfirmed));
        assert!(temp_dir.path().join("keep.txt").is_file());
        assert!(!temp_dir.path().join("TXT_Files").exists());
    }

    #[test]
    fn test_report_from_other_directory_is_stale() {
        let first = dir_with(&["a.txt"]);
        let second = dir_with(&["b.txt"]);
        let report = classify(first.path()).unwrap();

        let err = organize(second.path(), report, Confirmation::Confirmed).unwrap_err();
        assert!(matches!(err, OrganizeError::StaleReport { .. }));
        assert!(second.path().join("b.txt").is_file());
    }

    #[test]
    fn test_empty_report_is_noop() {
        let temp_dir = dir_with(&[]);
        let report = classify(temp_dir.path()).unwrap();

        let outcome = organize(temp_dir.path(), report, Confirmation::Confirmed).unwrap();
        assert_eq!(outcome.total_moved, 0);
        assert!(outcome.groups.is_empty());
    }

    #[test]
    fn test_missing_source_is_skipped() {
        let temp_dir = dir_with(&["gone.txt", "stay.txt"]);
        let report = classify(temp_dir.path()).unwrap();
        fs::remove_file(temp_dir.path().join("gone.txt")).unwrap();

        let outcome = organize(temp_dir.path(), report, Confirmation::Confirmed).unwrap();
        assert_eq!(outcome.total_moved, 1);
        assert_eq!(outcome.groups[0].skipped, vec!["gone.txt".to_string()]);
        assert!(outcome.groups[0].failures.is_empty());
        assert!(outcome.is_complete_success());
    }

    #[test]
    fn test_existing_destination_is_a_conflict() {
        let temp_dir = dir_with(&["notes.txt", "other.txt"]);
        fs::create_dir(temp_dir.path().join("TXT_Files")).unwrap();
        fs::write(temp_dir.path().join("TXT_Files/notes.txt"), "older").unwrap();
        let report = classify(temp_dir.path()).unwrap();

        let outcome = organize(temp_dir.path(), report, Confirmation::Confirmed).unwrap();
        let group = &outcome.groups[0];

        assert!(!group.created);
        assert_eq!(group.moved, 1);
        assert_eq!(group.failures.len(), 1);
        assert_eq!(group.failures[0].file_name, "notes.txt");
        assert_eq!(group.failures[0].kind, MoveFailureKind::Conflict);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("TXT_Files/notes.txt")).unwrap(),
            "older"
        );
        assert!(temp_dir.path().join("notes.txt").is_file());
    }

    #[test]
    fn test_folder_blocked_by_file_fails_only_that_group() {
        let temp_dir = dir_with(&["report.pdf", "PDF_Files", "song.mp3"]);
        let report = classify(temp_dir.path()).unwrap();

        let outcome = organize(temp_dir.path(), report, Confirmation::Confirmed).unwrap();

        let pdf = outcome.groups.iter().find(|g| g.folder == "PDF_Files").unwrap();
        assert!(pdf.create_error.is_some());
        assert_eq!(pdf.moved, 0);
        assert!(temp_dir.path().join("report.pdf").is_file());

        assert!(temp_dir.path().join("MP3_Files/song.mp3").is_file());
        assert!(temp_dir.path().join("No_Extension/PDF_Files").is_file());
        assert_eq!(outcome.total_moved, 2);
        assert!(!outcome.is_complete_success());
    }

    #[test]
    fn test_observer_sees_every_file() {
        let temp_dir = dir_with(&["a.txt", "b.txt", "c"]);
        let report = classify(temp_dir.path()).unwrap();
        fs::remove_file(temp_dir.path().join("b.txt")).unwrap();

        let mut events = Vec::new();
        organize_with_observer(temp_dir.path(), report, Confirmation::Confirmed, |event| {
            events.push(format!("{:?}", event));
        })
        .unwrap();

        assert_eq!(
            events,
            vec![
                "Moved(\"a.txt\")",
                "Skipped(\"b.txt\")",
                "Moved(\"c\")",
            ]
        );
    }

    #[test]
    fn test_list_folders_counts_files() {
        let temp_dir = dir_with(&["a.txt", "b.txt", "c.pdf", "loose"]);
        let report = classify(temp_dir.path()).unwrap();
        organize(temp_dir.path(), report, Confirmation::Confirmed).unwrap();

        let listing = list_folders(temp_dir.path()).unwrap();
        assert!(listing.warnings.is_empty());
        assert_eq!(
            listing.folders,
            vec![
                FolderSummary { name: "No_Extension".into(), file_count: Some(1) },
                FolderSummary { name: "PDF_Files".into(), file_count: Some(1) },
                FolderSummary { name: "TXT_Files".into(), file_count: Some(2) },
            ]
        );
    }

    #[test]
    fn test_move_file_never_replaces_destination() {
        let temp_dir = dir_with(&["new.txt", "old.txt"]);
        let source = temp_dir.path().join("new.txt");
        let destination = temp_dir.path().join("old.txt");

        let result = move_file(&source, &destination);

        assert!(matches!(result, Err((MoveFailureKind::Conflict, _))));
        assert_eq!(fs::read_to_string(&destination).unwrap(), "old.txt");
        assert_eq!(fs::read_to_string(&source).unwrap(), "new.txt");
    }

    #[test]
    fn test_move_file_removes_source() {
        let temp_dir = dir_with(&["a.txt"]);
        fs::create_dir(temp_dir.path().join("TXT_Files")).unwrap();
        let source = temp_dir.path().join("a.txt");
        let destination = temp_dir.path().join("TXT_Files/a.txt");

        assert!(matches!(move_file(&source, &destination), Ok(MoveStatus::Moved)));
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&destination).unwrap(), "a.txt");
    }

    /// Makes `path` read-only and reports whether that actually blocks
    /// writes (it does not for root).
    #[cfg(unix)]
    fn lock_down(path: &Path, mode: u32) -> bool {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
        let check = path.join(".write-check");
        if fs::write(&check, "x").is_ok() {
            let _ = fs::remove_file(&check);
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
            return false;
        }
        true
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_folder_records_io_failure() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = dir_with(&["a.txt", "b.md"]);
        let folder = temp_dir.path().join("TXT_Files");
        fs::create_dir(&folder).unwrap();
        if !lock_down(&folder, 0o555) {
            return;
        }

        let report = classify(temp_dir.path()).unwrap();
        let outcome = organize(temp_dir.path(), report, Confirmation::Confirmed).unwrap();
        fs::set_permissions(&folder, fs::Permissions::from_mode(0o755)).unwrap();

        let txt = outcome.groups.iter().find(|g| g.folder == "TXT_Files").unwrap();
        assert_eq!(txt.moved, 0);
        assert_eq!(txt.failures.len(), 1);
        assert_eq!(txt.failures[0].kind, MoveFailureKind::Io);
        assert!(temp_dir.path().join("a.txt").is_file());
        assert!(temp_dir.path().join("MD_Files/b.md").is_file());
        assert_eq!(outcome.total_moved, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_folder_is_listed_with_warning() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = dir_with(&[]);
        let locked = temp_dir.path().join("Locked");
        fs::create_dir(&locked).unwrap();
        fs::create_dir(temp_dir.path().join("Open")).unwrap();
        if !lock_down(&locked, 0o000) {
            return;
        }

        let listing = list_folders(temp_dir.path()).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(
            listing.folders,
            vec![
                FolderSummary { name: "Locked".into(), file_count: None },
                FolderSummary { name: "Open".into(), file_count: Some(0) },
            ]
        );
        assert_eq!(listing.warnings.len(), 1);
        assert!(listing.warnings[0].path.ends_with("Locked"));
    }

    #[test]
    fn test_confirmation_from_bool() {
        assert_eq!(Confirmation::from(true), Confirmation::Confirmed);
        assert_eq!(Confirmation::from(false), Confirmation::Declined);
    }
}
