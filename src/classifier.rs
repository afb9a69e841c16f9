/// Directory classification by file extension.
///
/// This module scans a single directory (non-recursive) and partitions its
/// regular files into extension groups. Scanning never touches the file
/// system beyond reading it, so it is safe to repeat as often as needed.
///
/// Entries that cannot be inspected do not fail the scan. They are skipped
/// and reported as [`EntryWarning`]s on the returned report.
use crate::error::{OrganizeError, OrganizeResult};
use crate::extension::ExtensionKey;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Number of names shown per group before the rest is summarized.
pub const PREVIEW_LIMIT: usize = 10;

/// A directory entry that was skipped during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryWarning {
    /// Path of the offending entry (the scanned directory if unknown).
    pub path: PathBuf,
    /// Why the entry was skipped.
    pub message: String,
}

/// The first names of a group, in sorted order, and how many were left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview<'a> {
    pub names: &'a [String],
    pub remaining: usize,
}

/// Read-only snapshot of a directory's files partitioned by extension.
///
/// Groups iterate in key order and each group's names are sorted, so two
/// scans of unchanged contents produce identical reports apart from the
/// timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    directory: PathBuf,
    scanned_at: DateTime<Utc>,
    total: usize,
    groups: BTreeMap<ExtensionKey, Vec<String>>,
    warnings: Vec<EntryWarning>,
}

impl ClassificationReport {
    /// Canonical path of the scanned directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// When the scan was taken.
    pub fn scanned_at(&self) -> DateTime<Utc> {
        self.scanned_at
    }

    /// Number of classified files across all groups.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct extension keys, which is also the number of
    /// folders an organize run would use.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// True when the scan found no regular files.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Entries skipped during the scan.
    pub fn warnings(&self) -> &[EntryWarning] {
        &self.warnings
    }

    /// Iterates groups in key order, each with its sorted file names.
    pub fn groups(&self) -> impl Iterator<Item = (&ExtensionKey, &[String])> {
        self.groups.iter().map(|(key, names)| (key, names.as_slice()))
    }

    /// Sorted file names of one group.
    pub fn files(&self, key: &ExtensionKey) -> Option<&[String]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Up to [`PREVIEW_LIMIT`] sorted names of one group.
    pub fn preview(&self, key: &ExtensionKey) -> Option<Preview<'_>> {
        self.files(key).map(preview_of)
    }
}

fn preview_of(names: &[String]) -> Preview<'_> {
    let shown = names.len().min(PREVIEW_LIMIT);
    Preview {
        names: &names[..shown],
        remaining: names.len() - shown,
    }
}

/// Checks that `path` is an existing directory and returns its canonical form.
pub(crate) fn resolve_directory(path: &Path) -> OrganizeResult<PathBuf> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => OrganizeError::DirectoryNotFound {
            path: path.to_path_buf(),
        },
        _ => OrganizeError::DirectoryUnreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(OrganizeError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    fs::canonicalize(path).map_err(|e| OrganizeError::DirectoryUnreadable {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Classifies the regular files directly inside `directory`.
///
/// Symlinks are followed: a link to a file counts as a file, a link to a
/// directory is ignored. Subdirectories are never entered.
///
/// # Errors
///
/// Returns `DirectoryNotFound`, `NotADirectory` or `DirectoryUnreadable`
/// when the directory itself cannot be scanned. Problems with individual
/// entries are collected as warnings instead.
///
/// # Examples
///
/// ```no_run
/// use extsort::classifier::classify;
/// use std::path::Path;
///
/// let report = classify(Path::new("/home/user/Downloads")).unwrap();
/// for (key, names) in report.groups() {
///     println!("{}: {} files", key, names.len());
/// }
/// ```
pub fn classify(directory: &Path) -> OrganizeResult<ClassificationReport> {
    let root = resolve_directory(directory)?;
    debug!(directory = %root.display(), "scanning directory");

    let entries = fs::read_dir(&root).map_err(|e| OrganizeError::DirectoryUnreadable {
        path: root.clone(),
        source: e,
    })?;

    let mut groups: BTreeMap<ExtensionKey, Vec<String>> = BTreeMap::new();
    let mut warnings = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warnings.push(skip(root.clone(), e.to_string()));
                continue;
            }
        };

        match is_regular_file(&entry) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warnings.push(skip(entry.path(), e.to_string()));
                continue;
            }
        }

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => {
                warnings.push(skip(entry.path(), "file name is not valid UTF-8".to_string()));
                continue;
            }
        };

        groups
            .entry(ExtensionKey::from_file_name(&name))
            .or_default()
            .push(name);
    }

    for names in groups.values_mut() {
        names.sort();
    }
    let total = groups.values().map(Vec::len).sum();

    debug!(
        total,
        groups = groups.len(),
        warnings = warnings.len(),
        "scan complete"
    );

    Ok(ClassificationReport {
        directory: root,
        scanned_at: Utc::now(),
        total,
        groups,
        warnings,
    })
}

fn is_regular_file(entry: &DirEntry) -> io::Result<bool> {
    let file_type = entry.file_type()?;
    if file_type.is_symlink() {
        Ok(fs::metadata(entry.path())?.is_file())
    } else {
        Ok(file_type.is_file())
    }
}

fn skip(path: PathBuf, message: String) -> EntryWarning {
    warn!(path = %path.display(), %message, "skipping unreadable entry");
    EntryWarning { path, message }
}
