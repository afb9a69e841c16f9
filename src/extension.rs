/// Extension keys and destination folder naming.
///
/// Every regular file maps to exactly one [`ExtensionKey`]: its lowercased
/// extension (leading dot included) or the [`ExtensionKey::None`] sentinel.
/// The key also decides the name of the subdirectory the file is moved into.
///
/// # Examples
///
/// ```
/// use extsort::extension::ExtensionKey;
///
/// let key = ExtensionKey::from_file_name("Report.PDF");
/// assert_eq!(key.to_string(), ".pdf");
/// assert_eq!(key.folder_name(), "PDF_Files");
/// assert_eq!(ExtensionKey::from_file_name("README"), ExtensionKey::None);
/// ```
use serde::{Serialize, Serializer};
use std::fmt;

/// Display label of the no-extension sentinel.
pub const NO_EXTENSION: &str = "NO_EXTENSION";

/// Folder that receives files without an extension.
pub const NO_EXTENSION_FOLDER: &str = "No_Extension";

/// Suffix appended to the uppercased extension to form a folder name.
pub const FOLDER_SUFFIX: &str = "_Files";

/// Normalized grouping key for a file.
///
/// Keys compare by extension text. `None` sorts after every real extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtensionKey {
    /// A lowercase extension including its leading dot, e.g. `.txt`.
    Ext(String),
    /// The file has no usable extension.
    None,
}

impl ExtensionKey {
    /// Derives the key for a bare file name.
    ///
    /// The extension is the text after the last dot. Leading dots belong to
    /// the name, so `.bashrc` has no extension while `.config.json` is `.json`.
    /// A trailing dot (`notes.`) yields no extension either.
    ///
    /// # Examples
    ///
    /// ```
    /// use extsort::extension::ExtensionKey;
    ///
    /// assert_eq!(ExtensionKey::from_file_name("a.TXT"), ExtensionKey::from_file_name("b.txt"));
    /// assert_eq!(ExtensionKey::from_file_name(".bashrc"), ExtensionKey::None);
    /// assert_eq!(ExtensionKey::from_file_name("archive.tar.gz").to_string(), ".gz");
    /// ```
    pub fn from_file_name(file_name: &str) -> Self {
        let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
        let rest = &file_name[stem_start..];

        match rest.rfind('.') {
            Some(dot) if dot + 1 < rest.len() => {
                ExtensionKey::Ext(rest[dot..].to_lowercase())
            }
            _ => ExtensionKey::None,
        }
    }

    /// Returns the destination folder name for files with this key.
    ///
    /// # Examples
    ///
    /// ```
    /// use extsort::extension::ExtensionKey;
    ///
    /// assert_eq!(ExtensionKey::Ext(".txt".into()).folder_name(), "TXT_Files");
    /// assert_eq!(ExtensionKey::None.folder_name(), "No_Extension");
    /// ```
    pub fn folder_name(&self) -> String {
        match self {
            ExtensionKey::Ext(ext) => {
                let bare = ext.strip_prefix('.').unwrap_or(ext);
                format!("{}{}", bare.to_uppercase(), FOLDER_SUFFIX)
            }
            ExtensionKey::None => NO_EXTENSION_FOLDER.to_string(),
        }
    }

    /// Human-readable label, `(no extension)` for the sentinel.
    pub fn label(&self) -> &str {
        match self {
            ExtensionKey::Ext(ext) => ext,
            ExtensionKey::None => "(no extension)",
        }
    }
}

impl fmt::Display for ExtensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionKey::Ext(ext) => f.write_str(ext),
            ExtensionKey::None => f.write_str(NO_EXTENSION),
        }
    }
}

// Serialized as its display string so it can key a JSON object.
impl Serialize for ExtensionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
