//! Storage backend trait and implementations

use crate::error::{self, Error, Result};
#[cfg(unix)]
use crate::security;
use log::trace;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Trait for document encodings
///
/// Encodes a value to text and back. Files are written with
/// [`write_document`], whichever encoding produced the text.
pub trait StorageBackend: Clone + Send + Sync {
    /// Serialize data to string
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String>;

    /// Deserialize data from string
    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> serde_json::Result<T>;

    /// Whether serialized text stands for an absent value
    fn is_null(&self, content: &str) -> bool {
        content.trim() == "null"
    }

    /// Read and deserialize from file
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = error::read_file(path)?;
        self.deserialize(&content).map_err(|e| Error::Deserialize {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// =============================================================================
// Writing Documents
// =============================================================================

/// How a document is put on disk
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Write a temp file beside the target and rename it over the target
    pub atomic: bool,

    /// Create the file readable and writable by its owner only (Unix)
    pub owner_only: bool,
}

/// Replace the whole content of `path` with `content`.
///
/// The parent directory must already exist. Without `atomic` the file is
/// truncated and rewritten in place, so a crash mid-write can leave a
/// truncated file behind. With `atomic` the content goes to a uniquely
/// named temp file that is renamed over `path`; the temp file is created
/// exclusively and never replaces another document.
///
/// # Errors
///
/// Returns `Error::FileWrite` if the file cannot be created, written or
/// renamed into place.
pub fn write_document(path: &Path, content: &str, options: WriteOptions) -> Result<()> {
    if options.atomic {
        write_atomic(path, content, options.owner_only)
    } else {
        write_in_place(path, content, options.owner_only)
    }
}

fn write_in_place(path: &Path, content: &str, owner_only: bool) -> Result<()> {
    let to_error = |e: std::io::Error| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = open_document(path, owner_only).map_err(to_error)?;
    file.write_all(content.as_bytes()).map_err(to_error)
}

fn write_atomic(path: &Path, content: &str, owner_only: bool) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = temp_document(dir, owner_only).map_err(|e| Error::FileWrite {
        path: dir.to_path_buf(),
        source: e,
    })?;
    trace!("Writing {} via {}", path.display(), temp.path().display());

    temp.write_all(content.as_bytes())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| Error::FileWrite {
            path: temp.path().to_path_buf(),
            source: e,
        })?;

    temp.persist(path).map(drop).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e.error,
    })
}

/// Open `path` for overwriting. With `owner_only` a new file is created as
/// 0o600 and an existing one is narrowed to 0o600 before content is written.
fn open_document(path: &Path, owner_only: bool) -> std::io::Result<File> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    if owner_only {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(security::FILE_MODE);
    }

    let file = options.open(path)?;

    #[cfg(unix)]
    if owner_only {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(security::FILE_MODE))?;
    }
    #[cfg(not(unix))]
    let _ = owner_only;

    Ok(file)
}

/// Exclusively created temp file in `dir`, named so that no sanitized id
/// collides with it by accident.
fn temp_document(dir: &Path, owner_only: bool) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".docstore-").suffix(".tmp");

    // The mode is applied at creation, under the process umask
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = if owner_only { security::FILE_MODE } else { 0o666 };
        builder.permissions(std::fs::Permissions::from_mode(mode));
    }
    #[cfg(not(unix))]
    let _ = owner_only;

    builder.tempfile_in(dir)
}

// =============================================================================
// JSON Storage Implementation
// =============================================================================

/// JSON storage backend (default)
///
/// Reads match struct fields case-insensitively, see [`crate::de`].
#[derive(Clone, Debug)]
pub struct JsonStorage {
    /// Pretty print JSON output
    pretty: bool,
}

impl Default for JsonStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonStorage {
    /// Create a new JSON storage backend with pretty printing enabled
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a compact JSON storage (no pretty printing)
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Whether output is indented
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl StorageBackend for JsonStorage {
    fn serialize<T: Serialize>(&self, data: &T) -> Result<String> {
        if self.pretty {
            serde_json::to_string_pretty(data).map_err(Error::from)
        } else {
            serde_json::to_string(data).map_err(Error::from)
        }
    }

    fn deserialize<T: DeserializeOwned>(&self, content: &str) -> serde_json::Result<T> {
        crate::de::from_str(content)
    }
}

// =============================================================================
// Tests
// =============================================================================
