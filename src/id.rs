//! Identifier sanitization
//!
//! Turns a caller-supplied document id into a bare filename that is safe to
//! join onto the store's base directory.
//!
//! The rooted-path and `..` checks run against the raw id, before any
//! directory components are stripped. Stripping only removes leading
//! components, so `a/../../b` must be rejected up front rather than reduced
//! to `b`.

use crate::error::{Error, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Extension appended to ids that do not carry one
pub const DEFAULT_EXTENSION: &str = "json";

// `C:`, `C:\foo`, `c:/foo`, `\\server\share`, `\foo`, `/foo`
static ROOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z]:|[/\\])").expect("static regex is valid"));

/// Check whether an id names an absolute or rooted path on any platform.
///
/// Drive-letter and backslash roots are rejected everywhere so that an id
/// accepted on Linux is also accepted on Windows and vice versa.
#[must_use]
pub fn is_rooted(id: &str) -> bool {
    let path = Path::new(id);
    path.is_absolute() || path.has_root() || ROOTED.is_match(id)
}

/// Check whether a filename already carries an extension.
///
/// A name has an extension when its last `.` is not the final character,
/// so `.env` and `report.txt` do, while `report` and `report.` do not.
#[must_use]
pub fn has_extension(file_name: &str) -> bool {
    match file_name.rfind('.') {
        Some(idx) => idx + 1 < file_name.len(),
        None => false,
    }
}

/// Reduce an id to the filename it is stored under.
///
/// # Errors
///
/// Returns [`Error::InvalidId`] when the id is blank, rooted, contains `..`,
/// or has no filename left once directory components are stripped.
pub fn sanitize_id(id: &str) -> Result<String> {
    if id.trim().is_empty() {
        return Err(Error::invalid_id(id, "id must be provided"));
    }

    if is_rooted(id) || id.contains("..") {
        return Err(Error::invalid_id(id, "path traversal is not allowed"));
    }

    let file_name = id.rsplit(['/', '\\']).next().unwrap_or_default();
    if file_name.trim().is_empty() {
        return Err(Error::invalid_id(id, "id is empty after sanitization"));
    }

    if has_extension(file_name) {
        Ok(file_name.to_string())
    } else {
        Ok(format!("{file_name}.{DEFAULT_EXTENSION}"))
    }
}

/// Resolve an id to the full path of its document under `base_dir`
///
/// # Errors
///
/// Same as [`sanitize_id`].
pub fn resolve_path(base_dir: &Path, id: &str) -> Result<PathBuf> {
    Ok(base_dir.join(sanitize_id(id)?))
}

// =============================================================================
// Tests
// =============================================================================
