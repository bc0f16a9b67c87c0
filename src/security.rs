//! Owner-only permissions for the store directory and its documents

use crate::error::Result;
use std::path::Path;

/// Mode for owner-only documents (Unix)
pub const FILE_MODE: u32 = 0o600;

/// Mode for the owner-only store directory (Unix)
pub const DIR_MODE: u32 = 0o700;

/// Restrict a directory to its owner (Unix: 0o700)
///
/// # Errors
///
/// * `Error::FileRead` - If the directory metadata cannot be read
/// * `Error::FileWrite` - If the permissions cannot be changed
#[cfg(unix)]
pub fn restrict_dir(path: &Path) -> Result<()> {
    set_mode(path, DIR_MODE)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use crate::error::Error;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .permissions();
    perms.set_mode(mode);

    fs::set_permissions(path, perms).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// No-op on Windows (permissions managed via ACLs)
#[cfg(not(unix))]
pub fn restrict_dir(_path: &Path) -> Result<()> {
    Ok(())
}

/// Create a directory (and parents), optionally restricting it to its owner
///
/// # Errors
///
/// * `Error::DirectoryCreate` - If the directory cannot be created
/// * `Error::FileWrite` - If `restrict` is set and permissions cannot be changed
pub fn ensure_dir(path: &Path, restrict: bool) -> Result<()> {
    crate::error::create_dir(path)?;

    if restrict {
        restrict_dir(path)?;
    }

    Ok(())
}
