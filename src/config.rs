//! Store configuration

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::storage::{JsonStorage, StorageBackend};

/// Name of the directory used when no base directory is configured
pub const DEFAULT_DATA_DIR: &str = "Data";

/// Configuration for a [`FileStore`](crate::FileStore)
#[derive(Clone, Debug)]
pub struct StoreConfig<S: StorageBackend = JsonStorage> {
    /// Directory holding one file per document.
    /// `None` resolves to `Data` next to the running executable.
    pub base_dir: Option<PathBuf>,

    /// Document encoding
    pub storage: S,

    /// Write through a `.tmp` file and rename it over the target.
    /// Default: false (single in-place write)
    pub atomic_writes: bool,

    /// Restrict the base directory and documents to their owner (Unix only)
    pub secure_permissions: bool,
}

impl Default for StoreConfig<JsonStorage> {
    fn default() -> Self {
        Self {
            base_dir: None,
            storage: JsonStorage::new(),
            atomic_writes: false,
            secure_permissions: false,
        }
    }
}

impl StoreConfig<JsonStorage> {
    /// Create a new builder for StoreConfig
    ///
    /// # Example
    /// ```rust
    /// use docstore::StoreConfig;
    ///
    /// let config = StoreConfig::builder()
    ///     .base_dir("~/.local/share/my-app")
    ///     .atomic_writes(true)
    ///     .build();
    /// ```
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::new()
    }
}

impl<S: StorageBackend> StoreConfig<S> {
    /// Swap the document encoding, keeping every other option
    pub fn with_storage<S2: StorageBackend>(self, storage: S2) -> StoreConfig<S2> {
        StoreConfig {
            base_dir: self.base_dir,
            storage,
            atomic_writes: self.atomic_writes,
            secure_permissions: self.secure_permissions,
        }
    }

    /// Resolve the directory documents live in.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no base directory is set and the location
    /// of the running executable cannot be determined.
    pub fn resolve_base_dir(&self) -> Result<PathBuf> {
        match &self.base_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_base_dir(),
        }
    }
}

/// `Data` under the directory holding the running executable
///
/// # Errors
///
/// Returns `Error::Config` if the executable path cannot be determined.
pub fn default_base_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()
        .map_err(|e| Error::Config(format!("Cannot locate running executable: {e}")))?;
    let install_dir = exe.parent().ok_or_else(|| {
        Error::Config(format!(
            "Executable path '{}' has no parent directory",
            exe.display()
        ))
    })?;
    Ok(install_dir.join(DEFAULT_DATA_DIR))
}

/// Expand a leading `~` to the home directory
fn expand_home(path: PathBuf) -> PathBuf {
    if !path.starts_with("~") {
        return path;
    }
    match dirs::home_dir() {
        Some(home) => home.join(path.strip_prefix("~").unwrap_or(&path)),
        None => path,
    }
}

/// Treat blank (empty or whitespace-only) paths as unset
fn non_blank(path: &Path) -> bool {
    !path.as_os_str().to_string_lossy().trim().is_empty()
}

/// Builder for creating StoreConfig with a fluent API
#[derive(Clone, Debug)]
pub struct StoreConfigBuilder {
    base_dir: Option<PathBuf>,
    pretty_json: bool,
    atomic_writes: bool,
    secure_permissions: bool,
}

impl Default for StoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreConfigBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self {
            base_dir: None,
            pretty_json: true,
            atomic_writes: false,
            secure_permissions: false,
        }
    }

    /// Set the base directory
    ///
    /// Supports `~` expansion for home directory. A blank path leaves the
    /// default in place.
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        self.base_dir = non_blank(&path).then(|| expand_home(path));
        self
    }

    /// Use compact JSON (no pretty printing)
    pub fn compact_json(mut self) -> Self {
        self.pretty_json = false;
        self
    }

    /// Write documents through a temp file and rename
    pub fn atomic_writes(mut self, enabled: bool) -> Self {
        self.atomic_writes = enabled;
        self
    }

    /// Restrict the store directory and documents to their owner (Unix only)
    pub fn secure_permissions(mut self, enabled: bool) -> Self {
        self.secure_permissions = enabled;
        self
    }

    /// Build the StoreConfig
    pub fn build(self) -> StoreConfig<JsonStorage> {
        let storage = if self.pretty_json {
            JsonStorage::new()
        } else {
            JsonStorage::compact()
        };

        StoreConfig {
            base_dir: self.base_dir,
            storage,
            atomic_writes: self.atomic_writes,
            secure_permissions: self.secure_permissions,
        }
    }
}
