use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::id;
use crate::security;
use crate::storage::{self, JsonStorage, StorageBackend, WriteOptions};
use crate::store::DataAccess;

use log::debug;
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// File-backed document store
///
/// Each document lives in its own file, `<base_dir>/<sanitized id>`, where
/// ids without an extension get `.json` appended. Nothing is cached: every
/// `get` reads the file and every `set` rewrites it completely.
///
/// Writers are not coordinated. Two `set` calls on the same id race at the
/// filesystem level and the last one wins.
///
/// # Example
///
/// ```rust,no_run
/// use docstore::{DataAccess, FileStore};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Score {
///     player: String,
///     points: u32,
/// }
///
/// let store = FileStore::<Score>::new("./scores")?;
/// store.set("alice", &Score { player: "alice".into(), points: 10 })?;
/// let score = store.get("alice")?; // reads ./scores/alice.json
/// # Ok::<(), docstore::Error>(())
/// ```
pub struct FileStore<T, S: StorageBackend = JsonStorage> {
    base_dir: PathBuf,
    storage: S,
    atomic_writes: bool,
    secure_permissions: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FileStore<T, JsonStorage> {
    /// Open a store rooted at `base_dir`, creating the directory if needed.
    ///
    /// A blank path falls back to [`FileStore::with_default_dir`].
    ///
    /// # Errors
    ///
    /// Returns `Error::DirectoryCreate` if the directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(StoreConfig::builder().base_dir(base_dir).build())
    }

    /// Open a store in `Data` next to the running executable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the executable cannot be located, or
    /// `Error::DirectoryCreate` if the directory cannot be created.
    pub fn with_default_dir() -> Result<Self> {
        Self::with_config(StoreConfig::default())
    }
}

impl<T, S: StorageBackend> FileStore<T, S> {
    /// Open a store from an explicit configuration.
    ///
    /// # Errors
    ///
    /// See [`FileStore::with_default_dir`].
    pub fn with_config(config: StoreConfig<S>) -> Result<Self> {
        let base_dir = config.resolve_base_dir()?;
        security::ensure_dir(&base_dir, config.secure_permissions)?;
        debug!("Document store opened at {}", base_dir.display());

        Ok(Self {
            base_dir,
            storage: config.storage,
            atomic_writes: config.atomic_writes,
            secure_permissions: config.secure_permissions,
            _marker: PhantomData,
        })
    }

    /// Directory holding the documents
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path the document for `id` is stored at. Performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidId` if `id` fails sanitization.
    pub fn path_for(&self, id: &str) -> Result<PathBuf> {
        id::resolve_path(&self.base_dir, id)
    }

    /// Check whether a document is stored under `id`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidId` if `id` fails sanitization.
    pub fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.path_for(id)?.is_file())
    }
}

impl<T, S> DataAccess<T> for FileStore<T, S>
where
    T: Serialize + DeserializeOwned,
    S: StorageBackend,
{
    fn get(&self, id: &str) -> Result<T> {
        let path = self.path_for(id)?;

        if !path.is_file() {
            return Err(Error::NotFound {
                id: id.to_string(),
                path,
            });
        }

        debug!("Reading document '{id}' from {}", path.display());
        self.storage.read(&path)
    }

    fn set(&self, id: &str, value: &T) -> Result<()> {
        let content = self.storage.serialize(value)?;
        if self.storage.is_null(&content) {
            return Err(Error::MissingValue);
        }
        let path = self.path_for(id)?;

        if let Some(parent) = path.parent() {
            if !parent.is_dir() {
                security::ensure_dir(parent, self.secure_permissions)?;
            }
        }

        debug!("Writing document '{id}' to {}", path.display());
        storage::write_document(
            &path,
            &content,
            WriteOptions {
                atomic: self.atomic_writes,
                owner_only: self.secure_permissions,
            },
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Note {
        title: String,
        body: String,
    }

    fn note(title: &str) -> Note {
        Note {
            title: title.into(),
            body: format!("body of {title}"),
        }
    }

    #[test]
    fn test_new_creates_base_dir() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("a/b/store");

        let store = FileStore::<Note>::new(&base).unwrap();

        assert!(base.is_dir());
        assert_eq!(store.base_dir(), base);
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempdir().unwrap();
        let store = FileStore::<Note>::new(dir.path()).unwrap();

        store.set("first", &note("first")).unwrap();

        assert_eq!(store.get("first").unwrap(), note("first"));
        assert!(dir.path().join("first.json").is_file());
    }

    #[test]
    fn test_get_missing_reports_id_and_path() {
        let dir = tempdir().unwrap();
        let store = FileStore::<Note>::new(dir.path()).unwrap();

        match store.get("absent") {
            Err(Error::NotFound { id, path }) => {
                assert_eq!(id, "absent");
                assert_eq!(path, dir.path().join("absent.json"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_directory_at_document_path_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::<Note>::new(dir.path()).unwrap();
        std::fs::create_dir(dir.path().join("folder.json")).unwrap();

        assert!(store.get("folder").unwrap_err().is_not_found());
    }

    #[test]
    fn test_set_none_is_missing_value() {
        let dir = tempdir().unwrap();
        let store = FileStore::<Option<Note>>::new(dir.path()).unwrap();

        let err = store.set("empty", &None).unwrap_err();

        assert!(matches!(err, Error::MissingValue));
        assert!(!dir.path().join("empty.json").exists());
    }

    #[test]
    fn test_missing_value_checked_before_id() {
        let dir = tempdir().unwrap();
        let store = FileStore::<Option<Note>>::new(dir.path()).unwrap();

        assert!(matches!(
            store.set("../bad", &None).unwrap_err(),
            Error::MissingValue
        ));
    }

    #[test]
    fn test_exists() {
        let dir = tempdir().unwrap();
        let store = FileStore::<Note>::new(dir.path()).unwrap();

        assert!(!store.exists("n").unwrap());
        store.set("n", &note("n")).unwrap();
        assert!(store.exists("n").unwrap());
        assert!(store.exists("../n").is_err());
    }

    #[test]
    fn test_set_recreates_removed_base_dir() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("store");
        let store = FileStore::<Note>::new(&base).unwrap();

        std::fs::remove_dir(&base).unwrap();
        store.set("again", &note("again")).unwrap();

        assert_eq!(store.get("again").unwrap(), note("again"));
    }

    #[test]
    fn test_atomic_config() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::builder()
            .base_dir(dir.path())
            .atomic_writes(true)
            .build();
        let store = FileStore::<Note>::with_config(config).unwrap();

        store.set("atomic", &note("atomic")).unwrap();

        assert_eq!(store.get("atomic").unwrap(), note("atomic"));
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["atomic.json"]);
    }

    #[test]
    fn test_atomic_write_does_not_clobber_tmp_named_document() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::builder()
            .base_dir(dir.path())
            .atomic_writes(true)
            .build();
        let store = FileStore::<Note>::with_config(config).unwrap();

        store.set("a.json.tmp", &note("keep")).unwrap();
        store.set("a", &note("other")).unwrap();

        assert_eq!(store.get("a.json.tmp").unwrap(), note("keep"));
        assert_eq!(store.get("a").unwrap(), note("other"));
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Ledger {
        id: u128,
        balance: i128,
        rate: f64,
    }

    #[test]
    fn test_wide_integers_round_trip() {
        let dir = tempdir().unwrap();
        let store = FileStore::<Ledger>::new(dir.path()).unwrap();

        for id in [u128::MAX, u64::MAX as u128 + 1] {
            let ledger = Ledger {
                id,
                balance: i128::MIN,
                rate: 0.25,
            };
            store.set("ledger", &ledger).unwrap();
            assert_eq!(store.get("ledger").unwrap(), ledger);
        }

        let raw = std::fs::read_to_string(dir.path().join("ledger.json")).unwrap();
        assert!(raw.contains("18446744073709551616"));
    }

    #[test]
    fn test_serialize_failure_writes_nothing() {
        use std::collections::HashMap;

        let dir = tempdir().unwrap();
        let store = FileStore::<HashMap<(u8, u8), u8>>::new(dir.path()).unwrap();
        let value = HashMap::from([((1, 2), 3)]);

        assert!(matches!(
            store.set("pairs", &value).unwrap_err(),
            Error::Serialize(_)
        ));
        assert!(!dir.path().join("pairs.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let base = dir.path().join("private");
        let config = StoreConfig::builder()
            .base_dir(&base)
            .secure_permissions(true)
            .build();
        let store = FileStore::<Note>::with_config(config).unwrap();

        store.set("secret", &note("secret")).unwrap();

        let dir_mode = std::fs::metadata(&base).unwrap().permissions().mode();
        let file_mode = std::fs::metadata(base.join("secret.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(dir_mode & 0o777, 0o700);
        assert_eq!(file_mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions_narrow_existing_document() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let config = StoreConfig::builder()
            .base_dir(dir.path())
            .secure_permissions(true)
            .build();
        let store = FileStore::<Note>::with_config(config).unwrap();
        store.set("shared", &note("shared")).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get("shared").unwrap(), note("shared"));
    }
}
