//! In-memory document store for testing

use crate::error::{Error, Result};
use crate::id;
use crate::store::{DataAccess, to_document};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

/// In-memory document storage (not persisted)
///
/// Applies the same id sanitization as [`FileStore`](crate::FileStore), so
/// `notes/a` and `a` name the same document here too. `NotFound` errors carry
/// the sanitized filename as their path.
pub struct MemoryStore<T> {
    documents: RwLock<HashMap<String, Value>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MemoryStore<T> {
    /// Create an empty memory store
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DataAccess<T> for MemoryStore<T>
where
    T: Serialize + DeserializeOwned,
{
    fn get(&self, id: &str) -> Result<T> {
        let key = id::sanitize_id(id)?;

        let document = self
            .documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        match document {
            Some(document) => crate::de::from_value(document).map_err(|e| Error::Deserialize {
                path: PathBuf::from(key),
                source: e,
            }),
            None => Err(Error::NotFound {
                id: id.to_string(),
                path: PathBuf::from(key),
            }),
        }
    }

    fn set(&self, id: &str, value: &T) -> Result<()> {
        let document = to_document(value)?;
        let key = id::sanitize_id(id)?;

        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, document);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
