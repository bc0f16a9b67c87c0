//! Document stores
//!
//! Every backend satisfies the same [`DataAccess`] contract:
//! - **File**: one JSON file per id under a base directory
//! - **Memory**: documents held in-process only, for tests and ephemeral use

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Get/set access to documents of type `T` keyed by id
pub trait DataAccess<T>: Send + Sync {
    /// Load the document stored under `id`
    ///
    /// # Errors
    ///
    /// - `Error::InvalidId` if `id` fails sanitization
    /// - `Error::NotFound` if nothing is stored under `id`
    /// - `Error::Deserialize` if the stored document does not fit `T`
    fn get(&self, id: &str) -> Result<T>;

    /// Store `value` under `id`, replacing any previous document
    ///
    /// # Errors
    ///
    /// - `Error::MissingValue` if `value` serializes to `null`
    /// - `Error::InvalidId` if `id` fails sanitization
    /// - an I/O error if the document cannot be written
    fn set(&self, id: &str, value: &T) -> Result<()>;
}

/// Convert a value for storage, rejecting values that serialize to `null`
/// (`None`, `()`, unit structs).
pub(crate) fn to_document<T: Serialize>(value: &T) -> Result<Value> {
    match serde_json::to_value(value)? {
        Value::Null => Err(Error::MissingValue),
        document => Ok(document),
    }
}
