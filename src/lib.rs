//! # docstore
//!
//! A small file-backed document store: each value is kept as one
//! pretty-printed JSON file named after its id.
//!
//! ## Features
//!
//! - **Get/Set**: [`DataAccess`] is the whole interface, backed by files
//!   ([`FileStore`]) or memory ([`MemoryStore`])
//! - **Safe ids**: rooted paths and `..` are rejected, directory components
//!   are stripped, `.json` is appended when the id has no extension
//! - **Forgiving reads**: struct fields are matched case-insensitively, so
//!   `{"Name": ..}` loads into a field called `name`
//! - **Options**: compact output, atomic (temp + rename) writes, owner-only
//!   permissions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docstore::{DataAccess, FileStore};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Profile {
//!     name: String,
//!     level: u32,
//! }
//!
//! # fn example() -> docstore::Result<()> {
//! // Stored under `Data/` next to the executable
//! let store = FileStore::<Profile>::with_default_dir()?;
//!
//! store.set("player-one", &Profile { name: "Ada".into(), level: 3 })?;
//! let profile = store.get("player-one")?; // Data/player-one.json
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```rust,no_run
//! use docstore::{FileStore, StoreConfig};
//! use serde_json::Value;
//!
//! # fn example() -> docstore::Result<()> {
//! let config = StoreConfig::builder()
//!     .base_dir("~/.local/share/my-app")
//!     .atomic_writes(true)
//!     .secure_permissions(true)
//!     .build();
//! let store = FileStore::<Value>::with_config(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Durability
//!
//! By default a `set` writes the file in place. A crash part way through can
//! leave a truncated document behind; enable
//! [`StoreConfigBuilder::atomic_writes`] to write through a uniquely named
//! temp file in the same directory and rename it instead. Concurrent writers to the same id are not coordinated
//! in either mode.

mod error;
mod store;

pub mod config;
pub mod de;
pub mod id;
pub mod security;
pub mod storage;

pub use config::{StoreConfig, StoreConfigBuilder};
pub use error::{Error, Result};
pub use id::{resolve_path, sanitize_id};
pub use storage::{JsonStorage, StorageBackend, WriteOptions, write_document};
pub use store::{DataAccess, FileStore, MemoryStore};
