//! Common test utilities for docstore integration tests
//!
//! Provides shared document types and a temp-dir backed store fixture.

#![allow(dead_code)]

use docstore::{FileStore, StoreConfig, StoreConfigBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Test Documents
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Character {
    pub name: String,
    pub level: u32,
    pub inventory: Vec<Item>,
    pub guild: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub label: String,
    pub weight: f64,
}

impl Character {
    pub fn sample(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: 7,
            inventory: vec![
                Item {
                    label: "rope".into(),
                    weight: 1.5,
                },
                Item {
                    label: "lantern".into(),
                    weight: 0.75,
                },
            ],
            guild: Some("cartographers".into()),
        }
    }
}

// =============================================================================
// Fixture
// =============================================================================

/// A store rooted in a fresh temp directory, removed on drop
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub store: FileStore<Character>,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_config(|builder| builder)
    }

    pub fn with_config(configure: impl FnOnce(StoreConfigBuilder) -> StoreConfigBuilder) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let builder = StoreConfig::builder().base_dir(temp_dir.path().join("store"));
        let store =
            FileStore::with_config(configure(builder).build()).expect("Failed to open store");

        Self { temp_dir, store }
    }

    pub fn base_dir(&self) -> &Path {
        self.store.base_dir()
    }

    pub fn doc_path(&self, file_name: &str) -> PathBuf {
        self.base_dir().join(file_name)
    }

    pub fn read_raw(&self, file_name: &str) -> String {
        std::fs::read_to_string(self.doc_path(file_name)).expect("Failed to read document")
    }

    pub fn write_raw(&self, file_name: &str, content: &str) {
        std::fs::write(self.doc_path(file_name), content).expect("Failed to write document");
    }

    /// Every file under the temp dir, relative to it, sorted
    pub fn all_files(&self) -> Vec<PathBuf> {
        fn walk(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(&path, root, out);
                } else {
                    out.push(path.strip_prefix(root).unwrap().to_path_buf());
                }
            }
        }

        let mut files = Vec::new();
        walk(self.temp_dir.path(), self.temp_dir.path(), &mut files);
        files.sort();
        files
    }
}
