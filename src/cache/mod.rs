//! Atomic, versioned persistence of the repository index.
//!
//! Writes never touch the target in place: the index goes to
//! `index.json.tmp` next to it, is fsynced, then renamed over
//! `index.json`. A crash mid-write leaves the previous index intact.

mod store;

pub use store::{CacheLoad, CacheStore};

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::RepositoryIndex;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("index cache {path} is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("index cache has schema version {found:?}, expected {expected}")]
    Incompatible { found: Option<u64>, expected: u32 },

    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Cached index of the repository at `repo_root`, if there is a usable one.
pub fn load(repo_root: &Path) -> Option<RepositoryIndex> {
    CacheStore::new(repo_root).load()
}
