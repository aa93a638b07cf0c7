//! Read-only report on the cached index of a repository.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cache::{CacheLoad, CacheStore};
use crate::git;
use crate::language::Language;
use crate::symbol::{staleness, Staleness};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum CacheState {
    Absent,
    Corrupted { reason: String },
    Incompatible { found: Option<u64> },
    Loaded,
}

/// Snapshot of the cache and its relation to the working tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatus {
    pub cache_path: PathBuf,
    pub cache: CacheState,
    pub recorded_commit: Option<String>,
    pub current_commit: Option<String>,
    pub staleness: Staleness,
    pub languages: Vec<Language>,
    pub files: usize,
    pub symbols: usize,
    pub errors: usize,
    pub generated: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

/// Describe the cached index of `repo_root`. Never scans and never writes;
/// git failures only leave the commit fields empty.
pub fn inspect(repo_root: &Path) -> IndexStatus {
    let store = CacheStore::new(repo_root);
    let current_commit = git::current_commit(repo_root).ok();

    let mut status = IndexStatus {
        cache_path: store.path().to_path_buf(),
        cache: CacheState::Absent,
        recorded_commit: None,
        staleness: Staleness::Unknown,
        current_commit,
        languages: Vec::new(),
        files: 0,
        symbols: 0,
        errors: 0,
        generated: None,
        updated: None,
    };

    match store.read() {
        CacheLoad::Absent => {}
        CacheLoad::Corrupted(reason) => status.cache = CacheState::Corrupted { reason },
        CacheLoad::Incompatible { found } => status.cache = CacheState::Incompatible { found },
        CacheLoad::Loaded(index) => {
            status.cache = CacheState::Loaded;
            status.staleness = staleness(
                index.git_ref.commit.as_deref(),
                status.current_commit.as_deref(),
            );
            status.recorded_commit = index.git_ref.commit;
            status.languages = index.detected_languages;
            status.files = index.stats.total_files;
            status.symbols = index.stats.total_symbols;
            status.errors = index.stats.errors.len();
            status.generated = Some(index.generated);
            status.updated = Some(index.updated);
        }
    }
    status
}
