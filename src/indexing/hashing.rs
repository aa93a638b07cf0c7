//! Content hashing on a bounded rayon pool.

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::{debug, warn};

use super::errors::{ErrorCollector, ProcessingStage};
use crate::exports::ExportRule;
use crate::indexer::to_host_path;
use crate::language::Language;

/// A file selected for scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    /// Repo-relative, forward-slash key
    pub path: String,
    pub language: Language,
}

impl ScanTarget {
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
        }
    }
}

/// A target after reading: its digest, size and (when the export rule needs
/// it) its text.
#[derive(Debug, Clone)]
pub struct HashedFile {
    pub path: String,
    pub language: Language,
    pub content_hash: String,
    pub size_bytes: u64,
    pub source: Option<String>,
}

/// Stable digest of file bytes: lowercase hex SHA-256.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Read and hash `targets` with at most `threads` concurrent reads.
///
/// Unreadable files are recorded in `errors` and left out of the result.
/// Output order follows input order.
pub fn hash_files(
    root: &Path,
    targets: &[ScanTarget],
    threads: usize,
    errors: &ErrorCollector,
) -> Vec<HashedFile> {
    let hash_one = |target: &ScanTarget| -> Option<HashedFile> {
        let host_path = to_host_path(root, &target.path);
        match std::fs::read(&host_path) {
            Ok(bytes) => {
                let source = ExportRule::for_language(target.language)
                    .needs_source()
                    .then(|| String::from_utf8_lossy(&bytes).into_owned());
                Some(HashedFile {
                    path: target.path.clone(),
                    language: target.language,
                    content_hash: content_hash(&bytes),
                    size_bytes: bytes.len() as u64,
                    source,
                })
            }
            Err(e) => {
                debug!(path = %target.path, error = %e, "Failed to read file for hashing");
                errors.record(target.path.clone(), ProcessingStage::FileRead, e.to_string());
                None
            }
        }
    };

    match rayon::ThreadPoolBuilder::new().num_threads(threads.max(1)).build() {
        Ok(pool) => pool.install(|| targets.par_iter().filter_map(hash_one).collect()),
        Err(e) => {
            warn!(error = %e, "Failed to build hashing pool, hashing sequentially");
            targets.iter().filter_map(hash_one).collect()
        }
    }
}
