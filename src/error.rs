//! Engine-level errors.
//!
//! Only preconditions abort a scan or update. Everything scoped to a single
//! file or invocation is collected in `stats.errors` instead (see
//! [`crate::indexing::ErrorCollector`]).

use std::path::PathBuf;
use thiserror::Error;

use crate::cache::CacheError;
use crate::git::GitError;

#[derive(Error, Debug)]
pub enum IndexError {
    /// No structural-search binary could be resolved. Nothing is written.
    #[error("structural search tool unavailable (tried: {})", tried.join(", "))]
    ToolUnavailable { tried: Vec<String> },

    /// A commit-like string failed the hex-hash shape check.
    #[error("invalid git reference: {0:?}")]
    InvalidGitReference(String),

    #[error("repository root is not readable: {path}: {source}")]
    UnreadableRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The index records no commit, so there is nothing to diff against.
    #[error("index has no recorded commit to diff against")]
    NoBaseCommit,

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}
