use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::CacheError;
use crate::config::Config;
use crate::model::{RepositoryIndex, SCHEMA_VERSION};

const INDEX_FILE: &str = "index.json";

/// Outcome of reading the cache file.
#[derive(Debug)]
pub enum CacheLoad {
    /// No cache file: the repository was never indexed
    Absent,
    /// The file exists but does not parse as an index
    Corrupted(String),
    /// Written by an incompatible layout version; treated as invalidated
    Incompatible { found: Option<u64> },
    Loaded(Box<RepositoryIndex>),
}

impl CacheLoad {
    /// The index when loaded, otherwise `None` whatever the reason.
    pub fn index(self) -> Option<RepositoryIndex> {
        match self {
            CacheLoad::Loaded(index) => Some(*index),
            _ => None,
        }
    }

    /// Absent maps to `Ok(None)`; unusable files become errors.
    pub fn into_result(self, path: &Path) -> Result<Option<RepositoryIndex>, CacheError> {
        match self {
            CacheLoad::Absent => Ok(None),
            CacheLoad::Loaded(index) => Ok(Some(*index)),
            CacheLoad::Corrupted(reason) => Err(CacheError::Corrupted {
                path: path.to_path_buf(),
                reason,
            }),
            CacheLoad::Incompatible { found } => Err(CacheError::Incompatible {
                found,
                expected: SCHEMA_VERSION,
            }),
        }
    }
}

/// Versioned on-disk index at `<root>/.codeatlas/index.json`.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(repo_root: &Path) -> Self {
        Self::at(Config::state_dir(repo_root).join(INDEX_FILE))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    /// Persist `index` atomically: write a colocated temp file, fsync it,
    /// then rename it over the target.
    pub fn save(&self, index: &RepositoryIndex) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut content = serde_json::to_string_pretty(index)?;
        content.push('\n');

        let temp_path = self.temp_path();
        let written = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp_path, &self.path)
        })();

        if let Err(e) = written {
            // Leave the previous index untouched and drop the partial temp file
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        debug!(path = %self.path.display(), bytes = content.len(), "Saved index cache");
        Ok(())
    }

    /// Read the cache file, telling absent, corrupted and incompatible apart.
    pub fn read(&self) -> CacheLoad {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CacheLoad::Absent,
            Err(e) => return CacheLoad::Corrupted(format!("unreadable: {}", e)),
        };

        let value: serde_json::Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Index cache is corrupted");
                return CacheLoad::Corrupted(e.to_string());
            }
        };

        let found = value.get("schemaVersion").and_then(|v| v.as_u64());
        if found != Some(u64::from(SCHEMA_VERSION)) {
            debug!(path = %self.path.display(), ?found, "Index cache has an incompatible schema");
            return CacheLoad::Incompatible { found };
        }

        match serde_json::from_value::<RepositoryIndex>(value) {
            Ok(index) => CacheLoad::Loaded(Box::new(index)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Index cache does not match the index layout");
                CacheLoad::Corrupted(e.to_string())
            }
        }
    }

    /// The cached index, or `None` when absent or unusable.
    pub fn load(&self) -> Option<RepositoryIndex> {
        self.read().index()
    }

    /// Delete the cache file. Returns whether there was one.
    pub fn reset(&self) -> Result<bool, CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
