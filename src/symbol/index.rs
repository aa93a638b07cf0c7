//! Read-only accessors over a cached repository index.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use super::resolve::resolves_to;
use crate::cache::{CacheError, CacheStore};
use crate::indexer::normalize_relative;
use crate::model::{FileRecord, RepositoryIndex, SymbolEntry};

/// Where a symbol is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRef<'a> {
    pub path: &'a str,
    /// `functions`, `classes`, `types`, `constants` or `exports`
    pub category: &'static str,
    pub entry: &'a SymbolEntry,
}

/// How the index relates to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Staleness {
    Fresh,
    /// An update is recommended; the index is still readable
    Stale { recorded: String, current: String },
    /// Either side has no commit
    Unknown,
}

/// In-memory lookups over a [`RepositoryIndex`].
pub struct IndexReader {
    index: RepositoryIndex,
    root: Option<PathBuf>,
    /// Symbol name -> (path, category, position in that category)
    by_name: BTreeMap<String, Vec<(String, &'static str, usize)>>,
}

impl IndexReader {
    pub fn new(index: RepositoryIndex) -> Self {
        let mut by_name: BTreeMap<String, Vec<(String, &'static str, usize)>> = BTreeMap::new();

        for (path, record) in &index.files {
            for (category, entries) in record.symbols.declarations() {
                for (position, entry) in entries.iter().enumerate() {
                    by_name
                        .entry(entry.name.clone())
                        .or_default()
                        .push((path.clone(), category, position));
                }
            }
        }

        // Exports without a declaration in this file (re-exports, listed names)
        for (path, record) in &index.files {
            for (position, entry) in record.symbols.exports.iter().enumerate() {
                let declared = record
                    .symbols
                    .declarations()
                    .iter()
                    .any(|(_, entries)| entries.iter().any(|e| e.name == entry.name));
                if !declared {
                    by_name
                        .entry(entry.name.clone())
                        .or_default()
                        .push((path.clone(), "exports", position));
                }
            }
        }

        info!(
            "Built symbol lookup with {} names across {} files",
            by_name.len(),
            index.files.len()
        );

        Self {
            index,
            root: None,
            by_name,
        }
    }

    /// Resolve absolute paths passed to lookups against `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Open the cached index of `repo_root`. `Ok(None)` when never indexed.
    pub fn open(repo_root: &Path) -> Result<Option<Self>, CacheError> {
        let store = CacheStore::new(repo_root);
        Ok(store
            .read()
            .into_result(store.path())?
            .map(|index| Self::new(index).with_root(repo_root)))
    }

    pub fn index(&self) -> &RepositoryIndex {
        &self.index
    }

    fn normalize(&self, path: &str) -> Option<String> {
        let root = self.root.as_deref().unwrap_or_else(|| Path::new(""));
        normalize_relative(root, path)
    }

    /// Indexed paths, sorted.
    pub fn list_files(&self) -> Vec<&str> {
        self.index.files.keys().map(String::as_str).collect()
    }

    pub fn get_file(&self, path: &str) -> Option<&FileRecord> {
        let key = self.normalize(path)?;
        self.index.files.get(&key)
    }

    /// Every site declaring `name`, by path then category.
    pub fn get_symbol(&self, name: &str) -> Vec<SymbolRef<'_>> {
        let Some(sites) = self.by_name.get(name) else {
            return Vec::new();
        };
        sites
            .iter()
            .filter_map(|(path, category, position)| {
                let (key, record) = self.index.files.get_key_value(path)?;
                let entries = match *category {
                    "exports" => record.symbols.exports.as_slice(),
                    _ => record
                        .symbols
                        .declarations()
                        .into_iter()
                        .find(|(c, _)| c == category)
                        .map(|(_, entries)| entries)?,
                };
                Some(SymbolRef {
                    path: key.as_str(),
                    category: *category,
                    entry: entries.get(*position)?,
                })
            })
            .collect()
    }

    /// Names starting with `prefix`, case-insensitively.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<SymbolRef<'_>> {
        let prefix = prefix.to_lowercase();
        self.by_name
            .keys()
            .filter(|name| name.to_lowercase().starts_with(&prefix))
            .flat_map(|name| self.get_symbol(name))
            .collect()
    }

    /// Files with an import that resolves to `path`, sorted.
    pub fn get_dependents(&self, path: &str) -> Vec<&str> {
        let Some(target) = self.normalize(path) else {
            return Vec::new();
        };

        self.index
            .dependencies
            .iter()
            .filter(|(importer, _)| **importer != target)
            .filter(|(importer, sources)| {
                let Some(record) = self.index.files.get(*importer) else {
                    return false;
                };
                sources
                    .iter()
                    .any(|source| resolves_to(importer, record.language, source, &target))
            })
            .map(|(importer, _)| importer.as_str())
            .collect()
    }

    /// Compare the recorded commit with `current`.
    pub fn staleness(&self, current: Option<&str>) -> Staleness {
        staleness(self.index.git_ref.commit.as_deref(), current)
    }
}

/// Staleness of an index recorded at `recorded` relative to `current`.
/// Abbreviated hashes match their full form.
pub fn staleness(recorded: Option<&str>, current: Option<&str>) -> Staleness {
    match (recorded, current) {
        (Some(recorded), Some(current)) => {
            let (a, b) = (recorded.to_ascii_lowercase(), current.to_ascii_lowercase());
            if a.starts_with(&b) || b.starts_with(&a) {
                Staleness::Fresh
            } else {
                Staleness::Stale {
                    recorded: recorded.to_string(),
                    current: current.to_string(),
                }
            }
        }
        _ => Staleness::Unknown,
    }
}
