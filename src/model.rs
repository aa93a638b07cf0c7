//! Persisted shape of the repository index.
//!
//! Everything here serializes with camelCase field names and ordered maps so
//! the cache file is deterministic: writing, loading and writing again yields
//! the same bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::indexing::ScanErrorRecord;
use crate::language::Language;

/// Version of the on-disk layout. Bump on any incompatible change.
pub const SCHEMA_VERSION: u32 = 1;

/// Commit and branch the index was built or last updated against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    pub commit: Option<String>,
    pub branch: Option<String>,
}

/// A declared symbol within one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolEntry {
    pub name: String,
    /// 1-based line; `None` for synthesized exports without a declaration site.
    pub line: Option<usize>,
    pub kind: String,
    pub exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

/// An import edge, deduplicated per file by `(source, kind)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEntry {
    pub source: String,
    pub kind: String,
    pub line: usize,
}

/// Per-category symbol arrays, each sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSymbols {
    pub exports: Vec<SymbolEntry>,
    pub functions: Vec<SymbolEntry>,
    pub classes: Vec<SymbolEntry>,
    pub types: Vec<SymbolEntry>,
    pub constants: Vec<SymbolEntry>,
}

impl FileSymbols {
    /// Number of declarations; exports are a view and are not counted again.
    pub fn declaration_count(&self) -> usize {
        self.functions.len() + self.classes.len() + self.types.len() + self.constants.len()
    }

    /// Declaration categories in the order they are consulted for lookups.
    pub fn declarations(&self) -> [(&'static str, &[SymbolEntry]); 4] {
        [
            ("functions", &self.functions),
            ("classes", &self.classes),
            ("types", &self.types),
            ("constants", &self.constants),
        ]
    }
}

/// Snapshot of one file's symbols and imports at a given content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub content_hash: String,
    pub language: Language,
    pub size_bytes: u64,
    pub symbols: FileSymbols,
    pub imports: Vec<ImportEntry>,
}

impl FileRecord {
    /// Deduplicated, sorted import sources of this file.
    pub fn dependency_sources(&self) -> Vec<String> {
        self.imports
            .iter()
            .map(|import| import.source.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub total_files: usize,
    pub total_symbols: usize,
    pub scan_duration_ms: u64,
    pub errors: Vec<ScanErrorRecord>,
}

/// The cross-file symbol and dependency map of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryIndex {
    pub schema_version: u32,
    pub generated: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub git_ref: GitRef,
    pub detected_languages: Vec<Language>,
    pub files: BTreeMap<String, FileRecord>,
    pub dependencies: BTreeMap<String, Vec<String>>,
    pub stats: IndexStats,
}

impl RepositoryIndex {
    /// Assemble a fresh index from the records of a full scan.
    pub fn assemble(
        git_ref: GitRef,
        detected_languages: Vec<Language>,
        files: BTreeMap<String, FileRecord>,
        scan_duration_ms: u64,
        errors: Vec<ScanErrorRecord>,
    ) -> Self {
        let now = Utc::now();
        let mut index = Self {
            schema_version: SCHEMA_VERSION,
            generated: now,
            updated: now,
            git_ref,
            detected_languages,
            files,
            dependencies: BTreeMap::new(),
            stats: IndexStats {
                scan_duration_ms,
                errors,
                ..Default::default()
            },
        };
        index.rebuild_dependencies();
        index.recompute_totals();
        index
    }

    /// Replace a file's record wholesale and keep `dependencies` in step.
    pub fn insert_file(&mut self, path: String, record: FileRecord) {
        let sources = record.dependency_sources();
        if sources.is_empty() {
            self.dependencies.remove(&path);
        } else {
            self.dependencies.insert(path.clone(), sources);
        }
        self.files.insert(path, record);
    }

    /// Drop a file and its dependency entry. Returns whether it was present.
    pub fn remove_file(&mut self, path: &str) -> bool {
        self.dependencies.remove(path);
        self.files.remove(path).is_some()
    }

    /// Recompute `dependencies` from the file map.
    pub fn rebuild_dependencies(&mut self) {
        self.dependencies = self
            .files
            .iter()
            .filter_map(|(path, record)| {
                let sources = record.dependency_sources();
                (!sources.is_empty()).then(|| (path.clone(), sources))
            })
            .collect();
    }

    /// Recompute file and symbol totals from the file map.
    pub fn recompute_totals(&mut self) {
        self.stats.total_files = self.files.len();
        self.stats.total_symbols = self
            .files
            .values()
            .map(|record| record.symbols.declaration_count())
            .sum();
    }
}
