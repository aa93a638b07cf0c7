//! Batch scanner: runs every catalog query over the repository in bounded
//! batches and folds the matches into per-file records.
//!
//! # Flow
//!
//! 1. Hash each target (bounded rayon pool) and give it an empty draft.
//! 2. Group files by `(language, dialect)` and split each group into batches.
//! 3. For every category and query, invoke the structural-search tool once
//!    per batch, sequentially. A failed or timed-out invocation counts as
//!    zero matches and is recorded in the error collector.
//! 4. Route each match to its file by normalized path and insert the
//!    extracted names into ordered maps; the first occurrence of a name wins.
//! 5. Run export inference per file and freeze the drafts into name-sorted
//!    arrays with `exported` stamped.

pub mod stream;
pub mod tool;

pub use stream::{parse_match_stream, ParsedStream, ToolMatch};
pub use tool::{AstGrepCli, InvocationError, SearchRequest, StructuralSearch};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::IndexerConfig;
use crate::exports::{Declarations, ExportRule, SymbolDraft, SymbolMap};
use crate::indexer::{normalize_relative, Walker};
use crate::indexing::{hash_files, ErrorCollector, HashedFile, ProcessingStage, ScanTarget};
use crate::language::Language;
use crate::model::{FileRecord, FileSymbols, ImportEntry, SymbolEntry};
use crate::query::{
    dialect_for, extract_names, extract_sources, queries, Category, Dialect, QueryDefinition,
};

/// Symbols and imports collected for one file during a scan.
#[derive(Debug, Default)]
struct FileDraft {
    symbols: BTreeMap<Category, SymbolMap>,
    /// `(source, kind)` -> first line seen
    imports: BTreeMap<(String, String), usize>,
}

impl FileDraft {
    fn take(&mut self, category: Category) -> SymbolMap {
        self.symbols.remove(&category).unwrap_or_default()
    }
}

/// Result of scanning a set of files.
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub files: BTreeMap<String, FileRecord>,
    /// Structural-search invocations issued
    pub invocations: usize,
    /// Match records that could not be parsed
    pub malformed_lines: usize,
}

pub struct BatchScanner {
    root: PathBuf,
    tool: Arc<dyn StructuralSearch>,
    config: IndexerConfig,
}

impl BatchScanner {
    pub fn new(root: PathBuf, tool: Arc<dyn StructuralSearch>, config: IndexerConfig) -> Self {
        Self { root, tool, config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Enumerate and scan every file of `languages`.
    pub async fn scan_languages(
        &self,
        walker: &Walker,
        languages: &[Language],
        errors: &ErrorCollector,
    ) -> ScanOutput {
        let mut targets = Vec::new();
        for &language in languages {
            let outcome = walker.find_files(language);
            if self.config.strict_walk {
                for skipped in outcome.skipped {
                    errors.record(skipped.path, ProcessingStage::Walk, skipped.reason);
                }
            }
            targets.extend(
                outcome
                    .files
                    .into_iter()
                    .map(|path| ScanTarget::new(path, language)),
            );
        }
        self.scan_targets(&targets, errors).await
    }

    /// Scan exactly `targets`. Unreadable files are recorded and left out.
    pub async fn scan_targets(&self, targets: &[ScanTarget], errors: &ErrorCollector) -> ScanOutput {
        let hashed = self.hash(targets, errors);
        self.scan_hashed(hashed, errors).await
    }

    /// Read and hash `targets` on the bounded hashing pool.
    pub fn hash(&self, targets: &[ScanTarget], errors: &ErrorCollector) -> Vec<HashedFile> {
        hash_files(
            &self.root,
            targets,
            self.config.effective_hash_threads(),
            errors,
        )
    }

    /// Scan files that were already read and hashed.
    pub async fn scan_hashed(&self, hashed: Vec<HashedFile>, errors: &ErrorCollector) -> ScanOutput {
        let mut arena: BTreeMap<String, FileDraft> = BTreeMap::new();
        let mut groups: BTreeMap<(Language, Dialect), Vec<String>> = BTreeMap::new();
        for file in &hashed {
            arena.insert(file.path.clone(), FileDraft::default());
            groups
                .entry((file.language, dialect_for(&file.path, file.language)))
                .or_default()
                .push(file.path.clone());
        }

        let mut output = ScanOutput::default();
        let batch_size = self.config.batch_size.max(1);

        for ((language, dialect), files) in &groups {
            let batches: Vec<&[String]> = files.chunks(batch_size).collect();
            debug!(
                language = %language,
                dialect = %dialect,
                files = files.len(),
                batches = batches.len(),
                "Scanning dialect"
            );

            for category in Category::ALL {
                for query in queries(*language, category) {
                    for (batch_index, batch) in batches.iter().enumerate() {
                        let matches = self
                            .invoke(query, *dialect, batch, batch_index, &mut output, errors)
                            .await;
                        for record in &matches {
                            self.route(record, category, query, &mut arena);
                        }
                    }
                }
            }
        }

        for file in hashed {
            let draft = arena.remove(&file.path).unwrap_or_default();
            let path = file.path.clone();
            output.files.insert(path, freeze(file, draft));
        }

        debug!(
            files = output.files.len(),
            invocations = output.invocations,
            malformed = output.malformed_lines,
            "Batch scan finished"
        );
        output
    }

    async fn invoke(
        &self,
        query: &QueryDefinition,
        dialect: Dialect,
        batch: &[String],
        batch_index: usize,
        output: &mut ScanOutput,
        errors: &ErrorCollector,
    ) -> Vec<ToolMatch> {
        let request = SearchRequest {
            root: &self.root,
            pattern: query.pattern,
            dialect,
            files: batch,
            timeout: self.timeout_for(batch.len()),
        };
        output.invocations += 1;

        match self.tool.run(&request).await {
            Ok(stdout) => {
                let parsed = parse_match_stream(&stdout);
                output.malformed_lines += parsed.malformed;
                parsed.matches
            }
            Err(e) => {
                warn!(
                    tool = self.tool.name(),
                    dialect = %dialect,
                    pattern = query.pattern,
                    batch = batch_index,
                    error = %e,
                    "Structural search invocation failed, treating as no matches"
                );
                errors.record_general(
                    ProcessingStage::Invocation,
                    format!(
                        "pattern {:?} (dialect {}, batch {}): {}",
                        query.pattern, dialect, batch_index, e
                    ),
                );
                Vec::new()
            }
        }
    }

    fn timeout_for(&self, batch_len: usize) -> Duration {
        if batch_len == 1 {
            self.config.file_timeout()
        } else {
            self.config.batch_timeout()
        }
    }

    fn route(
        &self,
        record: &ToolMatch,
        category: Category,
        query: &QueryDefinition,
        arena: &mut BTreeMap<String, FileDraft>,
    ) {
        let Some(draft) = normalize_relative(&self.root, &record.file)
            .and_then(|path| arena.get_mut(&path))
        else {
            warn!(file = %record.file, pattern = query.pattern, "Match for a file outside the batch, ignoring");
            return;
        };

        if category == Category::Imports {
            for source in extract_sources(query, record) {
                draft
                    .imports
                    .entry((source, query.kind.to_string()))
                    .or_insert(record.line());
            }
            return;
        }

        let map = draft.symbols.entry(category).or_default();
        for name in extract_names(query, record) {
            map.entry(name)
                .or_insert_with(|| {
                    SymbolDraft::new(
                        record.line(),
                        record.column(),
                        query.kind,
                        query.extra.map(str::to_string),
                    )
                })
                .observe(record.column());
        }
    }
}

/// Apply export inference and convert a draft into its immutable record.
fn freeze(file: HashedFile, mut draft: FileDraft) -> FileRecord {
    let mut exports = draft.take(Category::Exports);
    let functions = draft.take(Category::Functions);
    let classes = draft.take(Category::Classes);
    let types = draft.take(Category::Types);
    let constants = draft.take(Category::Constants);

    ExportRule::for_language(file.language).infer(
        file.source.as_deref(),
        &mut exports,
        &Declarations {
            functions: &functions,
            classes: &classes,
            types: &types,
            constants: &constants,
        },
    );

    let entries = |map: SymbolMap| -> Vec<SymbolEntry> {
        map.into_iter()
            .map(|(name, symbol)| SymbolEntry {
                exported: exports.contains_key(&name),
                name,
                line: symbol.line,
                kind: symbol.kind,
                extra: symbol.extra,
            })
            .collect()
    };

    let symbols = FileSymbols {
        functions: entries(functions),
        classes: entries(classes),
        types: entries(types),
        constants: entries(constants),
        exports: entries(exports.clone()),
    };

    let mut imports: Vec<ImportEntry> = draft
        .imports
        .into_iter()
        .map(|((source, kind), line)| ImportEntry { source, kind, line })
        .collect();
    imports.sort_by(|a, b| (a.line, &a.source, &a.kind).cmp(&(b.line, &b.source, &b.kind)));

    FileRecord {
        content_hash: file.content_hash,
        language: file.language,
        size_bytes: file.size_bytes,
        symbols,
        imports,
    }
}
