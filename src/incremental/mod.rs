//! Incremental updates driven by git diffs.
//!
//! Only paths the diff reports are touched. Each surviving candidate is
//! re-hashed; files whose content is unchanged keep their record, the rest
//! are rescanned through the [`BatchScanner`] and replace their record
//! wholesale. Totals are recomputed from the resulting file map.

use chrono::Utc;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::IndexError;
use crate::git::{self, ChangeKind, FileChange};
use crate::indexer::{normalize_relative, to_host_path, Walker};
use crate::indexing::{ErrorCollector, ScanTarget};
use crate::language::Language;
use crate::model::{GitRef, RepositoryIndex};
use crate::scanner::BatchScanner;

/// What an update did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Commit the index was at before the update
    pub from: Option<String>,
    pub to: Option<String>,
    pub added: usize,
    pub replaced: usize,
    pub removed: usize,
    /// Candidates whose content hash matched the recorded one
    pub unchanged: usize,
    /// Candidates outside the enumerated set (excluded, ignored, unsupported)
    pub skipped: usize,
    pub invocations: usize,
    pub errors: usize,
    pub duration_ms: u64,
}

impl UpdateSummary {
    pub fn changed_files(&self) -> usize {
        self.added + self.replaced + self.removed
    }
}

pub struct IncrementalUpdater<'a> {
    scanner: &'a BatchScanner,
    walker: &'a Walker,
}

impl<'a> IncrementalUpdater<'a> {
    pub fn new(scanner: &'a BatchScanner, walker: &'a Walker) -> Self {
        Self { scanner, walker }
    }

    /// Bring `index` from its recorded commit to `target` (default `HEAD`).
    ///
    /// Both references are validated before any git command runs. On error
    /// the index is left untouched.
    pub async fn apply(
        &self,
        index: &mut RepositoryIndex,
        target: Option<&str>,
    ) -> Result<UpdateSummary, IndexError> {
        let root = self.scanner.root();
        let base = index.git_ref.commit.clone().ok_or(IndexError::NoBaseCommit)?;
        git::validate_commit(&base)?;

        let target = match target {
            Some(target) => target.to_string(),
            None => git::current_commit(root)?,
        };
        git::validate_commit(&target)?;

        let changes = git::diff_name_status(root, &base, &target)?;
        debug!(from = %base, to = %target, changes = changes.len(), "Computed diff");

        let new_ref = GitRef {
            commit: Some(target),
            branch: git::current_branch(root).ok().flatten(),
        };
        Ok(self.apply_changes(index, &changes, new_ref).await)
    }

    /// Merge a file-level change list into `index` and stamp `new_ref`.
    pub async fn apply_changes(
        &self,
        index: &mut RepositoryIndex,
        changes: &[FileChange],
        new_ref: GitRef,
    ) -> UpdateSummary {
        let start = Instant::now();
        let root = self.scanner.root();
        let errors = ErrorCollector::new();
        let mut summary = UpdateSummary {
            from: index.git_ref.commit.clone(),
            to: new_ref.commit.clone(),
            ..Default::default()
        };

        let mut deleted = BTreeSet::new();
        let mut candidates = BTreeSet::new();
        for change in changes {
            let Some(path) = normalize_relative(root, &change.path) else {
                continue;
            };
            match change.kind {
                ChangeKind::Deleted => {
                    deleted.insert(path);
                }
                ChangeKind::Added | ChangeKind::Modified => {
                    candidates.insert(path);
                }
            }
        }

        for path in deleted.difference(&candidates) {
            if index.remove_file(path) {
                summary.removed += 1;
            }
        }

        let mut targets = Vec::new();
        for path in candidates {
            let language = Language::for_path(std::path::Path::new(&path));
            let language = match language {
                Some(language) if self.walker.accepts(&path) => language,
                _ => {
                    // No longer enumerable: drop whatever was recorded
                    if index.remove_file(&path) {
                        summary.removed += 1;
                    } else {
                        summary.skipped += 1;
                    }
                    continue;
                }
            };
            if !to_host_path(root, &path).is_file() {
                if index.remove_file(&path) {
                    summary.removed += 1;
                }
                continue;
            }
            targets.push(ScanTarget::new(path, language));
        }

        let hashed = self.scanner.hash(&targets, &errors);
        let readable: BTreeSet<&str> = hashed.iter().map(|f| f.path.as_str()).collect();
        for target in &targets {
            if !readable.contains(target.path.as_str()) && index.remove_file(&target.path) {
                summary.removed += 1;
            }
        }

        let changed: Vec<_> = hashed
            .into_iter()
            .filter(|file| {
                let same = index
                    .files
                    .get(&file.path)
                    .is_some_and(|record| record.content_hash == file.content_hash);
                if same {
                    summary.unchanged += 1;
                }
                !same
            })
            .collect();

        let output = self.scanner.scan_hashed(changed, &errors).await;
        summary.invocations = output.invocations;

        for (path, record) in output.files {
            if !index.detected_languages.contains(&record.language) {
                index.detected_languages.push(record.language);
                index.detected_languages.sort();
            }
            if index.files.contains_key(&path) {
                summary.replaced += 1;
            } else {
                summary.added += 1;
            }
            index.insert_file(path, record);
        }

        index.recompute_totals();
        index.updated = Utc::now();
        index.git_ref = new_ref;
        index.stats.errors = errors.into_records();
        summary.errors = index.stats.errors.len();
        summary.duration_ms = start.elapsed().as_millis() as u64;
        index.stats.scan_duration_ms = summary.duration_ms;

        info!(
            added = summary.added,
            replaced = summary.replaced,
            removed = summary.removed,
            unchanged = summary.unchanged,
            errors = summary.errors,
            "Incremental update applied"
        );
        summary
    }
}
