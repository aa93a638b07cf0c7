//! Full and incremental indexing of one repository.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheLoad, CacheStore};
use crate::config::Config;
use crate::error::IndexError;
use crate::git;
use crate::incremental::{IncrementalUpdater, UpdateSummary};
use crate::indexer::Walker;
use crate::indexing::ErrorCollector;
use crate::language::LanguageDetector;
use crate::model::RepositoryIndex;
use crate::scanner::{AstGrepCli, BatchScanner, StructuralSearch};
use crate::symbol::{staleness, Staleness};

/// Totals of a full scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub files: usize,
    pub symbols: usize,
    pub languages: usize,
    pub invocations: usize,
    pub malformed_lines: usize,
    pub errors: usize,
    pub duration_ms: u64,
}

impl BuildReport {
    fn new(index: &RepositoryIndex, invocations: usize, malformed_lines: usize) -> Self {
        Self {
            files: index.stats.total_files,
            symbols: index.stats.total_symbols,
            languages: index.detected_languages.len(),
            invocations,
            malformed_lines,
            errors: index.stats.errors.len(),
            duration_ms: index.stats.scan_duration_ms,
        }
    }
}

/// Why an update fell back to a full scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescanReason {
    NotIndexed,
    Corrupted(String),
    Incompatible { found: Option<u64> },
    NoBaseCommit,
    /// Git could not diff the cached commit against the target
    DiffUnavailable(String),
    /// Cache differs from `HEAD` or git metadata is unavailable
    Stale,
    Forced,
}

impl std::fmt::Display for RescanReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RescanReason::NotIndexed => write!(f, "no cached index"),
            RescanReason::Corrupted(reason) => write!(f, "cached index is corrupted ({})", reason),
            RescanReason::Incompatible { found: Some(v) } => {
                write!(f, "cached index has schema version {}", v)
            }
            RescanReason::Incompatible { found: None } => {
                write!(f, "cached index has no schema version")
            }
            RescanReason::NoBaseCommit => write!(f, "cached index records no commit"),
            RescanReason::DiffUnavailable(reason) => write!(f, "git diff unavailable ({})", reason),
            RescanReason::Stale => write!(f, "cached index does not match HEAD"),
            RescanReason::Forced => write!(f, "rescan forced"),
        }
    }
}

/// What `update` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Incremental(UpdateSummary),
    Rescanned {
        reason: RescanReason,
        report: BuildReport,
    },
    /// `index` without `--force` found a cache matching `HEAD`
    UpToDate { commit: String },
}

/// Indexes one repository root with one structural-search tool.
pub struct IndexService {
    root: PathBuf,
    config: Config,
    scanner: BatchScanner,
    store: CacheStore,
}

impl IndexService {
    /// Resolve the structural-search binary and prepare a service.
    ///
    /// Fails with [`IndexError::ToolUnavailable`] before anything is read
    /// or written when no binary can be found.
    pub async fn new(root: PathBuf, config: Config) -> Result<Self, IndexError> {
        let tool = AstGrepCli::locate(&config.indexer).await?;
        info!(binary = tool.binary(), "Using structural search tool");
        Ok(Self::with_tool(root, config, Arc::new(tool)))
    }

    /// Prepare a service around an already resolved tool.
    pub fn with_tool(root: PathBuf, config: Config, tool: Arc<dyn StructuralSearch>) -> Self {
        let scanner = BatchScanner::new(root.clone(), tool, config.indexer.clone());
        let store = CacheStore::new(&root);
        Self {
            root,
            config,
            scanner,
            store,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    fn check_root(&self) -> Result<(), IndexError> {
        std::fs::read_dir(&self.root)
            .map(|_| ())
            .map_err(|source| IndexError::UnreadableRoot {
                path: self.root.clone(),
                source,
            })
    }

    fn walker(&self) -> Walker {
        Walker::new(self.root.clone(), &self.config.indexer)
    }

    /// Scan the whole repository into a fresh index. Nothing is persisted.
    pub async fn build(&self) -> Result<(RepositoryIndex, BuildReport), IndexError> {
        self.check_root()?;
        let start = Instant::now();

        let languages = LanguageDetector::with_sample_limit(self.config.indexer.sample_limit)
            .include_hidden(&self.config.indexer.include_hidden)
            .detect(&self.root);
        info!(root = %self.root.display(), languages = ?languages, "Starting full scan");

        let walker = self.walker();
        let errors = ErrorCollector::new();
        let output = self
            .scanner
            .scan_languages(&walker, &languages, &errors)
            .await;

        if errors.error_count() > 0 {
            for line in errors.report().summary_lines() {
                warn!("{}", line);
            }
        }

        let index = RepositoryIndex::assemble(
            git::git_ref(&self.root),
            languages,
            output.files,
            start.elapsed().as_millis() as u64,
            errors.into_records(),
        );
        let report = BuildReport::new(&index, output.invocations, output.malformed_lines);

        info!(
            files = report.files,
            symbols = report.symbols,
            invocations = report.invocations,
            errors = report.errors,
            duration_ms = report.duration_ms,
            "Full scan complete"
        );
        Ok((index, report))
    }

    /// Full scan followed by an atomic cache write.
    pub async fn build_and_save(&self) -> Result<BuildReport, IndexError> {
        let (index, report) = self.build().await?;
        self.store.save(&index)?;
        Ok(report)
    }

    /// Full scan unless the cache already matches `HEAD` and `force` is off.
    pub async fn ensure_indexed(&self, force: bool) -> Result<UpdateOutcome, IndexError> {
        let reason = match self.store.read() {
            CacheLoad::Absent => RescanReason::NotIndexed,
            CacheLoad::Corrupted(reason) => RescanReason::Corrupted(reason),
            CacheLoad::Incompatible { found } => RescanReason::Incompatible { found },
            CacheLoad::Loaded(_) if force => RescanReason::Forced,
            CacheLoad::Loaded(index) => {
                let head = git::current_commit(&self.root).ok();
                match (staleness(index.git_ref.commit.as_deref(), head.as_deref()), head) {
                    (Staleness::Fresh, Some(commit)) => {
                        debug!(commit = %commit, "Cached index matches HEAD, skipping scan");
                        return Ok(UpdateOutcome::UpToDate { commit });
                    }
                    _ => RescanReason::Stale,
                }
            }
        };
        self.rescan(reason).await
    }

    /// Bring the cached index to `target` (default `HEAD`).
    ///
    /// Falls back to a full scan when there is no usable cache, the cache
    /// records no commit, or git cannot produce the diff (for example a
    /// cached commit lost to a history rewrite). The target is validated before anything else, so
    /// a malformed reference leaves the cache untouched.
    pub async fn update(&self, target: Option<&str>) -> Result<UpdateOutcome, IndexError> {
        if let Some(target) = target {
            git::validate_commit(target)?;
        }
        self.check_root()?;

        let mut index = match self.store.read() {
            CacheLoad::Loaded(index) => *index,
            CacheLoad::Absent => return self.rescan(RescanReason::NotIndexed).await,
            CacheLoad::Corrupted(reason) => {
                warn!(path = %self.store.path().display(), "Cached index is corrupted, rescanning");
                return self.rescan(RescanReason::Corrupted(reason)).await;
            }
            CacheLoad::Incompatible { found } => {
                info!(?found, "Cached index has an incompatible schema, rescanning");
                return self.rescan(RescanReason::Incompatible { found }).await;
            }
        };

        let walker = self.walker();
        let updater = IncrementalUpdater::new(&self.scanner, &walker);
        match updater.apply(&mut index, target).await {
            Ok(summary) => {
                self.store.save(&index)?;
                Ok(UpdateOutcome::Incremental(summary))
            }
            Err(IndexError::NoBaseCommit) => {
                info!("Cached index records no commit, rescanning");
                self.rescan(RescanReason::NoBaseCommit).await
            }
            Err(IndexError::Git(e)) => {
                warn!(error = %e, "Git diff failed, rescanning");
                self.rescan(RescanReason::DiffUnavailable(e.to_string())).await
            }
            Err(e) => Err(e),
        }
    }

    async fn rescan(&self, reason: RescanReason) -> Result<UpdateOutcome, IndexError> {
        let report = self.build_and_save().await?;
        Ok(UpdateOutcome::Rescanned { reason, report })
    }
}
