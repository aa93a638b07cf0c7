//! Error collection for scans and updates.
//!
//! Per-file and per-invocation failures never abort a scan; they are
//! collected here and end up in `stats.errors`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Stage where an error occurred during processing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessingStage {
    Walk,
    FileRead,
    Invocation,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Walk => write!(f, "Walk"),
            ProcessingStage::FileRead => write!(f, "File Read"),
            ProcessingStage::Invocation => write!(f, "Invocation"),
        }
    }
}

/// One entry of `stats.errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanErrorRecord {
    /// Repo-relative path, when the error concerns a single file or subtree
    pub path: Option<String>,
    pub stage: ProcessingStage,
    pub message: String,
}

/// Collects errors, shareable across the hashing pool.
#[derive(Clone, Default)]
pub struct ErrorCollector {
    errors: Arc<Mutex<Vec<ScanErrorRecord>>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for a specific path.
    pub fn record(&self, path: impl Into<String>, stage: ProcessingStage, message: impl Into<String>) {
        self.push(ScanErrorRecord {
            path: Some(path.into()),
            stage,
            message: message.into(),
        });
    }

    /// Record an error that is not tied to one path (e.g. a failed batch).
    pub fn record_general(&self, stage: ProcessingStage, message: impl Into<String>) {
        self.push(ScanErrorRecord {
            path: None,
            stage,
            message: message.into(),
        });
    }

    fn push(&self, record: ScanErrorRecord) {
        // A poisoned lock only means another recorder panicked mid-push
        let mut errors = self.errors.lock().unwrap_or_else(|e| e.into_inner());
        errors.push(record);
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Take the collected errors, ordered by stage, then path.
    pub fn into_records(self) -> Vec<ScanErrorRecord> {
        let mut records = match Arc::try_unwrap(self.errors) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(|e| e.into_inner()),
            Err(shared) => shared.lock().unwrap_or_else(|e| e.into_inner()).clone(),
        };
        records.sort_by(|a, b| (a.stage, &a.path).cmp(&(b.stage, &b.path)));
        records
    }

    pub fn report(&self) -> ErrorReport {
        let errors = self.errors.lock().unwrap_or_else(|e| e.into_inner());
        ErrorReport::from_errors(&errors)
    }
}

/// Per-stage summary of collected errors.
pub struct ErrorReport {
    pub total_errors: usize,
    pub by_stage: BTreeMap<ProcessingStage, Vec<ScanErrorRecord>>,
}

impl ErrorReport {
    pub fn from_errors(errors: &[ScanErrorRecord]) -> Self {
        let mut by_stage: BTreeMap<ProcessingStage, Vec<ScanErrorRecord>> = BTreeMap::new();
        for error in errors {
            by_stage.entry(error.stage).or_default().push(error.clone());
        }

        Self {
            total_errors: errors.len(),
            by_stage,
        }
    }

    /// Human-readable summary, at most five examples per stage.
    pub fn summary_lines(&self) -> Vec<String> {
        if self.total_errors == 0 {
            return vec!["No errors occurred during processing".to_string()];
        }

        let mut lines = vec![format!("Processing completed with {} errors", self.total_errors)];
        for (stage, errors) in &self.by_stage {
            lines.push(format!("  {}: {} errors", stage, errors.len()));
            for error in errors.iter().take(5) {
                lines.push(format!(
                    "    - {}: {}",
                    error.path.as_deref().unwrap_or("<batch>"),
                    error.message
                ));
            }
            if errors.len() > 5 {
                lines.push(format!("    ... and {} more", errors.len() - 5));
            }
        }
        lines
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }
}
