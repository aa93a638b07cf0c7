//! Active-language detection.
//!
//! Two signals are combined: manifests at the repository root, and the
//! extensions seen in a bounded sample of the tree. The result is their union.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::markers::{Language, LanguageMarker, DEFAULT_MARKERS};
use crate::indexer::is_statically_excluded;

/// Default number of files inspected by the extension sample.
pub const DEFAULT_SAMPLE_LIMIT: usize = 500;

/// Detects which supported languages a repository uses.
pub struct LanguageDetector {
    markers: &'static [LanguageMarker],
    sample_limit: usize,
    /// Dot-directories the sample still descends into
    include_hidden: Vec<String>,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            include_hidden: Vec::new(),
        }
    }
}

impl LanguageDetector {
    pub fn with_sample_limit(sample_limit: usize) -> Self {
        Self {
            sample_limit,
            ..Self::default()
        }
    }

    /// Let the sample enter these dot-directories, as the walker does.
    pub fn include_hidden(mut self, names: &[String]) -> Self {
        self.include_hidden = names.to_vec();
        self
    }

    /// Sorted, deduplicated languages found under `root`.
    ///
    /// An inaccessible root yields an empty list.
    pub fn detect(&self, root: &Path) -> Vec<Language> {
        let mut found: BTreeSet<Language> = self.from_markers(root).into_iter().collect();
        found.extend(self.from_sample(root));

        debug!(root = %root.display(), languages = ?found, "Detected languages");
        found.into_iter().collect()
    }

    /// Languages announced by manifest files at the root.
    pub fn from_markers(&self, root: &Path) -> Vec<Language> {
        self.markers
            .iter()
            .filter(|marker| match root.join(marker.name).try_exists() {
                Ok(exists) => exists,
                Err(e) => {
                    trace!(marker = marker.name, error = %e, "Could not check marker existence");
                    false
                }
            })
            .map(|marker| marker.language)
            .collect()
    }

    /// Languages inferred from extensions in a capped walk of the tree.
    pub fn from_sample(&self, root: &Path) -> BTreeSet<Language> {
        let mut extensions = BTreeSet::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if name.starts_with('.') && !self.include_hidden.iter().any(|h| *h == name) {
                    return false;
                }
                !is_statically_excluded(&name)
            });

        for entry in walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .take(self.sample_limit)
        {
            if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
                extensions.insert(ext.to_ascii_lowercase());
            }
        }

        trace!(extensions = ?extensions, "Sampled extensions");
        extensions
            .iter()
            .filter_map(|ext| Language::from_extension(ext))
            .collect()
    }
}
