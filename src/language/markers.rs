//! Language definitions and the manifest markers that announce them.
//!
//! A marker is a file whose presence at the repository root is a fast signal
//! that a language is in use. Extensions are the slow signal, gathered by
//! sampling the tree.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Languages the engine knows how to index.
///
/// Variant order matches the lowercase identifiers so derived ordering sorts
/// languages by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    JavaScript,
    Python,
    Rust,
    TypeScript,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Go,
        Language::JavaScript,
        Language::Python,
        Language::Rust,
        Language::TypeScript,
    ];

    /// File extensions (without the dot) that belong to this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Go => &["go"],
            Self::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Self::Python => &["py", "pyi"],
            Self::Rust => &["rs"],
            Self::TypeScript => &["ts", "mts", "cts", "tsx"],
        }
    }

    /// Lowercase identifier, as persisted in the cache file.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::TypeScript => "typescript",
        }
    }

    /// Map a single extension back to its language.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }

    /// Language of a path, judged by its extension.
    pub fn for_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.id() == id)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A manifest or config file whose presence signals a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageMarker {
    /// Name of the marker file at the repository root
    pub name: &'static str,
    /// Language this marker indicates
    pub language: Language,
}

impl LanguageMarker {
    pub const fn new(name: &'static str, language: Language) -> Self {
        Self { name, language }
    }
}

/// Canonical manifests checked on the fast path.
pub const DEFAULT_MARKERS: &[LanguageMarker] = &[
    LanguageMarker::new("go.mod", Language::Go),
    LanguageMarker::new("package.json", Language::JavaScript),
    LanguageMarker::new("pyproject.toml", Language::Python),
    LanguageMarker::new("setup.py", Language::Python),
    LanguageMarker::new("setup.cfg", Language::Python),
    LanguageMarker::new("requirements.txt", Language::Python),
    LanguageMarker::new("Pipfile", Language::Python),
    LanguageMarker::new("Cargo.toml", Language::Rust),
    LanguageMarker::new("tsconfig.json", Language::TypeScript),
];
