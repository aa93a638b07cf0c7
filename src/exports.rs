//! Public-surface inference.
//!
//! Languages differ in how they declare what a file exposes. Some spell it
//! out (`export`, `pub`), Python has `__all__` and an underscore convention,
//! Go uses capitalization. [`ExportRule`] picks the rule per language and
//! [`ExportRule::infer`] completes the explicit export map accordingly.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::language::Language;

lazy_static! {
    /// `__all__ = [...]`, `__all__ = (...)`, `__all__ += [...]`, optionally annotated
    static ref DUNDER_ALL: Regex =
        Regex::new(r#"(?m)^__all__\s*(?::[^=\n]*)?\+?=\s*[\[(]([^\])]*)[\])]"#)
            .expect("Failed to compile DUNDER_ALL regex");
    static ref QUOTED: Regex = Regex::new(r#"['"]([^'"]+)['"]"#).expect("Failed to compile QUOTED regex");
}

/// A symbol as collected during a scan, before it is frozen into the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolDraft {
    /// 1-based; `None` only for synthesized exports
    pub line: Option<usize>,
    /// 0-based column of the match start
    pub column: usize,
    pub kind: String,
    pub extra: Option<String>,
    /// Some match of this name started at column 0, not only the first
    pub top_level: bool,
}

impl SymbolDraft {
    pub fn new(line: usize, column: usize, kind: impl Into<String>, extra: Option<String>) -> Self {
        Self {
            line: Some(line),
            column,
            kind: kind.into(),
            extra,
            top_level: column == 0,
        }
    }

    /// Fold in a later match of the same name. Position and kind stay with
    /// the first match.
    pub fn observe(&mut self, column: usize) {
        self.top_level |= column == 0;
    }
}

/// Name -> first draft seen for one category of one file.
pub type SymbolMap = BTreeMap<String, SymbolDraft>;

/// Declaration maps of one file, in lookup precedence order.
pub struct Declarations<'a> {
    pub functions: &'a SymbolMap,
    pub classes: &'a SymbolMap,
    pub types: &'a SymbolMap,
    pub constants: &'a SymbolMap,
}

impl<'a> Declarations<'a> {
    fn in_order(&self) -> [&'a SymbolMap; 4] {
        [self.functions, self.classes, self.types, self.constants]
    }

    /// First declaration of `name`, functions before classes before types
    /// before constants.
    pub fn find(&self, name: &str) -> Option<&'a SymbolDraft> {
        self.in_order().into_iter().find_map(|map| map.get(name))
    }

    fn iter(&self) -> impl Iterator<Item = (&'a String, &'a SymbolDraft)> {
        self.in_order().into_iter().flat_map(|map| map.iter())
    }
}

/// How a language declares its public surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRule {
    /// Explicit export matches are complete
    ExplicitOnly,
    /// `__all__` literal if present, else top-level names without a leading `_`
    DunderList,
    /// Exported iff the first character is an uppercase letter
    CapitalizationConvention,
}

impl ExportRule {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Python => Self::DunderList,
            Language::Go => Self::CapitalizationConvention,
            Language::JavaScript | Language::TypeScript | Language::Rust => Self::ExplicitOnly,
        }
    }

    /// Whether inference reads the file text.
    pub fn needs_source(&self) -> bool {
        matches!(self, Self::DunderList)
    }

    /// Names this rule exports on top of the explicit matches.
    pub fn inferred_names(&self, source: Option<&str>, declarations: &Declarations<'_>) -> BTreeSet<String> {
        match self {
            Self::ExplicitOnly => BTreeSet::new(),
            Self::DunderList => match source.and_then(dunder_all) {
                Some(listed) => listed,
                None => declarations
                    .iter()
                    .filter(|(name, draft)| draft.top_level && !name.starts_with('_'))
                    .map(|(name, _)| name.clone())
                    .collect(),
            },
            Self::CapitalizationConvention => declarations
                .iter()
                .filter(|(name, _)| is_capitalized(name))
                .map(|(name, _)| name.clone())
                .collect(),
        }
    }

    /// Complete `exports` with the inferred names.
    ///
    /// Explicit entries are kept as they are; every inferred name without one
    /// gets a synthesized entry pointing at its declaration when there is one.
    pub fn infer(&self, source: Option<&str>, exports: &mut SymbolMap, declarations: &Declarations<'_>) {
        for name in self.inferred_names(source, declarations) {
            if exports.contains_key(&name) {
                continue;
            }
            let draft = match declarations.find(&name) {
                Some(decl) => SymbolDraft {
                    line: decl.line,
                    column: decl.column,
                    kind: decl.kind.clone(),
                    extra: None,
                    top_level: decl.top_level,
                },
                None => SymbolDraft {
                    line: None,
                    column: 0,
                    kind: "export".to_string(),
                    extra: None,
                    top_level: true,
                },
            };
            exports.insert(name, draft);
        }
    }
}

/// Names listed in `__all__`, or `None` when the file has no such literal.
fn dunder_all(source: &str) -> Option<BTreeSet<String>> {
    let mut found = false;
    let mut names = BTreeSet::new();
    for caps in DUNDER_ALL.captures_iter(source) {
        found = true;
        for quoted in QUOTED.captures_iter(&caps[1]) {
            names.insert(quoted[1].trim().to_string());
        }
    }
    found.then_some(names)
}

fn is_capitalized(name: &str) -> bool {
    name.chars().next().is_some_and(|c| {
        c.is_uppercase() && c.to_lowercase().next().is_some_and(|lower| lower != c)
    })
}
