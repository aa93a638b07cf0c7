//! Static pattern table: language -> category -> ordered queries.
//!
//! Order matters. Within one file and category the first query to produce a
//! name wins, so more specific patterns come first.

use std::path::Path;

use crate::language::Language;

/// Symbol categories a query can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Exports,
    Functions,
    Classes,
    Types,
    Constants,
    Imports,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Exports,
        Category::Functions,
        Category::Classes,
        Category::Types,
        Category::Constants,
        Category::Imports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exports => "exports",
            Self::Functions => "functions",
            Self::Classes => "classes",
            Self::Types => "types",
            Self::Constants => "constants",
            Self::Imports => "imports",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How names are pulled out of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// One identifier, from a placeholder or the matched text
    SingleName,
    /// `{ a, b as c }`, preferring aliases
    ExportList,
    /// `{ a, b: c, d() {} }` property keys
    ObjectLiteral,
}

/// Post-extraction constraint on accepted names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFilter {
    /// `SCREAMING_SNAKE` only
    UpperSnake,
}

/// One structural pattern and how to read its matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefinition {
    pub pattern: &'static str,
    pub kind: &'static str,
    pub mode: ExtractionMode,
    pub name_variable: Option<&'static str>,
    pub source_variable: Option<&'static str>,
    /// Several comma-separated sources in one statement
    pub multi_source: bool,
    pub extra: Option<&'static str>,
    pub name_filter: Option<NameFilter>,
}

impl QueryDefinition {
    const fn base(pattern: &'static str, kind: &'static str, mode: ExtractionMode) -> Self {
        Self {
            pattern,
            kind,
            mode,
            name_variable: None,
            source_variable: None,
            multi_source: false,
            extra: None,
            name_filter: None,
        }
    }

    pub const fn name(pattern: &'static str, kind: &'static str) -> Self {
        Self::base(pattern, kind, ExtractionMode::SingleName).with_name_variable("NAME")
    }

    pub const fn list(pattern: &'static str, kind: &'static str) -> Self {
        Self::base(pattern, kind, ExtractionMode::ExportList)
    }

    pub const fn object(pattern: &'static str, kind: &'static str) -> Self {
        Self::base(pattern, kind, ExtractionMode::ObjectLiteral)
    }

    pub const fn import(pattern: &'static str, kind: &'static str) -> Self {
        Self::base(pattern, kind, ExtractionMode::SingleName).with_source_variable("SOURCE")
    }

    pub const fn with_name_variable(self, variable: &'static str) -> Self {
        Self {
            name_variable: Some(variable),
            ..self
        }
    }

    pub const fn with_source_variable(self, variable: &'static str) -> Self {
        Self {
            source_variable: Some(variable),
            ..self
        }
    }

    pub const fn multi(self) -> Self {
        Self {
            multi_source: true,
            ..self
        }
    }

    pub const fn extra(self, extra: &'static str) -> Self {
        Self {
            extra: Some(extra),
            ..self
        }
    }

    pub const fn filter(self, filter: NameFilter) -> Self {
        Self {
            name_filter: Some(filter),
            ..self
        }
    }
}

type Q = QueryDefinition;

// ── JavaScript (shared with TypeScript) ─────────────────────────────────

const JS_EXPORTS: &[Q] = &[
    Q::name("export default function $NAME($$$PARAMS) { $$$BODY }", "function").extra("default"),
    Q::name("export async function $NAME($$$PARAMS) { $$$BODY }", "function").extra("async"),
    Q::name("export function $NAME($$$PARAMS) { $$$BODY }", "function"),
    Q::name("export function* $NAME($$$PARAMS) { $$$BODY }", "function").extra("generator"),
    Q::name("export default class $NAME { $$$BODY }", "class").extra("default"),
    Q::name("export class $NAME extends $BASE { $$$BODY }", "class"),
    Q::name("export class $NAME { $$$BODY }", "class"),
    Q::name("export const $NAME = $VALUE", "constant"),
    Q::name("export let $NAME = $VALUE", "variable"),
    Q::name("export var $NAME = $VALUE", "variable"),
    Q::list("export { $$$NAMES } from $SOURCE", "reexport"),
    Q::list("export { $$$NAMES }", "export"),
    Q::object("module.exports = { $$$PROPS }", "export"),
    Q::name("exports.$NAME = $VALUE", "export"),
    Q::name("module.exports.$NAME = $VALUE", "export"),
];

const JS_FUNCTIONS: &[Q] = &[
    Q::name("async function $NAME($$$PARAMS) { $$$BODY }", "function").extra("async"),
    Q::name("function $NAME($$$PARAMS) { $$$BODY }", "function"),
    Q::name("function* $NAME($$$PARAMS) { $$$BODY }", "function").extra("generator"),
    Q::name("const $NAME = async ($$$PARAMS) => $BODY", "function").extra("async"),
    Q::name("const $NAME = ($$$PARAMS) => $BODY", "function").extra("arrow"),
    Q::name("const $NAME = function($$$PARAMS) { $$$BODY }", "function"),
];

const JS_CLASSES: &[Q] = &[
    Q::name("class $NAME extends $BASE { $$$BODY }", "class"),
    Q::name("class $NAME { $$$BODY }", "class"),
];

const JS_CONSTANTS: &[Q] = &[Q::name("const $NAME = $VALUE", "constant")];

const JS_IMPORTS: &[Q] = &[
    Q::import("import { $$$NAMES } from $SOURCE", "named"),
    Q::import("import * as $NAME from $SOURCE", "namespace"),
    Q::import("import $NAME from $SOURCE", "default"),
    Q::import("export { $$$NAMES } from $SOURCE", "reexport"),
    Q::import("export * from $SOURCE", "reexport"),
    Q::import("require($SOURCE)", "require"),
    Q::import("import($SOURCE)", "dynamic"),
];

// ── TypeScript additions ────────────────────────────────────────────────

const TS_EXPORTS: &[Q] = &[
    Q::name("export abstract class $NAME { $$$BODY }", "class"),
    Q::name("export interface $NAME extends $BASE { $$$BODY }", "interface"),
    Q::name("export interface $NAME { $$$BODY }", "interface"),
    Q::name("export type $NAME = $TYPE", "type"),
    Q::name("export enum $NAME { $$$BODY }", "enum"),
    Q::name("export const enum $NAME { $$$BODY }", "enum"),
];

const TS_CLASSES: &[Q] = &[Q::name("abstract class $NAME { $$$BODY }", "class")];

const TS_TYPES: &[Q] = &[
    Q::name("interface $NAME extends $BASE { $$$BODY }", "interface"),
    Q::name("interface $NAME { $$$BODY }", "interface"),
    Q::name("type $NAME = $TYPE", "type"),
    Q::name("enum $NAME { $$$BODY }", "enum"),
    Q::name("const enum $NAME { $$$BODY }", "enum"),
];

const TS_IMPORTS: &[Q] = &[Q::import("import type { $$$NAMES } from $SOURCE", "type")];

// ── Python ──────────────────────────────────────────────────────────────

const PY_FUNCTIONS: &[Q] = &[
    Q::name("async def $NAME($$$PARAMS) -> $RET: $$$BODY", "function").extra("async"),
    Q::name("async def $NAME($$$PARAMS): $$$BODY", "function").extra("async"),
    Q::name("def $NAME($$$PARAMS) -> $RET: $$$BODY", "function"),
    Q::name("def $NAME($$$PARAMS): $$$BODY", "function"),
];

const PY_CLASSES: &[Q] = &[
    Q::name("class $NAME($$$BASES): $$$BODY", "class"),
    Q::name("class $NAME: $$$BODY", "class"),
];

const PY_TYPES: &[Q] = &[
    Q::name("type $NAME = $VALUE", "type"),
    Q::name("$NAME = TypeVar($$$ARGS)", "typevar"),
    Q::name("$NAME = NewType($$$ARGS)", "type"),
];

const PY_CONSTANTS: &[Q] = &[
    Q::name("$NAME: $TYPE = $VALUE", "constant").filter(NameFilter::UpperSnake),
    Q::name("$NAME = $VALUE", "constant").filter(NameFilter::UpperSnake),
];

const PY_IMPORTS: &[Q] = &[
    Q::import("from $SOURCE import $$$NAMES", "from"),
    Q::import("import $$$MODULES", "import").multi(),
];

// ── Go ──────────────────────────────────────────────────────────────────

const GO_FUNCTIONS: &[Q] = &[
    Q::name("func ($RECV) $NAME($$$PARAMS) $RET { $$$BODY }", "method"),
    Q::name("func ($RECV) $NAME($$$PARAMS) { $$$BODY }", "method"),
    Q::name("func $NAME($$$PARAMS) $RET { $$$BODY }", "function"),
    Q::name("func $NAME($$$PARAMS) { $$$BODY }", "function"),
];

const GO_TYPES: &[Q] = &[
    Q::name("type $NAME struct { $$$FIELDS }", "struct"),
    Q::name("type $NAME interface { $$$METHODS }", "interface"),
    Q::name("type $NAME $TYPE", "type"),
];

const GO_CONSTANTS: &[Q] = &[
    Q::name("const $NAME $TYPE = $VALUE", "constant"),
    Q::name("const $NAME = $VALUE", "constant"),
];

const GO_IMPORTS: &[Q] = &[
    Q::import("import ( $$$SPECS )", "import").multi(),
    Q::import("import $ALIAS $SOURCE", "import"),
    Q::import("import $SOURCE", "import"),
];

// ── Rust ────────────────────────────────────────────────────────────────

const RS_EXPORTS: &[Q] = &[
    Q::name("pub async fn $NAME($$$PARAMS) -> $RET { $$$BODY }", "function").extra("async"),
    Q::name("pub async fn $NAME($$$PARAMS) { $$$BODY }", "function").extra("async"),
    Q::name("pub fn $NAME($$$PARAMS) -> $RET { $$$BODY }", "function"),
    Q::name("pub fn $NAME($$$PARAMS) { $$$BODY }", "function"),
    Q::name("pub struct $NAME { $$$FIELDS }", "struct"),
    Q::name("pub struct $NAME($$$FIELDS);", "struct"),
    Q::name("pub struct $NAME;", "struct"),
    Q::name("pub enum $NAME { $$$VARIANTS }", "enum"),
    Q::name("pub trait $NAME { $$$BODY }", "trait"),
    Q::name("pub type $NAME = $TYPE;", "type"),
    Q::name("pub const $NAME: $TYPE = $VALUE;", "constant"),
    Q::name("pub static $NAME: $TYPE = $VALUE;", "static"),
    Q::name("pub mod $NAME;", "module"),
];

const RS_FUNCTIONS: &[Q] = &[
    Q::name("pub async fn $NAME($$$PARAMS) -> $RET { $$$BODY }", "function").extra("async"),
    Q::name("pub async fn $NAME($$$PARAMS) { $$$BODY }", "function").extra("async"),
    Q::name("pub fn $NAME($$$PARAMS) -> $RET { $$$BODY }", "function"),
    Q::name("pub fn $NAME($$$PARAMS) { $$$BODY }", "function"),
    Q::name("async fn $NAME($$$PARAMS) -> $RET { $$$BODY }", "function").extra("async"),
    Q::name("async fn $NAME($$$PARAMS) { $$$BODY }", "function").extra("async"),
    Q::name("fn $NAME($$$PARAMS) -> $RET { $$$BODY }", "function"),
    Q::name("fn $NAME($$$PARAMS) { $$$BODY }", "function"),
];

const RS_CLASSES: &[Q] = &[
    Q::name("pub struct $NAME { $$$FIELDS }", "struct"),
    Q::name("pub struct $NAME($$$FIELDS);", "struct"),
    Q::name("pub struct $NAME;", "struct"),
    Q::name("struct $NAME { $$$FIELDS }", "struct"),
    Q::name("struct $NAME($$$FIELDS);", "struct"),
    Q::name("struct $NAME;", "struct"),
    Q::name("pub trait $NAME { $$$BODY }", "trait"),
    Q::name("trait $NAME { $$$BODY }", "trait"),
];

const RS_TYPES: &[Q] = &[
    Q::name("pub enum $NAME { $$$VARIANTS }", "enum"),
    Q::name("enum $NAME { $$$VARIANTS }", "enum"),
    Q::name("pub type $NAME = $TYPE;", "type"),
    Q::name("type $NAME = $TYPE;", "type"),
];

const RS_CONSTANTS: &[Q] = &[
    Q::name("pub const $NAME: $TYPE = $VALUE;", "constant"),
    Q::name("const $NAME: $TYPE = $VALUE;", "constant"),
    Q::name("pub static $NAME: $TYPE = $VALUE;", "static"),
    Q::name("static $NAME: $TYPE = $VALUE;", "static"),
];

const RS_IMPORTS: &[Q] = &[
    Q::import("pub use $SOURCE;", "reexport"),
    Q::import("use $SOURCE;", "use"),
    Q::import("extern crate $SOURCE;", "crate"),
];

/// Ordered query groups for a language and category.
///
/// TypeScript reuses the JavaScript tables and appends its own.
fn groups(language: Language, category: Category) -> &'static [&'static [Q]] {
    use Category::*;
    use Language::*;

    match (language, category) {
        (JavaScript, Exports) => &[JS_EXPORTS],
        (JavaScript, Functions) => &[JS_FUNCTIONS],
        (JavaScript, Classes) => &[JS_CLASSES],
        (JavaScript, Types) => &[],
        (JavaScript, Constants) => &[JS_CONSTANTS],
        (JavaScript, Imports) => &[JS_IMPORTS],

        (TypeScript, Exports) => &[TS_EXPORTS, JS_EXPORTS],
        (TypeScript, Functions) => &[JS_FUNCTIONS],
        (TypeScript, Classes) => &[TS_CLASSES, JS_CLASSES],
        (TypeScript, Types) => &[TS_TYPES],
        (TypeScript, Constants) => &[JS_CONSTANTS],
        (TypeScript, Imports) => &[TS_IMPORTS, JS_IMPORTS],

        (Python, Exports) => &[],
        (Python, Functions) => &[PY_FUNCTIONS],
        (Python, Classes) => &[PY_CLASSES],
        (Python, Types) => &[PY_TYPES],
        (Python, Constants) => &[PY_CONSTANTS],
        (Python, Imports) => &[PY_IMPORTS],

        (Go, Exports) => &[],
        (Go, Functions) => &[GO_FUNCTIONS],
        (Go, Classes) => &[],
        (Go, Types) => &[GO_TYPES],
        (Go, Constants) => &[GO_CONSTANTS],
        (Go, Imports) => &[GO_IMPORTS],

        (Rust, Exports) => &[RS_EXPORTS],
        (Rust, Functions) => &[RS_FUNCTIONS],
        (Rust, Classes) => &[RS_CLASSES],
        (Rust, Types) => &[RS_TYPES],
        (Rust, Constants) => &[RS_CONSTANTS],
        (Rust, Imports) => &[RS_IMPORTS],
    }
}

/// Queries for a language and category, in evaluation order.
pub fn queries(
    language: Language,
    category: Category,
) -> impl Iterator<Item = &'static QueryDefinition> {
    groups(language, category).iter().flat_map(|group| group.iter())
}

/// Identifier the structural-search tool expects for a sub-syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dialect {
    Go,
    JavaScript,
    Python,
    Rust,
    Tsx,
    TypeScript,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Tsx => "tsx",
            Self::TypeScript => "typescript",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a file to the dialect its syntax needs.
pub fn dialect_for(path: &str, language: Language) -> Dialect {
    match language {
        Language::Go => Dialect::Go,
        Language::JavaScript => Dialect::JavaScript,
        Language::Python => Dialect::Python,
        Language::Rust => Dialect::Rust,
        Language::TypeScript => {
            let is_tsx = Path::new(path)
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("tsx"));
            if is_tsx {
                Dialect::Tsx
            } else {
                Dialect::TypeScript
            }
        }
    }
}
