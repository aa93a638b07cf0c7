//! Turning a match record into symbol names and import sources.

use lazy_static::lazy_static;
use regex::Regex;

use super::catalog::{ExtractionMode, NameFilter, QueryDefinition};
use crate::scanner::ToolMatch;

/// Placeholders tried, in order, when the query names none or it is absent.
const PLACEHOLDER_NAMES: &[&str] = &["NAME", "N", "ID", "IDENT"];

lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_$][\w$]*$").expect("Failed to compile IDENTIFIER regex");
    static ref DECLARATION_NAME: Regex = Regex::new(
        r"\b(?:function\*?|class|interface|enum|type|const|let|var|def|func|fn|struct|trait|static|mod)\s+([A-Za-z_$][\w$]*)"
    )
    .expect("Failed to compile DECLARATION_NAME regex");
    static ref ASSIGNMENT_NAME: Regex =
        Regex::new(r"^\s*([A-Za-z_$][\w$]*)\s*(?::[^=]*)?=").expect("Failed to compile ASSIGNMENT_NAME regex");
    static ref UPPER_SNAKE: Regex =
        Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("Failed to compile UPPER_SNAKE regex");
    static ref QUOTED_SOURCE: Regex =
        Regex::new(r#"["'`]([^"'`]+)["'`]"#).expect("Failed to compile QUOTED_SOURCE regex");
}

/// Symbol names a match declares, after the query's name filter.
pub fn extract_names(query: &QueryDefinition, record: &ToolMatch) -> Vec<String> {
    let names = match query.mode {
        ExtractionMode::SingleName => single_name(query, record).into_iter().collect(),
        ExtractionMode::ExportList => braces_body(&record.text)
            .map(parse_export_list)
            .unwrap_or_default(),
        ExtractionMode::ObjectLiteral => braces_body(&record.text)
            .map(parse_object_keys)
            .unwrap_or_default(),
    };

    match query.name_filter {
        Some(NameFilter::UpperSnake) => names
            .into_iter()
            .filter(|name| UPPER_SNAKE.is_match(name))
            .collect(),
        None => names,
    }
}

/// Import sources a match refers to.
pub fn extract_sources(query: &QueryDefinition, record: &ToolMatch) -> Vec<String> {
    if query.multi_source {
        return split_sources(&record.text);
    }

    if let Some(variable) = query.source_variable {
        if let Some(text) = record.single(variable) {
            let source = strip_quotes(text);
            if !source.is_empty() {
                return vec![source.to_string()];
            }
        }
    }

    QUOTED_SOURCE
        .captures(&record.text)
        .map(|caps| vec![caps[1].to_string()])
        .unwrap_or_default()
}

fn single_name(query: &QueryDefinition, record: &ToolMatch) -> Option<String> {
    let from_placeholder = query
        .name_variable
        .into_iter()
        .chain(PLACEHOLDER_NAMES.iter().copied())
        .filter_map(|variable| record.single(variable))
        .map(str::trim)
        .find(|text| IDENTIFIER.is_match(text));
    if let Some(name) = from_placeholder {
        return Some(name.to_string());
    }

    DECLARATION_NAME
        .captures(&record.text)
        .or_else(|| ASSIGNMENT_NAME.captures(&record.text))
        .map(|caps| caps[1].to_string())
}

/// Text between the first `{` and its matching `}`.
fn braces_body(text: &str) -> Option<&str> {
    let open = text.find('{')?;
    let mut depth = 0usize;
    for (offset, c) in text[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open + 1..open + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// `a, b as c, type T` -> `[a, c, T]`
fn parse_export_list(body: &str) -> Vec<String> {
    body.split(',')
        .filter_map(|item| {
            let item = item.trim();
            let item = item.strip_prefix("type ").map(str::trim).unwrap_or(item);
            let name = match item.split_once(" as ") {
                Some((_, alias)) => alias.trim(),
                None => item,
            };
            let name = strip_quotes(name);
            (!name.is_empty() && name != "*").then(|| name.to_string())
        })
        .collect()
}

/// Keys of `{ a, b: 1, c() {}, async d() {}, 'e': 2 }`; spreads and computed
/// keys are skipped.
fn parse_object_keys(body: &str) -> Vec<String> {
    split_top_level(body)
        .into_iter()
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() || entry.starts_with("...") || entry.starts_with('[') {
                return None;
            }
            let entry = entry.strip_prefix("async ").map(str::trim_start).unwrap_or(entry);
            let end = entry.find([':', '(']).unwrap_or(entry.len());
            let key = strip_quotes(entry[..end].trim());
            (!key.is_empty()).then(|| key.to_string())
        })
        .collect()
}

/// Split at commas outside brackets and string literals.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Sources of one statement listing several: quoted strings when there are
/// any (`import ( "fmt" "os" )`), else comma-separated dotted names
/// (`import os, sys as system`).
fn split_sources(text: &str) -> Vec<String> {
    let quoted: Vec<String> = QUOTED_SOURCE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect();
    if !quoted.is_empty() {
        return quoted;
    }

    let body = text.trim();
    let body = body.strip_prefix("import").unwrap_or(body);
    body.split(',')
        .filter_map(|item| item.split_whitespace().next())
        .filter(|module| !module.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_quotes(text: &str) -> &str {
    let text = text.trim();
    for q in ['"', '\'', '`'] {
        if let Some(inner) = text.strip_prefix(q).and_then(|t| t.strip_suffix(q)) {
            return inner.trim();
        }
    }
    text
}
