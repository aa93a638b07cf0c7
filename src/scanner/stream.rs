//! Newline-delimited JSON match records from the structural-search tool.

use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Position {
    /// 0-based
    pub line: usize,
    /// 0-based
    pub column: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MatchRange {
    pub start: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CapturedNode {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetaVariables {
    #[serde(default)]
    pub single: BTreeMap<String, CapturedNode>,
    #[serde(default)]
    pub multi: BTreeMap<String, Vec<CapturedNode>>,
}

/// One streamed match. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolMatch {
    pub file: String,
    pub text: String,
    pub range: MatchRange,
    #[serde(default)]
    pub meta_variables: MetaVariables,
}

impl ToolMatch {
    /// 1-based line of the match start.
    pub fn line(&self) -> usize {
        self.range.start.line + 1
    }

    pub fn column(&self) -> usize {
        self.range.start.column
    }

    /// Text captured by a single placeholder (`$NAME`).
    pub fn single(&self, variable: &str) -> Option<&str> {
        self.meta_variables
            .single
            .get(variable)
            .map(|node| node.text.as_str())
    }

    /// Texts captured by a multi placeholder (`$$$NAMES`).
    pub fn multi(&self, variable: &str) -> Vec<&str> {
        self.meta_variables
            .multi
            .get(variable)
            .map(|nodes| nodes.iter().map(|node| node.text.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Parsed stream: the valid records plus how many lines were dropped.
#[derive(Debug, Default)]
pub struct ParsedStream {
    pub matches: Vec<ToolMatch>,
    pub malformed: usize,
}

/// Parse tool output line by line. A malformed line is dropped with a
/// warning and never fails the whole stream.
pub fn parse_match_stream(output: &str) -> ParsedStream {
    let mut parsed = ParsedStream::default();
    for (index, line) in output.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ToolMatch>(line) {
            Ok(record) => parsed.matches.push(record),
            Err(e) => {
                parsed.malformed += 1;
                let preview: String = line.chars().take(120).collect();
                warn!(line = index + 1, error = %e, preview = %preview, "Dropping malformed match record");
            }
        }
    }
    parsed
}
