use async_trait::async_trait;
use regex::Regex;
use std::sync::Mutex;
use std::time::Duration;

use codeatlas::scanner::{InvocationError, SearchRequest, StructuralSearch};

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct Call {
    pub pattern: String,
    pub dialect: String,
    pub files: Vec<String>,
    pub timeout: Duration,
}

struct Rule {
    pattern: String,
    line: Regex,
}

/// Stand-in for the structural search CLI.
///
/// Each rule maps a catalog pattern to a line regex; named capture groups
/// become single metavariables. Output is the same NDJSON stream the real
/// tool emits.
#[derive(Default)]
pub struct ScriptedTool {
    rules: Vec<Rule>,
    malformed: Vec<String>,
    failing: Vec<String>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, pattern: &str, line: &str) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            line: Regex::new(line).unwrap(),
        });
        self
    }

    /// Append a garbage line to every stream produced for `pattern`.
    pub fn malformed(mut self, pattern: &str) -> Self {
        self.malformed.push(pattern.to_string());
        self
    }

    /// Make every invocation of `pattern` fail with exit code 2.
    pub fn failing(mut self, pattern: &str) -> Self {
        self.failing.push(pattern.to_string());
        self
    }

    /// Rules for the small JavaScript, Python and Go fixtures.
    pub fn common() -> Self {
        Self::new()
            .rule(
                "export function $NAME($$$PARAMS) { $$$BODY }",
                r"^export function (?P<NAME>\w+)\(",
            )
            .rule(
                "function $NAME($$$PARAMS) { $$$BODY }",
                r"^(?:export )?function (?P<NAME>\w+)\(",
            )
            .rule(
                "import { $$$NAMES } from $SOURCE",
                r#"^import \{[^}]*\} from (?P<SOURCE>['"][^'"]+['"])"#,
            )
            .rule("def $NAME($$$PARAMS): $$$BODY", r"^def (?P<NAME>\w+)\(")
            .rule("func $NAME($$$PARAMS) { $$$BODY }", r"^func (?P<NAME>\w+)\(\)")
            .rule("import $SOURCE", r#"^import (?P<SOURCE>"[^"]+")"#)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, pattern: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| call.pattern == pattern)
            .collect()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl StructuralSearch for ScriptedTool {
    async fn run(&self, request: &SearchRequest<'_>) -> Result<String, InvocationError> {
        self.calls.lock().unwrap().push(Call {
            pattern: request.pattern.to_string(),
            dialect: request.dialect.to_string(),
            files: request.files.to_vec(),
            timeout: request.timeout,
        });

        if self.failing.iter().any(|p| p == request.pattern) {
            return Err(InvocationError::Failed {
                code: Some(2),
                stderr: "scripted failure".to_string(),
            });
        }

        let mut out = String::new();
        for rule in self.rules.iter().filter(|r| r.pattern == request.pattern) {
            for file in request.files {
                let source = std::fs::read_to_string(request.root.join(file))?;
                for (line, text) in source.lines().enumerate() {
                    let Some(caps) = rule.line.captures(text) else {
                        continue;
                    };
                    let mut single = serde_json::Map::new();
                    for name in rule.line.capture_names().flatten() {
                        if let Some(m) = caps.name(name) {
                            single.insert(name.to_string(), serde_json::json!({ "text": m.as_str() }));
                        }
                    }
                    let record = serde_json::json!({
                        "file": file,
                        "text": text,
                        "range": { "start": { "line": line, "column": caps.get(0).unwrap().start() } },
                        "metaVariables": { "single": single, "multi": {} }
                    });
                    out.push_str(&record.to_string());
                    out.push('\n');
                }
            }
        }

        if self.malformed.iter().any(|p| p == request.pattern) {
            out.push_str("{\"file\": \"truncated\n");
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
