use std::time::Duration;

use codeatlas::config::IndexerConfig;
use codeatlas::error::IndexError;
use codeatlas::language::Language;
use codeatlas::scanner::AstGrepCli;
use codeatlas::IndexService;

use crate::helpers::scripted_tool::ScriptedTool;
use crate::helpers::test_harness::TestHarness;

fn names(entries: &[codeatlas::model::SymbolEntry]) -> Vec<(&str, bool)> {
    entries.iter().map(|e| (e.name.as_str(), e.exported)).collect()
}

#[tokio::test]
async fn test_explicit_exports_javascript() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    harness
        .create_test_file("src/a.js", "export function foo(){}\nfunction bar(){}\n")
        .unwrap();

    let (index, _) = harness.service().build().await.unwrap();
    let record = &index.files["src/a.js"];

    assert_eq!(record.language, Language::JavaScript);
    assert_eq!(names(&record.symbols.exports), vec![("foo", true)]);
    assert_eq!(record.symbols.exports[0].kind, "function");
    assert_eq!(
        names(&record.symbols.functions),
        vec![("bar", false), ("foo", true)]
    );
    assert_eq!(record.symbols.functions[0].line, Some(2));
}

#[tokio::test]
async fn test_python_underscore_convention() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    harness
        .create_test_file("pkg/tasks.py", "def _helper(): pass\ndef run(): pass\n")
        .unwrap();

    let (index, _) = harness.service().build().await.unwrap();
    let record = &index.files["pkg/tasks.py"];

    assert_eq!(names(&record.symbols.exports), vec![("run", true)]);
    assert_eq!(
        names(&record.symbols.functions),
        vec![("_helper", false), ("run", true)]
    );
}

#[tokio::test]
async fn test_go_capitalization_convention() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    harness
        .create_test_file("work/work.go", "package work\n\nfunc DoWork(){}\nfunc doWork(){}\n")
        .unwrap();

    let (index, _) = harness.service().build().await.unwrap();
    let record = &index.files["work/work.go"];

    assert_eq!(names(&record.symbols.exports), vec![("DoWork", true)]);
    assert_eq!(record.symbols.exports[0].kind, "function");
}

#[tokio::test]
async fn test_batches_of_one_hundred() {
    let harness = TestHarness::new(ScriptedTool::new()).unwrap();
    for i in 0..250 {
        harness
            .create_test_file(&format!("pkg/f{:03}.go", i), "package pkg\n")
            .unwrap();
    }

    let (index, report) = harness.service().build().await.unwrap();
    assert_eq!(index.files.len(), 250);

    let calls = harness.tool.calls_for("func $NAME($$$PARAMS) { $$$BODY }");
    let sizes: Vec<_> = calls.iter().map(|c| c.files.len()).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
    assert!(calls.iter().all(|c| c.dialect == "go"));
    assert!(calls.iter().all(|c| c.timeout == Duration::from_secs(300)));

    // Every Go pattern is issued once per batch
    assert_eq!(report.invocations % 3, 0);
    assert_eq!(report.invocations, harness.tool.calls().len());
}

#[tokio::test]
async fn test_malformed_line_is_dropped() {
    let tool = ScriptedTool::common().malformed("function $NAME($$$PARAMS) { $$$BODY }");
    let harness = TestHarness::new(tool).unwrap();
    harness
        .create_test_file("a.js", "function one(){}\nfunction two(){}\n")
        .unwrap();

    let (index, report) = harness.service().build().await.unwrap();
    assert_eq!(
        names(&index.files["a.js"].symbols.functions),
        vec![("one", false), ("two", false)]
    );
    assert!(report.malformed_lines >= 1);
    assert!(index.stats.errors.is_empty());
}

#[tokio::test]
async fn test_failed_invocation_is_recorded() {
    let tool = ScriptedTool::common().failing("def $NAME($$$PARAMS): $$$BODY");
    let harness = TestHarness::new(tool).unwrap();
    harness.create_test_file("m.py", "def run(): pass\n").unwrap();

    let (index, _) = harness.service().build().await.unwrap();
    assert!(index.files["m.py"].symbols.functions.is_empty());
    assert_eq!(index.stats.errors.len(), 1);
    assert!(index.stats.errors[0].path.is_none());
    assert!(index.stats.errors[0].message.contains("def $NAME"));
}

#[tokio::test]
async fn test_imports_feed_dependencies() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    harness
        .create_test_file(
            "src/app.js",
            "import { parse } from './util'\nimport { x } from 'lib'\n",
        )
        .unwrap();
    harness
        .create_test_file("src/util.js", "export function parse(){}\n")
        .unwrap();

    let (index, _) = harness.service().build().await.unwrap();
    assert_eq!(
        index.dependencies["src/app.js"],
        vec!["./util".to_string(), "lib".to_string()]
    );
    assert!(!index.dependencies.contains_key("src/util.js"));
}

#[tokio::test]
async fn test_rescan_is_idempotent() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    harness
        .create_test_file("a.js", "export function foo(){}\nimport { y } from './b'\n")
        .unwrap();
    harness.create_test_file("b.py", "def run(): pass\n").unwrap();
    harness.create_test_file("c.go", "func Serve(){}\n").unwrap();

    let service = harness.service();
    let (first, _) = service.build().await.unwrap();
    let (second, _) = service.build().await.unwrap();

    assert_eq!(first.files, second.files);
    assert_eq!(first.dependencies, second.dependencies);
    assert_eq!(first.detected_languages, second.detected_languages);
}

#[tokio::test]
async fn test_excluded_directories_are_not_scanned() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    harness.create_test_file("a.js", "function a(){}\n").unwrap();
    harness
        .create_test_file("node_modules/dep/index.js", "function dep(){}\n")
        .unwrap();
    harness
        .create_test_file(".hidden/b.js", "function b(){}\n")
        .unwrap();

    let (index, _) = harness.service().build().await.unwrap();
    assert_eq!(index.files.keys().collect::<Vec<_>>(), vec!["a.js"]);
}

#[tokio::test]
async fn test_missing_tool_leaves_cache_alone() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    harness.create_test_file("a.js", "function a(){}\n").unwrap();

    let mut config = harness.config.clone();
    config.indexer.tool_binary = Some("no-such-structural-search-binary".to_string());

    let result = IndexService::new(harness.path().to_path_buf(), config).await;
    assert!(matches!(result, Err(IndexError::ToolUnavailable { .. })));
    assert!(!harness.store().path().exists());
}

/// Runs against the real CLI when it is installed.
#[tokio::test]
async fn test_live_ast_grep() {
    let tool = match AstGrepCli::locate(&IndexerConfig::default()).await {
        Ok(tool) => tool,
        Err(_) => {
            eprintln!("ast-grep not installed, skipping");
            return;
        }
    };

    let harness = TestHarness::new(ScriptedTool::new()).unwrap();
    harness
        .create_test_file("a.js", "export function foo() {}\nfunction bar() {}\n")
        .unwrap();
    let service = IndexService::with_tool(
        harness.path().to_path_buf(),
        harness.config.clone(),
        std::sync::Arc::new(tool),
    );

    let (index, _) = service.build().await.unwrap();
    let record = &index.files["a.js"];
    assert_eq!(names(&record.symbols.exports), vec![("foo", true)]);
    let functions = names(&record.symbols.functions);
    assert!(functions.contains(&("bar", false)));
    assert!(functions.contains(&("foo", true)));
}
