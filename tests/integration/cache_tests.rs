use codeatlas::cache::CacheLoad;
use codeatlas::symbol::IndexReader;

use crate::helpers::scripted_tool::ScriptedTool;
use crate::helpers::test_harness::TestHarness;

async fn saved_index(harness: &TestHarness) {
    harness
        .create_test_file("src/app.js", "import { parse } from './util'\nfunction main(){}\n")
        .unwrap();
    harness
        .create_test_file("src/util.js", "export function parse(){}\n")
        .unwrap();
    harness.create_test_file("tool.py", "def run(): pass\n").unwrap();
    harness.service().build_and_save().await.unwrap();
}

#[tokio::test]
async fn test_round_trip_is_byte_identical() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    saved_index(&harness).await;

    let store = harness.store();
    let first = std::fs::read(store.path()).unwrap();
    let index = store.load().unwrap();
    store.save(&index).unwrap();
    assert_eq!(std::fs::read(store.path()).unwrap(), first);

    // No temp file left behind
    assert!(!store.path().with_extension("json.tmp").exists());
}

#[tokio::test]
async fn test_absent_and_corrupted_are_distinct() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    assert!(matches!(harness.store().read(), CacheLoad::Absent));
    assert!(IndexReader::open(harness.path()).unwrap().is_none());
    assert!(codeatlas::cache::load(harness.path()).is_none());

    saved_index(&harness).await;
    std::fs::write(harness.store().path(), "{\"schemaVersion\": 1, \"files\": ").unwrap();
    assert!(matches!(harness.store().read(), CacheLoad::Corrupted(_)));
    assert!(IndexReader::open(harness.path()).is_err());
}

#[tokio::test]
async fn test_reader_over_saved_index() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    saved_index(&harness).await;

    let reader = IndexReader::open(harness.path()).unwrap().unwrap();
    assert_eq!(reader.list_files(), vec!["src/app.js", "src/util.js", "tool.py"]);

    let absolute = harness.path().join("src/util.js");
    let record = reader.get_file(absolute.to_str().unwrap()).unwrap();
    assert_eq!(record.symbols.exports[0].name, "parse");

    let sites = reader.get_symbol("parse");
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].path, "src/util.js");
    assert_eq!(sites[0].category, "functions");

    assert_eq!(reader.get_dependents("src/util.js"), vec!["src/app.js"]);
    assert!(reader.get_dependents("tool.py").is_empty());
}

#[tokio::test]
async fn test_reset_removes_cache() {
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    saved_index(&harness).await;

    assert!(harness.store().reset().unwrap());
    assert!(!harness.store().reset().unwrap());
    assert!(matches!(harness.store().read(), CacheLoad::Absent));
}
