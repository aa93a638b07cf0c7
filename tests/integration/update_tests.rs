use codeatlas::engine::{RescanReason, UpdateOutcome};
use codeatlas::error::IndexError;
use codeatlas::incremental::UpdateSummary;

use crate::helpers::scripted_tool::ScriptedTool;
use crate::helpers::test_harness::{git_available, TestHarness};

fn incremental(outcome: UpdateOutcome) -> UpdateSummary {
    match outcome {
        UpdateOutcome::Incremental(summary) => summary,
        other => panic!("expected an incremental update, got {:?}", other),
    }
}

/// Repository with one file per language, committed and indexed.
async fn indexed_repo() -> Option<(TestHarness, String)> {
    if !git_available() {
        eprintln!("git not installed, skipping");
        return None;
    }
    let harness = TestHarness::new(ScriptedTool::common()).unwrap();
    harness.init_repo().unwrap();
    harness.create_test_file(".gitignore", ".codeatlas/\n").unwrap();
    harness
        .create_test_file("a.js", "export function foo(){}\n")
        .unwrap();
    harness.create_test_file("b.py", "def run(): pass\n").unwrap();
    harness
        .create_test_file("c.go", "package main\n\nimport \"fmt\"\n\nfunc Main(){}\n")
        .unwrap();
    let commit = harness.commit_all("initial").unwrap();

    harness.service().build_and_save().await.unwrap();
    Some((harness, commit))
}

#[tokio::test]
async fn test_update_applies_diff() {
    let Some((harness, base)) = indexed_repo().await else {
        return;
    };
    let before = harness.store().load().unwrap();
    assert_eq!(before.git_ref.commit.as_deref(), Some(base.as_str()));
    assert_eq!(before.git_ref.branch.as_deref(), Some("main"));
    assert!(before.dependencies.contains_key("c.go"));

    harness
        .create_test_file("a.js", "export function foo(){}\nfunction bar(){}\n")
        .unwrap();
    harness.remove_test_file("c.go").unwrap();
    harness.create_test_file("d.py", "def _hidden(): pass\n").unwrap();
    let head = harness.commit_all("change").unwrap();
    harness.tool.reset_calls();

    let summary = incremental(harness.service().update(None).await.unwrap());
    assert_eq!(summary.from.as_deref(), Some(base.as_str()));
    assert_eq!(summary.to.as_deref(), Some(head.as_str()));
    assert_eq!((summary.added, summary.replaced, summary.removed), (1, 1, 1));

    let after = harness.store().load().unwrap();
    assert_eq!(after.git_ref.commit.as_deref(), Some(head.as_str()));
    assert_eq!(after.generated, before.generated);
    assert!(after.updated >= before.updated);

    // Deleted file leaves no trace
    assert!(!after.files.contains_key("c.go"));
    assert!(!after.dependencies.contains_key("c.go"));

    let functions: Vec<_> = after.files["a.js"]
        .symbols
        .functions
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(functions, vec!["bar", "foo"]);
    assert!(after.files["d.py"].symbols.exports.is_empty());

    // Untouched file keeps its record and is never rescanned
    assert_eq!(after.files["b.py"], before.files["b.py"]);
    assert!(harness
        .tool
        .calls()
        .iter()
        .all(|call| !call.files.iter().any(|f| f == "b.py")));

    assert_eq!(after.stats.total_files, 3);
    assert_eq!(after.stats.total_symbols, 4);
}

#[tokio::test]
async fn test_rename_is_delete_plus_add() {
    let Some((harness, _)) = indexed_repo().await else {
        return;
    };
    harness.git(&["mv", "b.py", "e.py"]).unwrap();
    harness.commit_all("rename").unwrap();

    let summary = incremental(harness.service().update(None).await.unwrap());
    assert_eq!((summary.added, summary.removed), (1, 1));

    let index = harness.store().load().unwrap();
    assert!(!index.files.contains_key("b.py"));
    assert_eq!(index.files["e.py"].symbols.exports[0].name, "run");
}

#[tokio::test]
async fn test_unchanged_content_keeps_record() {
    let Some((harness, base)) = indexed_repo().await else {
        return;
    };
    harness
        .create_test_file("a.js", "export function foo(){}\nfunction bar(){}\n")
        .unwrap();
    harness.commit_all("change").unwrap();

    // Index the new content but pretend it was recorded at the base commit
    harness.service().build_and_save().await.unwrap();
    let mut index = harness.store().load().unwrap();
    index.git_ref.commit = Some(base);
    harness.store().save(&index).unwrap();
    harness.tool.reset_calls();

    let summary = incremental(harness.service().update(None).await.unwrap());
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.changed_files(), 0);
    assert!(harness.tool.calls().is_empty());

    let after = harness.store().load().unwrap();
    assert_eq!(after.files, index.files);
}

#[tokio::test]
async fn test_invalid_target_is_rejected() {
    let Some((harness, _)) = indexed_repo().await else {
        return;
    };
    let bytes = std::fs::read(harness.store().path()).unwrap();

    for target in ["main", "--output=/tmp/x", "abc", "HEAD~1"] {
        let result = harness.service().update(Some(target)).await;
        assert!(
            matches!(result, Err(IndexError::InvalidGitReference(_))),
            "{} should be rejected",
            target
        );
    }
    assert_eq!(std::fs::read(harness.store().path()).unwrap(), bytes);
}

#[tokio::test]
async fn test_index_skips_when_fresh() {
    let Some((harness, base)) = indexed_repo().await else {
        return;
    };
    let outcome = harness.service().ensure_indexed(false).await.unwrap();
    assert_eq!(outcome, UpdateOutcome::UpToDate { commit: base });

    let outcome = harness.service().ensure_indexed(true).await.unwrap();
    assert!(matches!(
        outcome,
        UpdateOutcome::Rescanned {
            reason: RescanReason::Forced,
            ..
        }
    ));
}

#[tokio::test]
async fn test_incompatible_cache_falls_back_to_full_scan() {
    let Some((harness, _)) = indexed_repo().await else {
        return;
    };
    let path = harness.store().path().to_path_buf();
    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, content.replace("\"schemaVersion\": 1", "\"schemaVersion\": 99")).unwrap();

    let outcome = harness.service().update(None).await.unwrap();
    match outcome {
        UpdateOutcome::Rescanned { reason, report } => {
            assert_eq!(reason, RescanReason::Incompatible { found: Some(99) });
            assert_eq!(report.files, 3);
        }
        other => panic!("expected a rescan, got {:?}", other),
    }
    assert!(harness.store().load().is_some());
}

#[tokio::test]
async fn test_unknown_cached_commit_falls_back_to_full_scan() {
    let Some((harness, head)) = indexed_repo().await else {
        return;
    };
    // Well-formed hash that the repository has never seen, as after a force-push
    let mut index = harness.store().load().unwrap();
    index.git_ref.commit = Some("deadbeef".repeat(5));
    harness.store().save(&index).unwrap();

    let outcome = harness.service().update(None).await.unwrap();
    match outcome {
        UpdateOutcome::Rescanned { reason, report } => {
            assert!(matches!(reason, RescanReason::DiffUnavailable(_)), "{:?}", reason);
            assert_eq!(report.files, 3);
        }
        other => panic!("expected a rescan, got {:?}", other),
    }

    let after = harness.store().load().unwrap();
    assert_eq!(after.git_ref.commit.as_deref(), Some(head.as_str()));
}
