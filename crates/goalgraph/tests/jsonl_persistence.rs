//! Integration tests for JSONL snapshot persistence.
//!
//! Loading must survive corrupt files by skipping bad records, and a saved
//! graph must come back with identical sibling and root order.

use goalgraph::domain::{GoalId, MoveRequest, NewGoal};
use goalgraph::engine::{EngineConfig, MutationRecord};
use goalgraph::persistence::jsonl::{append_audit, load_snapshot, save_snapshot};
use goalgraph::persistence::{LoadWarning, RepositoryBackend, open_repository};
use std::path::Path;
use tempfile::TempDir;

mod common;
use common::engine_with;

fn goal_line(id: &str, title: &str, sequence: u64) -> String {
    format!(
        r#"{{"record":"goal","id":"{id}","title":"{title}","completed":false,"created_at":"2026-01-01T00:00:00Z","sequence":{sequence}}}"#
    )
}

fn relation_line(parent: &str, child: &str) -> String {
    format!(r#"{{"record":"relation","parent":"{parent}","child":"{child}"}}"#)
}

async fn write_lines(path: &Path, lines: &[String]) {
    tokio::fs::write(path, lines.join("\n") + "\n").await.unwrap();
}

// ============================================================================
// Round trips
// ============================================================================

#[tokio::test]
async fn test_round_trip_preserves_sibling_and_root_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("goals.jsonl");

    let (mut engine, ids) = engine_with(&["P", "Q", "A", "B", "C", "R"]);
    for child in [&ids[2], &ids[3], &ids[4]] {
        engine.link(&ids[0], child, None).unwrap();
    }
    engine.link(&ids[1], &ids[3], Some(0)).unwrap();
    engine
        .move_goal(MoveRequest::under(ids[4].clone(), ids[0].clone(), 0))
        .unwrap();
    engine.move_goal(MoveRequest::to_root(ids[5].clone(), 0)).unwrap();
    engine.toggle_completion(&ids[1]).unwrap();

    save_snapshot(&path, &engine).await.unwrap();
    let loaded = load_snapshot(&path).await.unwrap();

    assert!(loaded.warnings.is_empty());
    assert_eq!(loaded.store.export(), engine.store().export());
    assert_eq!(loaded.next_sequence, engine.next_sequence());
    assert!(loaded.store.check_invariants().is_empty());

    assert_eq!(
        loaded.store.children(&ids[0]).unwrap(),
        &[ids[4].clone(), ids[2].clone(), ids[3].clone()]
    );
    assert_eq!(
        loaded.store.roots(),
        &[ids[5].clone(), ids[0].clone(), ids[1].clone()]
    );
}

#[tokio::test]
async fn test_loaded_engine_continues_sequence() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("goals.jsonl");

    let (mut engine, ids) = engine_with(&["One", "Two"]);
    engine.delete(&ids[1]).unwrap();
    save_snapshot(&path, &engine).await.unwrap();

    let mut reloaded = load_snapshot(&path)
        .await
        .unwrap()
        .into_engine(EngineConfig::default());
    let three = reloaded.create(NewGoal::titled("Three")).unwrap();

    // Sequence numbers of deleted goals are not reused
    assert_eq!(three.sequence, 3);
}

#[tokio::test]
async fn test_deleted_ids_stay_reserved_after_reload() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("goals.jsonl");

    let (mut engine, ids) = engine_with(&["Keep", "Gone", "Also gone"]);
    engine.delete(&ids[1]).unwrap();
    save_snapshot(&path, &engine).await.unwrap();

    // A second session deletes another goal and saves again
    let mut second = load_snapshot(&path)
        .await
        .unwrap()
        .into_engine(EngineConfig::default());
    second.delete(&ids[2]).unwrap();
    save_snapshot(&path, &second).await.unwrap();

    let loaded = load_snapshot(&path).await.unwrap();
    assert_eq!(loaded.retired, vec![ids[1].clone(), ids[2].clone()]);

    let reloaded = loaded.into_engine(EngineConfig::default());
    assert_eq!(reloaded.store().len(), 1);
    for id in &ids {
        assert!(reloaded.is_id_reserved(id), "{id} should stay reserved");
    }
}

// ============================================================================
// Resilient loading
// ============================================================================

#[tokio::test]
async fn test_malformed_lines_are_skipped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("goals.jsonl");
    write_lines(
        &path,
        &[
            goal_line("goal-aaaa", "Valid", 1),
            "{ not json".to_string(),
            String::new(),
            r#"{"record":"mystery"}"#.to_string(),
            goal_line("goal-bbbb", "Also valid", 2),
        ],
    )
    .await;

    let loaded = load_snapshot(&path).await.unwrap();

    assert_eq!(loaded.store.len(), 2);
    let lines: Vec<usize> = loaded
        .warnings
        .iter()
        .map(|w| match w {
            LoadWarning::MalformedJson { line_number, .. } => *line_number,
            other => panic!("unexpected warning {other:?}"),
        })
        .collect();
    assert_eq!(lines, vec![2, 4]);
}

#[tokio::test]
async fn test_invalid_and_duplicate_goals_are_skipped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("goals.jsonl");
    write_lines(
        &path,
        &[
            goal_line("goal-aaaa", "First", 1),
            goal_line("goal-bbbb", "   ", 2),
            goal_line("goal-aaaa", "Second copy", 3),
        ],
    )
    .await;

    let loaded = load_snapshot(&path).await.unwrap();

    assert_eq!(loaded.store.len(), 1);
    assert_eq!(
        loaded.store.get(&GoalId::new("goal-aaaa")).unwrap().title,
        "First"
    );
    assert!(matches!(
        &loaded.warnings[0],
        LoadWarning::InvalidGoal { line_number: 2, .. }
    ));
    assert!(matches!(
        &loaded.warnings[1],
        LoadWarning::DuplicateGoal { line_number: 3, .. }
    ));
}

#[tokio::test]
async fn test_bad_relations_are_skipped() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("goals.jsonl");
    write_lines(
        &path,
        &[
            goal_line("goal-aaaa", "A", 1),
            goal_line("goal-bbbb", "B", 2),
            relation_line("goal-aaaa", "goal-bbbb"),
            relation_line("goal-aaaa", "goal-bbbb"),
            relation_line("goal-bbbb", "goal-aaaa"),
            relation_line("goal-aaaa", "goal-aaaa"),
            relation_line("goal-aaaa", "goal-zzzz"),
        ],
    )
    .await;

    let loaded = load_snapshot(&path).await.unwrap();

    assert_eq!(loaded.store.relation_count(), 1);
    assert!(loaded.store.check_invariants().is_empty());
    assert!(matches!(loaded.warnings[0], LoadWarning::DuplicateRelation { .. }));
    assert!(matches!(loaded.warnings[1], LoadWarning::CircularRelation { .. }));
    assert!(matches!(loaded.warnings[2], LoadWarning::CircularRelation { .. }));
    assert!(matches!(loaded.warnings[3], LoadWarning::OrphanedRelation { .. }));
}

#[tokio::test]
async fn test_stale_root_order_is_reconciled() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("goals.jsonl");
    write_lines(
        &path,
        &[
            goal_line("goal-aaaa", "A", 1),
            goal_line("goal-bbbb", "B", 2),
            goal_line("goal-cccc", "C", 3),
            relation_line("goal-aaaa", "goal-bbbb"),
            // Lists a child and an unknown id, and omits C
            r#"{"record":"root_order","ids":["goal-bbbb","goal-gone","goal-aaaa"]}"#.to_string(),
        ],
    )
    .await;

    let loaded = load_snapshot(&path).await.unwrap();

    assert_eq!(
        loaded.store.roots(),
        &[GoalId::new("goal-aaaa"), GoalId::new("goal-cccc")]
    );
    assert!(loaded.store.check_invariants().is_empty());
}

// ============================================================================
// Repository and audit log
// ============================================================================

#[tokio::test]
async fn test_jsonl_repository_writes_snapshot_and_audit_log() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("goals.jsonl");
    let audit = temp.path().join("audit.jsonl");
    let repository = open_repository(RepositoryBackend::Jsonl {
        data: data.clone(),
        audit_log: Some(audit.clone()),
    });

    let mut engine = repository
        .load()
        .await
        .unwrap()
        .into_engine(EngineConfig::default());
    let parent = engine.create(NewGoal::titled("Parent")).unwrap();
    let child = engine.create(NewGoal::titled("Child")).unwrap();
    engine.link(&parent.id, &child.id, None).unwrap();
    let journal = engine.take_journal();
    repository.record(&engine, &journal).await.unwrap();

    let reloaded = repository.load().await.unwrap();
    assert_eq!(reloaded.store.export(), engine.store().export());

    let audit_text = tokio::fs::read_to_string(&audit).await.unwrap();
    let records: Vec<MutationRecord> = audit_text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records, journal);

    // Appends rather than rewrites
    engine.toggle_completion(&parent.id).unwrap();
    let journal = engine.take_journal();
    repository.record(&engine, &journal).await.unwrap();
    let audit_text = tokio::fs::read_to_string(&audit).await.unwrap();
    assert_eq!(audit_text.lines().count(), 4);
}

#[tokio::test]
async fn test_append_audit_ignores_empty_batch() {
    let temp = TempDir::new().unwrap();
    let audit = temp.path().join("audit.jsonl");

    append_audit(&audit, &[]).await.unwrap();
    assert!(!audit.exists());
}
