//! End-to-end engine tests against a real `git` binary, with project and
//! shadow repositories in per-test temp dirs.

use std::fs;
use std::path::{Path, PathBuf};

use vard_shadow::config;
use vard_shadow::engine::{CheckpointEngine, DiffStatus, SnapshotOutcome};
use vard_shadow::paths::ShadowPaths;
use vard_shadow::{Checkpoint, ShadowError};

struct Fixture {
    _tmp: tempfile::TempDir,
    project: PathBuf,
    shadow: ShadowPaths,
    engine: CheckpointEngine,
}

fn fixture() -> Fixture {
    let tmp = tempfile::tempdir().unwrap();
    let project = tmp.path().join("project");
    fs::create_dir_all(&project).unwrap();
    let shadow = ShadowPaths::at(tmp.path().join("shadow"));
    let engine = CheckpointEngine::open_at(&shadow, &project).unwrap();
    Fixture {
        _tmp: tmp,
        project,
        shadow,
        engine,
    }
}

fn write(project: &Path, rel: &str, content: impl AsRef<[u8]>) {
    let path = project.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn must_create(engine: &CheckpointEngine, custom: Option<&str>) -> Checkpoint {
    match engine.create_snapshot("main", custom).unwrap() {
        SnapshotOutcome::Created(cp) => cp,
        SnapshotOutcome::NoChanges => panic!("expected a new checkpoint"),
    }
}

/// Run git directly against the shadow repository (history forgery for
/// retention tests).
fn raw_git(shadow: &ShadowPaths, project: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .arg("--git-dir")
        .arg(&shadow.git_dir)
        .args(args)
        .current_dir(project)
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

#[test]
fn create_then_list_round_trips() {
    let f = fixture();
    write(&f.project, "a.txt", "one\n");
    let cp = must_create(&f.engine, None);
    assert_eq!(cp.id.len(), 7);
    assert_eq!(cp.branch, "main");
    assert!(!cp.agent_created);

    let list = f.engine.list_snapshots().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, cp.id);
}

#[test]
fn unchanged_tree_is_a_noop_not_an_error() {
    let f = fixture();
    write(&f.project, "a.txt", "one\n");
    must_create(&f.engine, None);
    match f.engine.create_snapshot("main", None).unwrap() {
        SnapshotOutcome::NoChanges => {}
        SnapshotOutcome::Created(cp) => panic!("unexpected checkpoint {}", cp.id),
    }
    assert_eq!(f.engine.list_snapshots().unwrap().len(), 1);
}

#[test]
fn custom_description_survives_decode() {
    let f = fixture();
    write(&f.project, "a.txt", "one\n");
    let cp = must_create(&f.engine, Some("before refactor"));
    assert_eq!(cp.description, "before refactor");
    assert_eq!(cp.branch, "main");
    assert!(cp.full_message.contains("Branch: main"));
}

#[test]
fn listing_without_a_shadow_repo_is_empty() {
    let f = fixture();
    assert!(f.engine.list_snapshots().unwrap().is_empty());
}

#[test]
fn restore_rewinds_tracked_files_and_removes_strays() {
    let f = fixture();
    write(&f.project, "a.txt", "one\n");
    let first = must_create(&f.engine, None);

    write(&f.project, "a.txt", "two\n");
    write(&f.project, "b.txt", "new file\n");
    must_create(&f.engine, None);
    // Never checkpointed; restore must still remove it.
    write(&f.project, "c.txt", "untracked\n");

    f.engine.restore_snapshot(&first.id).unwrap();
    assert_eq!(fs::read_to_string(f.project.join("a.txt")).unwrap(), "one\n");
    assert!(!f.project.join("b.txt").exists());
    assert!(!f.project.join("c.txt").exists());
}

#[test]
fn restore_unknown_id_is_a_clear_failure() {
    let f = fixture();
    write(&f.project, "a.txt", "one\n");
    must_create(&f.engine, None);
    let err = f.engine.restore_snapshot("fffffff").unwrap_err();
    match err.downcast_ref::<ShadowError>() {
        Some(ShadowError::NotFound(id)) => assert_eq!(id, "fffffff"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn tombstoned_checkpoints_never_list_but_stay_readable() {
    let f = fixture();
    write(&f.project, "a.txt", "one\n");
    let first = must_create(&f.engine, None);
    write(&f.project, "a.txt", "two\n");
    let second = must_create(&f.engine, None);

    f.engine.delete_snapshot(&first.id).unwrap();
    f.engine.delete_snapshot(&first.id).unwrap(); // idempotent

    let ids: Vec<String> = f
        .engine
        .list_snapshots()
        .unwrap()
        .into_iter()
        .map(|cp| cp.id)
        .collect();
    assert_eq!(ids, vec![second.id.clone()]);

    // Content remains addressable by id indefinitely.
    let content = f.engine.snapshot_file_content(&first.id, "a.txt").unwrap();
    assert_eq!(content, "one\n");
}

#[test]
fn rename_overrides_display_description_only() {
    let f = fixture();
    write(&f.project, "a.txt", "one\n");
    let cp = must_create(&f.engine, None);
    f.engine.rename_snapshot(&cp.id, "good state").unwrap();

    let list = f.engine.list_snapshots().unwrap();
    assert_eq!(list[0].description, "good state");
    assert_eq!(list[0].id, cp.id);
}

#[test]
fn favorites_lead_the_listing_in_stable_order() {
    let f = fixture();
    write(&f.project, "a.txt", "1\n");
    let a = must_create(&f.engine, None);
    write(&f.project, "a.txt", "2\n");
    let b = must_create(&f.engine, None);
    write(&f.project, "a.txt", "3\n");
    let c = must_create(&f.engine, None);

    assert!(f.engine.toggle_favorite(&b.id).unwrap());

    let ids: Vec<String> = f
        .engine
        .list_snapshots()
        .unwrap()
        .into_iter()
        .map(|cp| cp.id)
        .collect();
    // Raw history is newest-first (c, b, a); favorite b moves to the front.
    assert_eq!(ids, vec![b.id.clone(), c.id.clone(), a.id.clone()]);

    // Toggling back restores the original order.
    assert!(!f.engine.toggle_favorite(&b.id).unwrap());
    let ids: Vec<String> = f
        .engine
        .list_snapshots()
        .unwrap()
        .into_iter()
        .map(|cp| cp.id)
        .collect();
    assert_eq!(ids, vec![c.id, b.id, a.id]);
}

#[test]
fn snapshot_files_skip_binary_entries() {
    let f = fixture();
    write(&f.project, "a.txt", "text\n");
    write(&f.project, "blob.bin", [0xff_u8, 0xfe, 0x00, 0x01]);
    let cp = must_create(&f.engine, None);

    let names = f.engine.snapshot_file_names(&cp.id).unwrap();
    assert!(names.contains(&"a.txt".to_string()));
    assert!(names.contains(&"blob.bin".to_string()));

    let files = f.engine.snapshot_files(&cp.id).unwrap();
    assert_eq!(files.get("a.txt").map(String::as_str), Some("text\n"));
    assert!(!files.contains_key("blob.bin"));
}

#[test]
fn default_ignores_keep_secrets_out_of_checkpoints() {
    let f = fixture();
    write(&f.project, "a.txt", "text\n");
    write(&f.project, ".env", "TOKEN=hunter2\n");
    let cp = must_create(&f.engine, None);

    let names = f.engine.snapshot_file_names(&cp.id).unwrap();
    assert!(names.contains(&"a.txt".to_string()));
    assert!(!names.contains(&".env".to_string()));
}

#[test]
fn ignore_patterns_set_via_config_reach_the_exclude_file() {
    let f = fixture();
    // Same write path as `vard config set snapshot.ignore '["*.iso"]'`.
    let cfg_path = f.project.join("config.json");
    let mut map = config::read_map(&cfg_path).unwrap();
    map.insert(
        "snapshot.ignore".into(),
        config::parse_value(r#"["*.iso"]"#),
    );
    config::write_map(&cfg_path, &map).unwrap();
    let cfg = config::load(&cfg_path).unwrap();
    assert_eq!(cfg.ignore_patterns, vec!["*.iso"]);

    let engine = CheckpointEngine::open_at(&f.shadow, &f.project)
        .unwrap()
        .with_config(cfg);
    write(&f.project, "a.txt", "text\n");
    write(&f.project, "disc.iso", "not really an image\n");
    let cp = must_create(&engine, None);

    let names = engine.snapshot_file_names(&cp.id).unwrap();
    assert!(names.contains(&"a.txt".to_string()));
    assert!(!names.contains(&"disc.iso".to_string()));
}

#[test]
fn restore_rewinds_the_listing_and_next_snapshot_forks() {
    let f = fixture();
    write(&f.project, "a.txt", "one\n");
    let first = must_create(&f.engine, None);
    write(&f.project, "a.txt", "two\n");
    must_create(&f.engine, None);

    // HEAD moves to the target, so the newer checkpoint leaves the listing.
    f.engine.restore_snapshot(&first.id).unwrap();
    let ids: Vec<String> = f
        .engine
        .list_snapshots()
        .unwrap()
        .into_iter()
        .map(|cp| cp.id)
        .collect();
    assert_eq!(ids, vec![first.id.clone()]);

    write(&f.project, "a.txt", "three\n");
    let forked = must_create(&f.engine, None);
    let ids: Vec<String> = f
        .engine
        .list_snapshots()
        .unwrap()
        .into_iter()
        .map(|cp| cp.id)
        .collect();
    assert_eq!(ids, vec![forked.id, first.id]);
}

#[test]
fn diff_reports_status_and_line_counts() {
    let f = fixture();
    write(&f.project, "a.txt", "line one\n");
    write(&f.project, "b.txt", "doomed\n");
    let cp = must_create(&f.engine, None);

    write(&f.project, "a.txt", "line one\nline two\n");
    fs::remove_file(f.project.join("b.txt")).unwrap();

    let diff = f.engine.snapshot_diff_files(&cp.id).unwrap();
    let a = diff.iter().find(|d| d.path == "a.txt").unwrap();
    assert_eq!(a.status, DiffStatus::Modified);
    assert_eq!(a.insertions, 1);
    assert_eq!(a.deletions, 0);
    let b = diff.iter().find(|d| d.path == "b.txt").unwrap();
    assert_eq!(b.status, DiffStatus::Deleted);
}

#[test]
fn retention_tombstones_old_non_favorites_only() {
    let f = fixture();
    write(&f.project, "a.txt", "fresh\n");
    let fresh = must_create(&f.engine, None);

    // Forge a legacy-format commit whose encoded timestamp is ancient.
    write(&f.project, "a.txt", "old state\n");
    raw_git(&f.shadow, &f.project, &["add", "-A"]);
    raw_git(
        &f.shadow,
        &f.project,
        &["commit", "-m", "main @ 2020-01-01 00:00:00", "--no-verify"],
    );

    let count = f.engine.delete_old_snapshots(7).unwrap();
    assert_eq!(count, 1);
    let ids: Vec<String> = f
        .engine
        .list_snapshots()
        .unwrap()
        .into_iter()
        .map(|cp| cp.id)
        .collect();
    assert_eq!(ids, vec![fresh.id]);
}

#[test]
fn retention_spares_favorited_checkpoints() {
    let f = fixture();
    write(&f.project, "a.txt", "old favorite\n");
    // First snapshot initializes the shadow repo and author identity.
    f.engine.create_snapshot("main", None).unwrap();
    write(&f.project, "a.txt", "older\n");
    raw_git(&f.shadow, &f.project, &["add", "-A"]);
    raw_git(
        &f.shadow,
        &f.project,
        &["commit", "-m", "main @ 2020-01-01 00:00:00", "--no-verify"],
    );

    let list = f.engine.list_snapshots().unwrap();
    let old = &list[0];
    assert_eq!(old.timestamp.year(), 2020);
    f.engine.toggle_favorite(&old.id).unwrap();

    assert_eq!(f.engine.delete_old_snapshots(7).unwrap(), 0);
}

#[test]
fn nonpositive_retention_is_disabled() {
    let f = fixture();
    write(&f.project, "a.txt", "one\n");
    must_create(&f.engine, None);
    assert_eq!(f.engine.delete_old_snapshots(0).unwrap(), 0);
    assert_eq!(f.engine.delete_old_snapshots(-3).unwrap(), 0);
    assert_eq!(f.engine.list_snapshots().unwrap().len(), 1);
}
