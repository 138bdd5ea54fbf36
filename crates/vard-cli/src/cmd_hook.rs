use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use vard_shadow::{codec, config, paths, CheckpointEngine, SnapshotOutcome};

/// Payload the agent host pipes to the hook on each chat turn.
#[derive(Debug, Default, Deserialize)]
struct HookPayload {
    #[serde(default)]
    cwd: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

/// Auto-triggered checkpoint creation must never block the agent's turn:
/// every failure is logged and swallowed, and the hook always exits 0.
pub fn execute(invoked_root: &Path) -> anyhow::Result<()> {
    if let Err(err) = run(invoked_root) {
        tracing::warn!(error = %err, "hook checkpoint failed");
    }
    Ok(())
}

fn run(invoked_root: &Path) -> anyhow::Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let payload: HookPayload = if input.trim().is_empty() {
        HookPayload::default()
    } else {
        serde_json::from_str(&input).unwrap_or_default()
    };
    let root = payload
        .cwd
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| invoked_root.to_path_buf());

    let cfg = config::load(&paths::config_path())?;
    let keep_days = cfg.keep_days;
    let engine = CheckpointEngine::open(&root, cfg)?;

    let branch = codec::tag_agent(&engine.project_branch());
    match engine.create_snapshot(&branch, None)? {
        SnapshotOutcome::Created(cp) => {
            tracing::debug!(id = %cp.id, session = ?payload.session_id, "hook checkpoint created");
        }
        SnapshotOutcome::NoChanges => {
            tracing::debug!(session = ?payload.session_id, "hook: nothing to checkpoint");
        }
    }
    maybe_run_gc(&engine, keep_days);
    Ok(())
}

/// Opportunistic retention cleanup, at most once per day. The stamp file's
/// mtime is the schedule; racing hooks both running gc is harmless since
/// tombstoning is idempotent.
fn maybe_run_gc(engine: &CheckpointEngine, keep_days: i64) {
    if keep_days <= 0 {
        return;
    }
    let stamp = &engine.paths().gc_stamp;
    let fresh = std::fs::metadata(stamp)
        .ok()
        .and_then(|meta| meta.modified().ok())
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age.as_secs() < 24 * 60 * 60);
    if fresh {
        return;
    }
    match engine.delete_old_snapshots(keep_days) {
        Ok(count) => {
            let now = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default();
            let _ = std::fs::write(stamp, now);
            tracing::debug!(count, keep_days, "hook retention cleanup done");
        }
        Err(err) => tracing::warn!(error = %err, "hook retention cleanup failed"),
    }
}
