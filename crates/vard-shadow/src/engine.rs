use crate::codec::{self, Checkpoint};
use crate::config::EngineConfig;
use crate::error::ShadowError;
use crate::git;
use crate::overlay::Overlays;
use crate::paths::ShadowPaths;
use crate::repo::ShadowRepo;
use crate::retry::with_lock_retry;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use time::OffsetDateTime;
use vard_core::identity::resolve_identity;

/// Listing reads at most this many recent commits. Older checkpoints stay
/// addressable by id even when outside the window.
pub const LIST_WINDOW: usize = 100;

/// Result of a snapshot attempt. An unchanged working tree is a distinct
/// no-effect success, not an error and never a retry.
#[derive(Debug)]
pub enum SnapshotOutcome {
    Created(Checkpoint),
    NoChanges,
}

/// Per-file change status relative to the current working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Modified,
    Deleted,
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiffStatus::Added => write!(f, "added"),
            DiffStatus::Modified => write!(f, "modified"),
            DiffStatus::Deleted => write!(f, "deleted"),
        }
    }
}

/// One changed file between a checkpoint and the current working tree.
#[derive(Debug, Clone, Serialize)]
pub struct DiffFileInfo {
    pub path: String,
    pub status: DiffStatus,
    pub insertions: u64,
    pub deletions: u64,
}

/// Public-facing orchestrator over lifecycle, lock retry, codec, and
/// overlays. No in-process mutual exclusion: concurrency safety between
/// processes comes entirely from retrying around git's own locking.
pub struct CheckpointEngine {
    repo: ShadowRepo,
    overlays: Overlays,
    config: EngineConfig,
}

impl CheckpointEngine {
    /// Open the engine for a project, deriving the shadow location from the
    /// repository identity (remote URL preferred, root path fallback).
    pub fn open(project_root: &Path, config: EngineConfig) -> anyhow::Result<Self> {
        let root = project_root
            .canonicalize()
            .with_context(|| format!("project root not addressable: {}", project_root.display()))?;
        let remote = git::detect_remote_url(&root);
        let identity = resolve_identity(remote.as_deref(), &root);
        let engine = Self::open_at(&ShadowPaths::for_identity(&identity), &root)?;
        Ok(engine.with_config(config))
    }

    /// Open against an explicit shadow location (tests, sandboxes).
    pub fn open_at(paths: &ShadowPaths, project_root: &Path) -> anyhow::Result<Self> {
        let root = project_root
            .canonicalize()
            .with_context(|| format!("project root not addressable: {}", project_root.display()))?;
        let repo = ShadowRepo::new(paths.clone(), root);
        let overlays = Overlays::new(paths);
        Ok(Self {
            repo,
            overlays,
            config: EngineConfig::default(),
        })
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn paths(&self) -> &ShadowPaths {
        &self.repo.paths
    }

    /// Current branch of the project's own repository, `unknown` outside one.
    pub fn project_branch(&self) -> String {
        git::detect_branch(&self.repo.project_root).unwrap_or_else(|| "unknown".to_string())
    }

    // ── Create ──

    /// Commit the entire bound working tree as one new checkpoint.
    pub fn create_snapshot(
        &self,
        branch: &str,
        custom_description: Option<&str>,
    ) -> anyhow::Result<SnapshotOutcome> {
        self.repo.ensure_ready(&self.config.ignore_patterns)?;
        let git = self.repo.git();
        let lock = &self.repo.paths.index_lock;

        with_lock_retry(lock, || git.add_all())?;
        let staged = git.staged_files()?;
        if staged.is_empty() {
            tracing::debug!("nothing staged, skipping checkpoint");
            return Ok(SnapshotOutcome::NoChanges);
        }

        let message = codec::encode(
            branch,
            OffsetDateTime::now_utc(),
            self.config.template.as_deref(),
            self.config.date_format.as_deref(),
            custom_description,
        );
        with_lock_retry(lock, || git.commit(&message))?;

        let head = git
            .log(1)?
            .into_iter()
            .next()
            .context("shadow repository has no HEAD after commit")?;
        let checkpoint = codec::decode(&head.hash, &head.subject, &head.body, head.date);
        tracing::debug!(id = %checkpoint.id, files = staged.len(), "created checkpoint");
        Ok(SnapshotOutcome::Created(checkpoint))
    }

    // ── List ──

    /// Recent checkpoints: tombstones filtered, renames applied, favorites
    /// flagged and stably partitioned to the front.
    pub fn list_snapshots(&self) -> anyhow::Result<Vec<Checkpoint>> {
        if !self.repo.is_initialized() {
            return Ok(Vec::new());
        }
        let git = self.repo.git();
        if git.rev_parse("HEAD").is_none() {
            // Initialized but never committed.
            return Ok(Vec::new());
        }
        let tombstones = self.overlays.tombstones()?;
        let renames = self.overlays.renames()?;
        let favorites = self.overlays.favorites()?;

        let mut checkpoints = Vec::new();
        for entry in git.log(LIST_WINDOW)? {
            let mut cp = codec::decode(&entry.hash, &entry.subject, &entry.body, entry.date);
            if tombstones.contains(&cp.id) {
                continue;
            }
            if let Some(name) = renames.get(&cp.id) {
                cp.description = name.clone();
            }
            cp.favorite = favorites.contains(&cp.id);
            checkpoints.push(cp);
        }
        Ok(favorites_first(checkpoints))
    }

    // ── Read-only projections ──

    /// All file paths captured in a checkpoint.
    pub fn snapshot_file_names(&self, id: &str) -> anyhow::Result<Vec<String>> {
        let rev = self.resolve_rev(id)?;
        self.repo.git().ls_tree(&rev)
    }

    /// Map of path to text content for a checkpoint. Files that are not
    /// valid UTF-8 are silently skipped rather than failing the batch.
    pub fn snapshot_files(&self, id: &str) -> anyhow::Result<BTreeMap<String, String>> {
        let rev = self.resolve_rev(id)?;
        let git = self.repo.git();
        let mut files = BTreeMap::new();
        for path in git.ls_tree(&rev)? {
            let Ok(bytes) = git.show_file(&rev, &path) else {
                continue;
            };
            if let Ok(text) = String::from_utf8(bytes) {
                files.insert(path, text);
            }
        }
        Ok(files)
    }

    /// Content of a single captured file.
    pub fn snapshot_file_content(&self, id: &str, path: &str) -> anyhow::Result<String> {
        let rev = self.resolve_rev(id)?;
        let bytes = self.repo.git().show_file(&rev, path)?;
        String::from_utf8(bytes).with_context(|| format!("{path} is not valid UTF-8"))
    }

    /// Files changed between a checkpoint and the current working tree,
    /// with per-file line counts.
    pub fn snapshot_diff_files(&self, id: &str) -> anyhow::Result<Vec<DiffFileInfo>> {
        // Diffing reads the working tree, so the binding must be valid.
        self.repo.ensure_ready(&self.config.ignore_patterns)?;
        let rev = self.resolve_rev(id)?;
        let git = self.repo.git();
        let statuses = parse_name_status(&git.diff_name_status(&rev)?);
        let counts = parse_numstat(&git.diff_numstat(&rev)?);
        Ok(statuses
            .into_iter()
            .map(|(path, status)| {
                let (insertions, deletions) = counts.get(&path).copied().unwrap_or((0, 0));
                DiffFileInfo {
                    path,
                    status,
                    insertions,
                    deletions,
                }
            })
            .collect())
    }

    // ── Restore ──

    /// Discard all untracked files and hard-reset the bound working tree
    /// to the checkpoint. Destructive and irreversible for uncommitted
    /// state; callers confirm with the user first.
    ///
    /// Known limitation: the reset moves the shadow HEAD to the target, so
    /// checkpoints newer than it drop out of listings (which walk from
    /// HEAD), and the next snapshot forks history past them. Their content
    /// stays addressable by full hash.
    pub fn restore_snapshot(&self, id: &str) -> anyhow::Result<()> {
        self.repo.ensure_ready(&self.config.ignore_patterns)?;
        let rev = self.resolve_rev(id)?;
        let git = self.repo.git();
        let lock = &self.repo.paths.index_lock;
        with_lock_retry(lock, || git.clean_untracked())?;
        with_lock_retry(lock, || git.reset_hard(&rev))?;
        tracing::info!(id, "restored working tree to checkpoint");
        Ok(())
    }

    // ── Overlay mutations ──

    /// Hide a checkpoint from listings. History is untouched; content
    /// remains retrievable by id. Idempotent.
    pub fn delete_snapshot(&self, id: &str) -> anyhow::Result<()> {
        self.overlays.add_tombstone(id)
    }

    /// Override a checkpoint's display description.
    pub fn rename_snapshot(&self, id: &str, name: &str) -> anyhow::Result<()> {
        self.overlays.set_rename(id, name)
    }

    /// Flip favorite state; returns the new state.
    pub fn toggle_favorite(&self, id: &str) -> anyhow::Result<bool> {
        self.overlays.toggle_favorite(id)
    }

    // ── Retention ──

    /// Tombstone non-favorite checkpoints strictly older than the cutoff.
    /// Returns the number tombstoned. Safe to call redundantly and
    /// concurrently with creation: the only mutation is overlay writes.
    pub fn delete_old_snapshots(&self, keep_days: i64) -> anyhow::Result<usize> {
        if keep_days <= 0 {
            return Ok(0);
        }
        let cutoff = OffsetDateTime::now_utc() - time::Duration::days(keep_days);
        let mut count = 0;
        for cp in self.list_snapshots()? {
            if cp.favorite || cp.timestamp >= cutoff {
                continue;
            }
            self.overlays.add_tombstone(&cp.id)?;
            count += 1;
        }
        if count > 0 {
            tracing::info!(count, keep_days, "tombstoned old checkpoints");
        }
        Ok(count)
    }

    /// Resolve a short or full id to a full commit hash.
    fn resolve_rev(&self, id: &str) -> anyhow::Result<String> {
        self.repo
            .git()
            .rev_parse(id)
            .ok_or_else(|| ShadowError::NotFound(id.to_string()).into())
    }
}

/// Stable partition: favorites first, relative recency order preserved
/// within each group. Not a re-sort by time.
fn favorites_first(checkpoints: Vec<Checkpoint>) -> Vec<Checkpoint> {
    let (mut favorites, rest): (Vec<_>, Vec<_>) =
        checkpoints.into_iter().partition(|cp| cp.favorite);
    favorites.extend(rest);
    favorites
}

fn parse_name_status(raw: &str) -> Vec<(String, DiffStatus)> {
    raw.lines()
        .filter_map(|line| {
            let (letter, path) = line.split_once('\t')?;
            let status = match letter.chars().next()? {
                'A' => DiffStatus::Added,
                'D' => DiffStatus::Deleted,
                _ => DiffStatus::Modified,
            };
            Some((path.to_string(), status))
        })
        .collect()
}

/// Parse numstat lines into path to (insertions, deletions). Binary files
/// report `-` and count as zero.
fn parse_numstat(raw: &str) -> BTreeMap<String, (u64, u64)> {
    raw.lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\t');
            let ins = parts.next()?.parse::<u64>().unwrap_or(0);
            let del = parts.next()?.parse::<u64>().unwrap_or(0);
            let path = parts.next()?;
            Some((path.to_string(), (ins, del)))
        })
        .collect()
}
