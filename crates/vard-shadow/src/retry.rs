use crate::error::ShadowError;
use std::path::Path;
use std::time::Duration;

/// Bounds for the lock-aware executor.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Linear backoff: attempt index times this delay.
    pub base_delay: Duration,
    /// A lock older than this belongs to a dead process and is reclaimed.
    pub stale_lock_age: Duration,
    /// Total time to wait for a fresh lock to clear before each attempt.
    pub lock_wait_budget: Duration,
    pub lock_poll_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            stale_lock_age: Duration::from_secs(60),
            lock_wait_budget: Duration::from_secs(3),
            lock_poll_interval: Duration::from_millis(100),
        }
    }
}

/// Run `op` with retry around the external git tool's own locking.
///
/// Git refuses concurrent writers by creating `index.lock`; that file is
/// treated as an observable signal, never acquired cooperatively. Each
/// attempt reclaims a stale lock, waits briefly for a fresh one to clear,
/// then runs `op`. Only errors classified as lock contention are retried;
/// anything else propagates immediately.
pub fn with_lock_retry<T>(
    index_lock: &Path,
    op: impl FnMut() -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    with_policy(index_lock, &RetryPolicy::default(), op)
}

pub fn with_policy<T>(
    index_lock: &Path,
    policy: &RetryPolicy,
    mut op: impl FnMut() -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let mut last = None;
    for attempt in 1..=policy.max_attempts {
        reclaim_stale_lock(index_lock, policy.stale_lock_age);
        wait_for_lock_clear(index_lock, policy);
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if is_lock_error(&err) => {
                tracing::debug!(attempt, error = %err, "git lock contention, backing off");
                last = Some(err);
                std::thread::sleep(policy.base_delay * attempt);
            }
            Err(err) => return Err(err),
        }
    }
    Err(ShadowError::RetriesExhausted {
        attempts: policy.max_attempts,
        last: last.map(|e| e.to_string()).unwrap_or_default(),
    }
    .into())
}

fn is_lock_error(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<ShadowError>(), Some(ShadowError::Locked(_)))
}

/// Remove a lock marker whose mtime says its holder is dead, not slow.
fn reclaim_stale_lock(index_lock: &Path, stale_age: Duration) {
    let Ok(meta) = std::fs::metadata(index_lock) else {
        return;
    };
    let age = meta
        .modified()
        .ok()
        .and_then(|m| m.elapsed().ok())
        .unwrap_or_default();
    if age >= stale_age {
        tracing::warn!(lock = %index_lock.display(), ?age, "removing stale git lock");
        let _ = std::fs::remove_file(index_lock);
    }
}

/// Bounded poll for a fresh lock to clear. Gives up after the budget and
/// lets the attempt itself fail (and be retried) if the lock is still held.
fn wait_for_lock_clear(index_lock: &Path, policy: &RetryPolicy) {
    let deadline = std::time::Instant::now() + policy.lock_wait_budget;
    while index_lock.exists() && std::time::Instant::now() < deadline {
        std::thread::sleep(policy.lock_poll_interval);
    }
}
