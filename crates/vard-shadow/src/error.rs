use std::path::PathBuf;

/// Conditions the engine must tell apart programmatically. Everything else
/// travels as plain `anyhow` errors.
#[derive(Debug, thiserror::Error)]
pub enum ShadowError {
    /// The external git process refused to write because another process
    /// holds its lock. Transient; the retry executor handles it.
    #[error("shadow repository is locked by another process: {0}")]
    Locked(String),
    /// Lock contention persisted through the whole retry budget.
    #[error("git operation failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
    /// No commit matches the given checkpoint id.
    #[error("checkpoint not found: {0}")]
    NotFound(String),
    /// Shadow repository could not be created or initialized.
    #[error("cannot initialize shadow repository at {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Classify git stderr as lock contention.
pub fn is_lock_message(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("index.lock")
        || lower.contains("another git process")
        || lower.contains("could not lock")
        || lower.contains("unable to lock")
}
