use std::io::Write;
use std::path::{Path, PathBuf};

/// Return the per-user store root: `~/.vard/` style.
///
/// `VARD_STORE_DIR` overrides everything (sandboxes, tests). Otherwise the
/// platform data dir is used, falling back to `$HOME/.vard`.
pub fn store_root() -> PathBuf {
    if let Ok(dir) = std::env::var("VARD_STORE_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("vard")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".vard")
    } else {
        PathBuf::from(".vard-store")
    }
}

/// Global config file: `<store_root>/config.json`.
pub fn config_path() -> PathBuf {
    store_root().join("config.json")
}

/// All well-known paths under one shadow repository directory.
#[derive(Debug, Clone)]
pub struct ShadowPaths {
    pub root: PathBuf,
    pub git_dir: PathBuf,
    pub index_lock: PathBuf,
    pub exclude_file: PathBuf,
    pub deleted_file: PathBuf,
    pub renamed_file: PathBuf,
    pub favorites_file: PathBuf,
    pub gc_stamp: PathBuf,
}

impl ShadowPaths {
    /// Derive all paths from a shadow repo root. Pure computation, no I/O.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let git_dir = root.join(".git");
        Self {
            index_lock: git_dir.join("index.lock"),
            exclude_file: git_dir.join("info").join("exclude"),
            deleted_file: root.join(".deleted"),
            renamed_file: root.join(".renamed"),
            favorites_file: root.join(".favorites"),
            gc_stamp: root.join(".gc_stamp"),
            git_dir,
            root,
        }
    }

    /// Shadow repo location for a repository identity:
    /// `<store_root>/checkpoints/<identity>/`.
    pub fn for_identity(identity: &str) -> Self {
        Self::at(store_root().join("checkpoints").join(identity))
    }

    /// Whether a repository has been initialized here.
    pub fn is_initialized(&self) -> bool {
        self.git_dir.is_dir()
    }
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    std::fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}
