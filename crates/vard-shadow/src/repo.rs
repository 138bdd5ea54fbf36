use crate::error::ShadowError;
use crate::git::Git;
use crate::ignore::exclude_content;
use crate::paths::ShadowPaths;
use std::path::PathBuf;

/// Synthetic author identity for shadow commits.
pub const AUTHOR_NAME: &str = "vard";
pub const AUTHOR_EMAIL: &str = "vard@localhost";

/// One shadow repository bound to one project root.
#[derive(Debug, Clone)]
pub struct ShadowRepo {
    pub paths: ShadowPaths,
    pub project_root: PathBuf,
    git: Git,
}

impl ShadowRepo {
    pub fn new(paths: ShadowPaths, project_root: PathBuf) -> Self {
        let git = Git::new(paths.git_dir.clone(), project_root.clone());
        Self {
            paths,
            project_root,
            git,
        }
    }

    pub fn git(&self) -> &Git {
        &self.git
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// Ensure the shadow repository exists, is bound to the project root,
    /// and has current exclude rules.
    ///
    /// Initializes lazily on first call; on every call the worktree binding
    /// is re-validated (project roots move between mounts) and the exclude
    /// file is rewritten so configuration changes take effect without
    /// reinitialization. Creation failures are fatal to the operation.
    pub fn ensure_ready(&self, extra_ignores: &[String]) -> anyhow::Result<()> {
        let root_str = self.project_root.to_string_lossy().to_string();
        if !self.is_initialized() {
            std::fs::create_dir_all(&self.paths.root).map_err(|source| ShadowError::Init {
                path: self.paths.root.clone(),
                source,
            })?;
            self.git.init()?;
            self.git.config_set("core.worktree", &root_str)?;
            self.git.config_set("user.name", AUTHOR_NAME)?;
            self.git.config_set("user.email", AUTHOR_EMAIL)?;
            self.git.config_set("commit.gpgsign", "false")?;
            tracing::debug!(shadow = %self.paths.root.display(), "initialized shadow repository");
        } else {
            let bound = self.git.config_get("core.worktree")?;
            if bound.as_deref() != Some(root_str.as_str()) {
                tracing::warn!(
                    from = bound.as_deref().unwrap_or("<unset>"),
                    to = %root_str,
                    "rebinding shadow worktree"
                );
                self.git.config_set("core.worktree", &root_str)?;
            }
        }
        crate::paths::write_atomic(
            &self.paths.exclude_file,
            exclude_content(extra_ignores).as_bytes(),
        )
    }
}
