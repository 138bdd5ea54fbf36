use crate::error::{is_lock_message, ShadowError};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::process::Command;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// One entry from `git log`, newest first.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub hash: String,
    pub subject: String,
    pub body: String,
    pub date: OffsetDateTime,
}

/// Field/record separators for log parsing (never appear in commit text).
const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

/// Synchronous driver for the external `git` binary.
///
/// Every invocation passes `--git-dir` explicitly and runs with the bound
/// work tree as CWD, so pathspecs resolve inside the project regardless of
/// where the shadow repository lives.
#[derive(Debug, Clone)]
pub struct Git {
    git_dir: PathBuf,
    work_tree: PathBuf,
}

impl Git {
    pub fn new(git_dir: impl Into<PathBuf>, work_tree: impl Into<PathBuf>) -> Self {
        Self {
            git_dir: git_dir.into(),
            work_tree: work_tree.into(),
        }
    }

    /// Run git with the given args; returns trimmed-right stdout.
    /// Non-zero exit becomes an error carrying stderr, classified as
    /// `ShadowError::Locked` when the message indicates lock contention.
    pub fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.git_dir)
            .args(args)
            .current_dir(&self.work_tree)
            .output()
            .with_context(|| format!("failed to spawn git {}", args.first().unwrap_or(&"")))?;
        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Ok(stdout.trim_end_matches(['\n', '\r']).to_string());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_lock_message(&stderr) {
            return Err(ShadowError::Locked(stderr).into());
        }
        anyhow::bail!("git {} failed: {stderr}", args.first().unwrap_or(&""))
    }

    /// Like `run`, but returns raw stdout bytes (for file contents that may
    /// not be valid UTF-8).
    pub fn run_bytes(&self, args: &[&str]) -> anyhow::Result<Vec<u8>> {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.git_dir)
            .args(args)
            .current_dir(&self.work_tree)
            .output()
            .with_context(|| format!("failed to spawn git {}", args.first().unwrap_or(&"")))?;
        if output.status.success() {
            return Ok(output.stdout);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        anyhow::bail!("git {} failed: {stderr}", args.first().unwrap_or(&""))
    }

    pub fn init(&self) -> anyhow::Result<()> {
        // `init` targets the shadow root directly; --git-dir is not set up yet.
        let root = self
            .git_dir
            .parent()
            .ok_or_else(|| anyhow::anyhow!("git dir has no parent: {}", self.git_dir.display()))?;
        let output = Command::new("git")
            .arg("init")
            .arg(root)
            .output()
            .context("failed to spawn git init")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            anyhow::bail!("git init failed: {stderr}");
        }
        Ok(())
    }

    pub fn config_set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.run(&["config", key, value]).map(|_| ())
    }

    /// Read a config value; `None` when the key is unset.
    pub fn config_get(&self, key: &str) -> anyhow::Result<Option<String>> {
        match self.run(&["config", "--get", key]) {
            Ok(v) if v.is_empty() => Ok(None),
            Ok(v) => Ok(Some(v)),
            // exit code 1 means "key not set"
            Err(_) => Ok(None),
        }
    }

    /// Stage every change in the bound work tree.
    pub fn add_all(&self) -> anyhow::Result<()> {
        self.run(&["add", "-A"]).map(|_| ())
    }

    /// Paths with staged (index) changes, parsed from porcelain status.
    pub fn staged_files(&self) -> anyhow::Result<Vec<String>> {
        let out = self.run(&["status", "--porcelain"])?;
        Ok(parse_staged(&out))
    }

    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        self.run(&["commit", "-m", message, "--no-verify"]).map(|_| ())
    }

    /// Newest-first history, bounded by `max`.
    pub fn log(&self, max: usize) -> anyhow::Result<Vec<LogEntry>> {
        let count = max.to_string();
        let out = self.run(&[
            "log",
            "--max-count",
            &count,
            "--pretty=format:%H%x1f%s%x1f%b%x1f%cI%x1e",
        ])?;
        parse_log(&out)
    }

    /// Resolve a revision to its full commit hash; `None` if unknown.
    pub fn rev_parse(&self, rev: &str) -> Option<String> {
        let spec = format!("{rev}^{{commit}}");
        self.run(&["rev-parse", "--verify", "--quiet", &spec])
            .ok()
            .filter(|h| !h.is_empty())
    }

    /// All file paths in a commit's tree.
    pub fn ls_tree(&self, rev: &str) -> anyhow::Result<Vec<String>> {
        let out = self.run(&["ls-tree", "-r", "--name-only", rev])?;
        Ok(out.lines().map(String::from).collect())
    }

    /// Contents of one file at a revision, as raw bytes.
    pub fn show_file(&self, rev: &str, path: &str) -> anyhow::Result<Vec<u8>> {
        let spec = format!("{rev}:{path}");
        self.run_bytes(&["show", &spec])
    }

    /// `git diff <rev>` against the current work tree, name-status lines.
    pub fn diff_name_status(&self, rev: &str) -> anyhow::Result<String> {
        self.run(&["diff", "--name-status", "--no-renames", rev])
    }

    /// `git diff <rev>` against the current work tree, numstat lines.
    pub fn diff_numstat(&self, rev: &str) -> anyhow::Result<String> {
        self.run(&["diff", "--numstat", "--no-renames", rev])
    }

    pub fn reset_hard(&self, rev: &str) -> anyhow::Result<()> {
        self.run(&["reset", "--hard", rev]).map(|_| ())
    }

    /// Remove untracked files and directories from the work tree.
    pub fn clean_untracked(&self) -> anyhow::Result<()> {
        self.run(&["clean", "-fd"]).map(|_| ())
    }
}

/// Parse porcelain status, keeping paths whose index column shows a staged
/// change (untracked `??` and worktree-only changes are excluded). Rename
/// entries (`R  old -> new`) yield the new path.
fn parse_staged(porcelain: &str) -> Vec<String> {
    porcelain
        .lines()
        .filter(|line| line.len() > 3)
        .filter(|line| {
            let index = line.as_bytes()[0];
            index != b' ' && index != b'?' && index != b'!'
        })
        .map(|line| {
            let path = line[3..].trim();
            match path.split_once(" -> ") {
                Some((_, new)) => new.to_string(),
                None => path.to_string(),
            }
        })
        .collect()
}

fn parse_log(raw: &str) -> anyhow::Result<Vec<LogEntry>> {
    let mut entries = Vec::new();
    for record in raw.split(RECORD_SEP) {
        let record = record.trim_matches(['\n', '\r', ' ']);
        if record.is_empty() {
            continue;
        }
        let fields: Vec<&str> = record.split(FIELD_SEP).collect();
        if fields.len() != 4 {
            anyhow::bail!("malformed log record: {record:?}");
        }
        let date = OffsetDateTime::parse(fields[3].trim(), &Rfc3339)
            .with_context(|| format!("bad commit date {:?}", fields[3]))?;
        entries.push(LogEntry {
            hash: fields[0].to_string(),
            subject: fields[1].to_string(),
            body: fields[2].trim_end_matches(['\n', '\r']).to_string(),
            date,
        });
    }
    Ok(entries)
}

/// Detect the remote origin URL of the project's own repository.
/// Returns `None` if the project is not a git repo or has no remote.
pub fn detect_remote_url(project_root: &Path) -> Option<String> {
    Command::new("git")
        .args(["config", "--get", "remote.origin.url"])
        .current_dir(project_root)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Detect the current branch of the project's own repository via
/// `git rev-parse --abbrev-ref HEAD`. Returns `None` if not in a git repo
/// or git is unavailable.
pub fn detect_branch(project_root: &Path) -> Option<String> {
    Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(project_root)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
