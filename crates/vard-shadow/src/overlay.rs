use crate::paths::{write_atomic, ShadowPaths};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Display length of a checkpoint id, in hex characters.
pub const SHORT_ID_LEN: usize = 7;

/// Normalize a checkpoint id to its short display form, so callers may
/// pass either the short id or a full commit hash.
pub fn short_id(id: &str) -> &str {
    if id.len() > SHORT_ID_LEN && id.is_char_boundary(SHORT_ID_LEN) {
        &id[..SHORT_ID_LEN]
    } else {
        id
    }
}

/// The three metadata overlays layered over the immutable commit history:
/// soft-delete tombstones, rename overrides, and favorite marks.
///
/// Each is a small flat file in the shadow repository directory, rewritten
/// whole on change. Entries referencing unknown ids are inert. Concurrent
/// writers are last-write-wins; the files are small enough that the
/// atomic temp-file rename is the only guard.
#[derive(Debug, Clone)]
pub struct Overlays {
    deleted_file: PathBuf,
    renamed_file: PathBuf,
    favorites_file: PathBuf,
}

impl Overlays {
    pub fn new(paths: &ShadowPaths) -> Self {
        Self {
            deleted_file: paths.deleted_file.clone(),
            renamed_file: paths.renamed_file.clone(),
            favorites_file: paths.favorites_file.clone(),
        }
    }

    // ── Tombstones ──

    /// Ids excluded from listings. Missing file means none.
    pub fn tombstones(&self) -> anyhow::Result<HashSet<String>> {
        read_id_set(&self.deleted_file)
    }

    /// Add an id to the tombstone set. Idempotent.
    pub fn add_tombstone(&self, id: &str) -> anyhow::Result<()> {
        let mut ids = self.tombstones()?;
        if ids.insert(short_id(id).to_string()) {
            write_id_set(&self.deleted_file, &ids)?;
        }
        Ok(())
    }

    // ── Renames ──

    /// Display-name overrides by id.
    pub fn renames(&self) -> anyhow::Result<HashMap<String, String>> {
        if !self.renamed_file.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.renamed_file)?;
        let mut map = HashMap::new();
        for line in content.lines() {
            if let Some((id, name)) = line.split_once('\t') {
                if !id.trim().is_empty() {
                    map.insert(short_id(id.trim()).to_string(), name.to_string());
                }
            }
        }
        Ok(map)
    }

    /// Upsert the display name for an id; a re-rename overrides the prior one.
    pub fn set_rename(&self, id: &str, name: &str) -> anyhow::Result<()> {
        let mut map = self.renames()?;
        // Tabs and newlines would corrupt the line format.
        let clean: String = name
            .chars()
            .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        map.insert(short_id(id).to_string(), clean);
        let mut lines: Vec<String> = map
            .iter()
            .map(|(id, name)| format!("{id}\t{name}"))
            .collect();
        lines.sort();
        let mut content = lines.join("\n");
        content.push('\n');
        write_atomic(&self.renamed_file, content.as_bytes())
    }

    // ── Favorites ──

    /// Ids currently marked favorite.
    pub fn favorites(&self) -> anyhow::Result<HashSet<String>> {
        read_id_set(&self.favorites_file)
    }

    /// Flip favorite membership; returns the resulting state.
    pub fn toggle_favorite(&self, id: &str) -> anyhow::Result<bool> {
        let mut ids = self.favorites()?;
        let key = short_id(id).to_string();
        let now_favorite = if ids.contains(&key) {
            ids.remove(&key);
            false
        } else {
            ids.insert(key);
            true
        };
        write_id_set(&self.favorites_file, &ids)?;
        Ok(now_favorite)
    }
}

/// Read a newline-separated id file. Returns empty set if missing.
fn read_id_set(path: &Path) -> anyhow::Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| short_id(l).to_string())
        .collect())
}

fn write_id_set(path: &Path, ids: &HashSet<String>) -> anyhow::Result<()> {
    let mut lines: Vec<&str> = ids.iter().map(String::as_str).collect();
    lines.sort_unstable();
    let mut content = lines.join("\n");
    content.push('\n');
    write_atomic(path, content.as_bytes())
}
