/// Built-in exclude patterns for the shadow repository.
///
/// Always unioned with configured extras, never replaced: a checkpoint of
/// someone's working tree must not sweep up dependency trees, media blobs,
/// or key material.
pub const DEFAULT_IGNORES: &[&str] = &[
    // Dependency and build output
    "node_modules/",
    "target/",
    "dist/",
    "build/",
    "out/",
    ".next/",
    "__pycache__/",
    ".venv/",
    "venv/",
    // Media binaries
    "*.png",
    "*.jpg",
    "*.jpeg",
    "*.gif",
    "*.ico",
    "*.mp3",
    "*.mp4",
    "*.mov",
    "*.avi",
    "*.pdf",
    // Caches and temp files
    ".cache/",
    "*.tmp",
    "*.swp",
    "*.log",
    ".DS_Store",
    "Thumbs.db",
    // Archives
    "*.zip",
    "*.tar",
    "*.gz",
    "*.tgz",
    "*.rar",
    "*.7z",
    // Embedded databases
    "*.sqlite",
    "*.sqlite3",
    "*.db",
    // Secrets
    ".env",
    ".env.*",
    "*.pem",
    "*.key",
    "*.crt",
    "id_rsa",
    "id_ed25519",
];

/// Render the full exclude file: defaults plus configured extras.
pub fn exclude_content(extra: &[String]) -> String {
    let mut lines: Vec<&str> = vec!["# managed by vard; edits are overwritten"];
    lines.extend(DEFAULT_IGNORES);
    lines.extend(extra.iter().map(String::as_str));
    let mut content = lines.join("\n");
    content.push('\n');
    content
}
