use crate::hash::sha256_hex;
use std::path::Path;

/// Display length of a repository identity, in hex characters.
pub const IDENTITY_LEN: usize = 12;

/// Compute a deterministic repository identity from the project's remote
/// URL (preferred) or its local root path.
///
/// The identity names the shadow repository's directory, so two clones of
/// the same remote share one checkpoint history while unrelated local
/// projects get distinct ones.
pub fn resolve_identity(remote_url: Option<&str>, root: &Path) -> String {
    let input = match remote_url {
        Some(url) if !url.trim().is_empty() => url.trim().to_string(),
        _ => normalize_path(root),
    };
    sha256_hex(input.as_bytes())[..IDENTITY_LEN].to_string()
}

/// Normalize a path: canonicalize, lowercase on Windows, forward slashes.
fn normalize_path(p: &Path) -> String {
    let abs = p
        .canonicalize()
        .unwrap_or_else(|_| p.to_path_buf())
        .to_string_lossy()
        .to_string();
    // Lowercase on Windows for consistency
    #[cfg(windows)]
    let abs = abs.to_lowercase();
    // Normalize path separators to forward slashes
    abs.replace('\\', "/")
}
