//! Remote repository name derivation

use std::path::Path;

use super::config::{FALLBACK_REPO_NAME, MAX_REPO_NAME_LENGTH};

/// Maps a directory path to a valid remote repository name
///
/// Takes the last path component, lowercases it, turns spaces into hyphens
/// and keeps only `[a-z0-9-_]`. Names are capped at the host's 100 character
/// limit and fall back to `"repo"` when nothing survives.
///
/// Two directories that normalize to the same name map to the same remote
/// repository; the publish planner detects and serializes those.
pub fn repo_name_for_path(path: impl AsRef<Path>) -> String {
    let base = path
        .as_ref()
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();

    normalize_repo_name(&base)
}

/// Normalizes a bare name; see [`repo_name_for_path`]
pub fn normalize_repo_name(raw: &str) -> String {
    let name: String = raw
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_')
        .take(MAX_REPO_NAME_LENGTH)
        .collect();

    if name.is_empty() {
        FALLBACK_REPO_NAME.to_string()
    } else {
        name
    }
}
