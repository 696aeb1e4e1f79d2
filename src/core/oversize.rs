//! Detection of files too large for the hosting service
//!
//! The scan walks one directory tree, skipping `.git`, and reports every
//! regular file strictly larger than the threshold. Paths are relative to
//! the scanned directory and always use `/`, since they end up in
//! `.gitignore` or `.gitattributes` patterns.

use ignore::WalkBuilder;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use super::config::{IGNORE_FILE_NAME, IGNORE_MARKER, VCS_DIR_NAME};
use crate::utils::to_slash_path;

/// Lists files under `dir` larger than `threshold` bytes, sorted
pub fn find_oversized_files(dir: impl AsRef<Path>, threshold: u64) -> Vec<String> {
    let dir = dir.as_ref();

    let walker = WalkBuilder::new(dir)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(|entry| entry.file_name() != VCS_DIR_NAME)
        .build();

    let mut oversized = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(_) => continue,
        };

        if size > threshold {
            if let Ok(relative) = entry.path().strip_prefix(dir) {
                oversized.push(to_slash_path(relative));
            }
        }
    }

    oversized.sort();
    oversized
}

/// Appends `entries` to `dir/.gitignore` under a marker comment
///
/// Each entry is written as a literal path anchored at `dir`. Existing
/// content is preserved and the file is created when missing.
/// Returns `Ok(false)` without touching the file when there is nothing to add.
pub fn append_ignore_entries(dir: impl AsRef<Path>, entries: &[String]) -> std::io::Result<bool> {
    if entries.is_empty() {
        return Ok(false);
    }

    let mut block = format!("\n{IGNORE_MARKER}\n");
    for entry in entries {
        block.push_str(&ignore_pattern_for(entry));
        block.push('\n');
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.as_ref().join(IGNORE_FILE_NAME))?;
    file.write_all(block.as_bytes())?;

    Ok(true)
}

/// Turns a relative path into a `.gitignore` line matching only that file
///
/// The leading `/` anchors the pattern, which also keeps a leading `!` or `#`
/// from being read as negation or comment.
fn ignore_pattern_for(relative: &str) -> String {
    let mut pattern = String::with_capacity(relative.len() + 2);
    pattern.push('/');
    for c in relative.chars() {
        if matches!(c, '\\' | '*' | '?' | '[' | ']') {
            pattern.push('\\');
        }
        pattern.push(c);
    }

    // Trailing spaces are stripped unless escaped
    let kept = pattern.trim_end_matches(' ').len();
    let trailing = pattern.len() - kept;
    pattern.truncate(kept);
    for _ in 0..trailing {
        pattern.push_str("\\ ");
    }
    pattern
}
