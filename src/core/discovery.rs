//! Directory enumeration: flat path lists and depth-bounded tree scans

use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::config::{COMMENT_PREFIX, ONELINER_PREFIX, ONELINER_SEPARATOR, VCS_DIR_NAME};

/// Where the list of directories to publish comes from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectorySource {
    /// A text file with one path per line
    File(PathBuf),
    /// Every directory under `root`, up to `max_depth` levels below it
    Tree { root: PathBuf, max_depth: usize },
}

impl DirectorySource {
    pub fn enumerate(&self) -> Vec<PathBuf> {
        match self {
            DirectorySource::File(path) => read_dirs_from_file(path),
            DirectorySource::Tree { root, max_depth } => scan_directories(root, *max_depth),
        }
    }
}

/// Enumerates directories on the blocking pool
pub async fn enumerate_directories(source: DirectorySource) -> Vec<PathBuf> {
    tokio::task::spawn_blocking(move || source.enumerate())
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "directory enumeration task failed");
            Vec::new()
        })
}

/// Reads directory paths from a file
///
/// A missing or unreadable file yields an empty list; the caller reports
/// "nothing to do".
pub fn read_dirs_from_file(path: impl AsRef<Path>) -> Vec<PathBuf> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => parse_dir_list(&content),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read directory list");
            Vec::new()
        }
    }
}

/// Parses a directory list
///
/// Blank lines and `#` comments are skipped. Lines in the
/// `gitit <path>; gitit <path>` one-liner form contribute every path.
pub fn parse_dir_list(content: &str) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        if line.starts_with(ONELINER_PREFIX) {
            dirs.extend(
                line.split(ONELINER_SEPARATOR)
                    .filter_map(|part| part.trim().strip_prefix(ONELINER_PREFIX))
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from),
            );
        } else {
            dirs.push(PathBuf::from(line));
        }
    }

    dirs
}

/// Recursively lists directories under `root`, including `root` itself
///
/// Depth counts path components below the root, so `max_depth == 0` yields
/// only the root. `.git` directories are pruned with their whole subtree.
/// Ignore files and hidden-file rules are not applied and symlinks are not
/// followed. An unreadable root yields an empty list.
pub fn scan_directories(root: impl AsRef<Path>, max_depth: usize) -> Vec<PathBuf> {
    let root = root.as_ref();

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(Some(max_depth))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| entry.file_name() != VCS_DIR_NAME)
        .build();

    let mut dirs = Vec::new();
    for result in walker {
        match result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    dirs.push(entry.into_path());
                }
            }
            Err(e) => debug!(root = %root.display(), error = %e, "skipping unreadable entry"),
        }
    }

    dirs
}
