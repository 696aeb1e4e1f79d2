//! Path helpers for display and pattern files, plus history removal

use ignore::WalkBuilder;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::config::VCS_DIR_NAME;

/// Renders a relative path with `/` separators on every platform
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Shortens long paths for display, keeping the last two components
pub fn shorten_path(path: &Path, max_length: usize) -> String {
    let display = path.display().to_string();
    if display.chars().count() <= max_length {
        return display;
    }

    let components: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|s| !s.is_empty() && s != "/")
        .collect();
    if components.len() <= 2 {
        return display;
    }

    format!(
        ".../{}/{}",
        components[components.len() - 2],
        components[components.len() - 1]
    )
}

/// Removes every `.git` entry at or below `root`
///
/// Nested repositories lose their history too, so their files are committed
/// as plain content by the enclosing repository instead of as gitlinks.
/// Returns how many entries were removed.
pub fn remove_vcs_dirs(root: &Path) -> io::Result<usize> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(|entry| entry.file_name() != VCS_DIR_NAME)
        .build();

    let mut found: Vec<PathBuf> = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                debug!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }
        let candidate = entry.path().join(VCS_DIR_NAME);
        if fs::symlink_metadata(&candidate).is_ok() {
            found.push(candidate);
        }
    }

    for path in &found {
        // Worktrees and submodules use a `.git` file instead of a directory
        let removed = if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        match removed {
            Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
            _ => {}
        }
    }

    Ok(found.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_to_slash_path_joins_components() {
        let path: PathBuf = ["media", "raw", "clip.mov"].iter().collect();
        assert_eq!(to_slash_path(&path), "media/raw/clip.mov");
    }

    #[test]
    fn test_shorten_path_keeps_short_paths() {
        assert_eq!(shorten_path(Path::new("/a/b"), 30), "/a/b");
    }

    #[test]
    fn test_shorten_path_keeps_tail() {
        let long = Path::new("/very/long/path/to/some/project-dir");
        assert_eq!(shorten_path(long, 20), ".../some/project-dir");
    }

    #[test]
    fn test_remove_vcs_dirs_clears_nested_repositories() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::create_dir_all(root.join("child/.git/refs")).unwrap();
        fs::create_dir_all(root.join("a/b/deep/.git")).unwrap();
        fs::create_dir_all(root.join("worktree")).unwrap();
        fs::write(root.join("worktree/.git"), "gitdir: /elsewhere\n").unwrap();
        fs::write(root.join("child/inner.txt"), "keep").unwrap();

        assert_eq!(remove_vcs_dirs(root).unwrap(), 4);

        assert!(!root.join(".git").exists());
        assert!(!root.join("child/.git").exists());
        assert!(!root.join("a/b/deep/.git").exists());
        assert!(!root.join("worktree/.git").exists());
        assert!(root.join("child/inner.txt").exists());
        assert!(root.join("a/b/deep").is_dir());
    }

    #[test]
    fn test_remove_vcs_dirs_without_history() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        assert_eq!(remove_vcs_dirs(dir.path()).unwrap(), 0);
    }
}
