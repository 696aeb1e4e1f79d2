//! Test fixtures and builders

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory tree with automatic cleanup
pub struct DirTreeBuilder {
    temp_dir: TempDir,
}

impl DirTreeBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Creates `relative` (and its parents) under the root
    pub fn dir(&self, relative: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    pub fn file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Creates a sparse file of exactly `size` bytes
    pub fn sized_file(&self, relative: &str, size: u64) -> Result<PathBuf> {
        let path = self.file(relative, "")?;
        fs::File::options().write(true).open(&path)?.set_len(size)?;
        Ok(path)
    }

    /// Path under the root that is never created
    pub fn missing(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }
}

/// Sorted list of every entry below `root`, for before/after comparisons
pub fn tree_listing(root: &Path) -> Vec<(PathBuf, u64)> {
    let mut entries = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(read) = fs::read_dir(&dir) else { continue };
        for entry in read.flatten() {
            let path = entry.path();
            let len = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if path.is_dir() {
                stack.push(path.clone());
            }
            entries.push((path, len));
        }
    }
    entries.sort();
    entries
}
