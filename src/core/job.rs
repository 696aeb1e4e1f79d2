//! Jobs handed to workers and the results they produce

use std::path::{Path, PathBuf};

use super::naming::repo_name_for_path;

/// One directory to publish
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub path: PathBuf,
    pub repo_name: String,
}

impl Job {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let repo_name = repo_name_for_path(&path);
        Self { path, repo_name }
    }
}

/// Outcome of publishing one directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishResult {
    pub path: PathBuf,
    pub success: bool,
    pub message: String,
    /// Browsable repository URL, set on success
    pub repo_url: Option<String>,
    /// Directory was already published and left untouched
    pub skipped: bool,
    /// Files over the size limit that were excluded or sent to LFS
    pub oversized_files: usize,
}

impl PublishResult {
    pub fn failure(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            message: message.into(),
            repo_url: None,
            skipped: false,
            oversized_files: 0,
        }
    }

    pub fn success(path: &Path, message: impl Into<String>, repo_url: String) -> Self {
        Self {
            path: path.to_path_buf(),
            success: true,
            message: message.into(),
            repo_url: Some(repo_url),
            skipped: false,
            oversized_files: 0,
        }
    }

    pub fn skipped(mut self) -> Self {
        self.skipped = true;
        self
    }

    pub fn with_oversized_files(mut self, count: usize) -> Self {
        self.oversized_files = count;
        self
    }
}
