//! Public API for the core module.
//!
//! Internal implementation details are not exposed through this API.

// Data model
pub use super::job::{Job, PublishResult};
pub use super::stats::{RunStatistics, StatsSnapshot, generate_failure_report};

// Enumeration and naming
pub use super::discovery::{
    DirectorySource, enumerate_directories, parse_dir_list, read_dirs_from_file, scan_directories,
};
pub use super::naming::{normalize_repo_name, repo_name_for_path};

// Oversized files
pub use super::oversize::{append_ignore_entries, find_oversized_files};

// Progress
pub use super::progress::{LogWriter, ProgressReporter, format_duration, render_status};

// Configuration
pub use super::config::{
    CliOverrides, ConfigError, FileConfig, Identity, PublishSettings, DEFAULT_MAX_DEPTH,
    DEFAULT_WORKERS, OVERSIZE_THRESHOLD, PROGRESS_TICK_MS,
};

// Terminal utilities (re-exported from utils)
pub use crate::utils::{finished_title, progress_title, set_terminal_title};

