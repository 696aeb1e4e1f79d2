//! # gitfleet
//!
//! `gitfleet` publishes many local directories as individual GitHub
//! repositories. It powers the `gitfleet` CLI tool.
//!
//! ## Core Features
//!
//! - **Enumeration**: Directory lists from a file or a depth-bounded tree scan.
//! - **Parallel Publishing**: A bounded worker pool runs init, commit, remote creation and force push per directory.
//! - **Partial Failure**: Every directory gets its own result; one failure never stops the batch.
//! - **Large Files**: Files over 100 MiB are kept out of history via `.gitignore` or Git LFS.
//! - **Live Progress**: Throughput and ETA while the pool runs, and a summary at the end.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gitfleet::core::{repo_name_for_path, scan_directories};
//!
//! for dir in scan_directories("projects", 1) {
//!     println!("{} -> {}", dir.display(), repo_name_for_path(&dir));
//! }
//! ```

pub mod commands;
pub mod core;
pub mod git;
pub mod remote;
pub mod utils;
