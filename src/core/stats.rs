//! Run statistics shared between workers and the progress reporter
//!
//! Counters are atomics that are only ever incremented. Workers call
//! [`RunStatistics::record`] once per job; the reporter and the final
//! summary read a [`StatsSnapshot`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use super::config::{
    ERROR_MESSAGE_MAX_LENGTH, ERROR_MESSAGE_TRUNCATE_LENGTH, FAILED_DISPLAY_LIMIT,
    PATH_DISPLAY_WIDTH, SEQUENTIAL_SECS_PER_DIR, SPEEDUP_REPORT_MIN_DIRS,
};
use super::job::PublishResult;
use super::progress::format_duration;
use crate::utils::shorten_path;

#[derive(Debug)]
pub struct RunStatistics {
    total: u64,
    completed: AtomicU64,
    success: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    oversized_files: AtomicU64,
    start: Instant,
}

/// Point-in-time copy of the counters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatsSnapshot {
    pub total: u64,
    pub completed: u64,
    pub success: u64,
    pub failed: u64,
    pub skipped: u64,
    pub oversized_files: u64,
    pub elapsed: Duration,
}

impl RunStatistics {
    pub fn new(total: usize) -> Self {
        Self {
            total: total as u64,
            completed: AtomicU64::new(0),
            success: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            oversized_files: AtomicU64::new(0),
            start: Instant::now(),
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Records one finished job
    pub fn record(&self, result: &PublishResult) {
        // Outcome counters are bumped before `completed` so a reader that sees
        // a completion also sees its outcome.
        if result.success {
            self.success.fetch_add(1, Ordering::Relaxed);
            if result.skipped {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.oversized_files
            .fetch_add(result.oversized_files as u64, Ordering::Relaxed);
        self.completed.fetch_add(1, Ordering::Release);
    }

    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Acquire) >= self.total
    }

    /// Reads all counters
    ///
    /// `completed` is loaded first. Outcome counters may then include jobs
    /// that finished after that load, so the snapshot reports
    /// `completed = success + failed`, which is never behind the stored count.
    pub fn snapshot(&self) -> StatsSnapshot {
        let completed = self.completed.load(Ordering::Acquire);
        let success = self.success.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        debug_assert!(success + failed >= completed);

        StatsSnapshot {
            total: self.total,
            completed: success + failed,
            success,
            failed,
            skipped: self.skipped.load(Ordering::Relaxed),
            oversized_files: self.oversized_files.load(Ordering::Relaxed),
            elapsed: self.start.elapsed(),
        }
    }
}

impl StatsSnapshot {
    /// Completed directories per second
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.completed as f64 / secs
        } else {
            0.0
        }
    }

    /// Estimated time to finish, once at least one job completed
    pub fn eta(&self) -> Option<Duration> {
        let rate = self.rate();
        if self.completed == 0 || rate <= 0.0 {
            return None;
        }
        let remaining = self.total.saturating_sub(self.completed) as f64;
        Some(Duration::from_secs_f64(remaining / rate))
    }

    /// Generates the end-of-run summary
    pub fn generate_summary(&self, dry_run: bool) -> String {
        let mut lines = Vec::new();

        let mut headline = format!(
            "✅ Completed in {:.1}s • {} published • {} failed",
            self.elapsed.as_secs_f64(),
            self.success.saturating_sub(self.skipped),
            self.failed
        );
        if self.skipped > 0 {
            headline.push_str(&format!(" • {} skipped", self.skipped));
        }
        if dry_run {
            headline.push_str(" • dry run");
        }
        lines.push(headline);

        let mut details = format!("   {} directories", self.total);
        if self.total > 0 && self.elapsed.as_secs_f64() > 0.0 {
            details.push_str(&format!(
                " • {:.2} dirs/sec",
                self.total as f64 / self.elapsed.as_secs_f64()
            ));
        }
        if self.oversized_files > 0 {
            details.push_str(&format!(
                " • {} oversized {} handled",
                self.oversized_files,
                if self.oversized_files == 1 { "file" } else { "files" }
            ));
        }
        lines.push(details);

        if !dry_run && self.total > SPEEDUP_REPORT_MIN_DIRS {
            let sequential = self.total as f64 * SEQUENTIAL_SECS_PER_DIR;
            let actual = self.elapsed.as_secs_f64().max(f64::EPSILON);
            lines.push(format!(
                "⚡ {:.1}x faster than sequential publishing (~{})",
                sequential / actual,
                format_duration(Duration::from_secs_f64(sequential))
            ));
        }

        lines.join("\n")
    }
}

/// Lists failed directories, capped at a readable number of entries
pub fn generate_failure_report(results: &[PublishResult]) -> String {
    let failed: Vec<&PublishResult> = results.iter().filter(|r| !r.success).collect();
    if failed.is_empty() {
        return String::new();
    }

    let mut lines = vec![format!("🔴 FAILED ({})", failed.len())];
    let shown = failed.len().min(FAILED_DISPLAY_LIMIT);
    for (i, result) in failed.iter().take(shown).enumerate() {
        let tree_char = if i == shown - 1 && failed.len() <= shown {
            "└─"
        } else {
            "├─"
        };
        lines.push(format!(
            "   {} {:width$} # {}",
            tree_char,
            shorten_path(&result.path, PATH_DISPLAY_WIDTH),
            clean_error_message(&result.message),
            width = PATH_DISPLAY_WIDTH
        ));
    }
    if failed.len() > shown {
        lines.push(format!("   └─ ... and {} more", failed.len() - shown));
    }

    lines.join("\n")
}

/// Collapses whitespace and truncates long error text for display
pub fn clean_error_message(error: &str) -> String {
    let cleaned = error.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.chars().count() > ERROR_MESSAGE_MAX_LENGTH {
        let truncated: String = cleaned.chars().take(ERROR_MESSAGE_TRUNCATE_LENGTH).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}
