//! Live progress reporting while the worker pool runs

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::config::{PROGRESS_CHARS, PROGRESS_TEMPLATE};
use super::stats::{RunStatistics, StatsSnapshot};
use crate::utils::{progress_title, set_terminal_title};

const ETA_PENDING: &str = "calculating...";

/// Bar currently drawn on stderr, if any
static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn active_bar() -> Option<ProgressBar> {
    match ACTIVE_BAR.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn set_active_bar(bar: Option<ProgressBar>) {
    match ACTIVE_BAR.lock() {
        Ok(mut guard) => *guard = bar,
        Err(poisoned) => *poisoned.into_inner() = bar,
    }
}

/// Stderr log sink that clears the live progress bar while a line is written
///
/// Install with `tracing_subscriber::fmt().with_writer(|| LogWriter)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match active_bar() {
            Some(bar) => bar.suspend(|| io::stderr().write_all(buf))?,
            None => io::stderr().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Ticker that samples [`RunStatistics`] on a fixed interval and redraws a
/// progress bar with throughput and ETA
pub struct ProgressReporter {
    bar: ProgressBar,
    visible: bool,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Starts the ticker task; call [`ProgressReporter::stop`] once the pool has joined
    pub fn start(stats: Arc<RunStatistics>, interval: Duration, visible: bool) -> Result<Self> {
        let bar = if visible {
            ProgressBar::new(stats.total())
        } else {
            ProgressBar::hidden()
        };
        bar.set_length(stats.total());
        bar.set_style(create_progress_style()?);
        if visible {
            set_active_bar(Some(bar.clone()));
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let tick_bar = bar.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            let mut shown = None;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let snapshot = stats.snapshot();
                        render_tick(&tick_bar, &snapshot);
                        if visible && shown != Some(snapshot.completed) {
                            shown = Some(snapshot.completed);
                            set_terminal_title(&progress_title(snapshot.completed, snapshot.total));
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            render_tick(&tick_bar, &stats.snapshot());
        });

        Ok(Self {
            bar,
            visible,
            stop_tx,
            handle,
        })
    }

    /// Bar handle for printing lines above the progress display
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    /// Stops the ticker after a final redraw
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.handle.await {
            tracing::debug!(error = %e, "progress ticker ended abnormally");
        }
        self.bar.finish();
        if self.visible {
            set_active_bar(None);
        }
    }
}

fn render_tick(bar: &ProgressBar, snapshot: &StatsSnapshot) {
    bar.set_position(snapshot.completed);
    bar.set_message(render_status(snapshot));
}

/// Creates the bar style
pub(crate) fn create_progress_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)?
        .progress_chars(PROGRESS_CHARS))
}

/// Status text shown next to the bar: outcomes, throughput and ETA
pub fn render_status(snapshot: &StatsSnapshot) -> String {
    let eta = snapshot
        .eta()
        .map(format_duration)
        .unwrap_or_else(|| ETA_PENDING.to_string());

    format!(
        "✓{} ✗{} | {:.1}/s | ETA {}",
        snapshot.success,
        snapshot.failed,
        snapshot.rate(),
        eta
    )
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let rem = secs % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else if mins > 0 {
        format!("{mins}m {rem}s")
    } else {
        format!("{rem}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::PublishResult;
    use std::path::Path;

    fn snapshot(completed: u64, failed: u64, elapsed_secs: u64) -> StatsSnapshot {
        StatsSnapshot {
            total: 10,
            completed,
            success: completed - failed,
            failed,
            skipped: 0,
            oversized_files: 0,
            elapsed: Duration::from_secs(elapsed_secs),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0s");
        assert_eq!(format_duration(Duration::from_secs(59)), "59s");
        assert_eq!(format_duration(Duration::from_secs(61)), "1m 1s");
        assert_eq!(format_duration(Duration::from_secs(3 * 3600 + 120)), "3h 2m");
    }

    #[test]
    fn test_status_before_first_completion() {
        let status = render_status(&snapshot(0, 0, 3));
        assert_eq!(status, "✓0 ✗0 | 0.0/s | ETA calculating...");
    }

    #[test]
    fn test_status_with_progress() {
        let status = render_status(&snapshot(5, 1, 10));
        assert_eq!(status, "✓4 ✗1 | 0.5/s | ETA 10s");
    }

    #[test]
    fn test_style_template_is_valid() {
        assert!(create_progress_style().is_ok());
    }

    #[tokio::test]
    async fn test_reporter_tracks_counters_until_stopped() {
        let stats = Arc::new(RunStatistics::new(2));
        let reporter =
            ProgressReporter::start(Arc::clone(&stats), Duration::from_millis(10), false).unwrap();

        stats.record(&PublishResult::failure(Path::new("/a"), "x"));
        stats.record(&PublishResult::failure(Path::new("/b"), "y"));
        tokio::time::sleep(Duration::from_millis(30)).await;

        let bar = reporter.bar().clone();
        reporter.stop().await;

        assert_eq!(bar.position(), 2);
        assert!(bar.message().starts_with("✓0 ✗2"));
        assert!(bar.is_finished());
    }

    #[tokio::test]
    async fn test_visible_bar_routes_log_lines_until_stopped() {
        let stats = Arc::new(RunStatistics::new(1));
        let reporter =
            ProgressReporter::start(Arc::clone(&stats), Duration::from_millis(10), true).unwrap();
        assert!(active_bar().is_some());

        let line = b"WARN soft failure\n";
        assert_eq!(LogWriter.write(line).unwrap(), line.len());

        reporter.stop().await;
        assert!(active_bar().is_none());
        assert_eq!(LogWriter.write(line).unwrap(), line.len());
    }
}
