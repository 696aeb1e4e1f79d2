//! Bounded worker pool draining a shared job queue

use anyhow::{Context, Result};
use dashmap::DashMap;
use futures::future::join_all;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::executor::Publisher;
use crate::core::config::PROGRESS_TICK_MS;
use crate::core::{Job, ProgressReporter, PublishResult, RunStatistics};

type NameLocks = DashMap<String, Arc<tokio::sync::Mutex<()>>>;

pub struct Dispatcher {
    workers: usize,
    stats: Arc<RunStatistics>,
    tick: Duration,
    show_progress: bool,
    verbose: bool,
}

impl Dispatcher {
    /// Dispatcher with a hidden progress bar; see [`Dispatcher::with_progress`]
    pub fn new(workers: usize, stats: Arc<RunStatistics>) -> Self {
        Self {
            workers,
            stats,
            tick: Duration::from_millis(PROGRESS_TICK_MS),
            show_progress: false,
            verbose: false,
        }
    }

    pub fn with_progress(mut self, visible: bool) -> Self {
        self.show_progress = visible;
        self
    }

    /// Prints one line per finished job above the progress bar
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Publishes every job and returns one result per job, in completion order
    pub async fn run(&self, jobs: Vec<Job>, publisher: Arc<Publisher>) -> Result<Vec<PublishResult>> {
        let total = jobs.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let reporter = ProgressReporter::start(Arc::clone(&self.stats), self.tick, self.show_progress)?;

        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let name_locks: Arc<NameLocks> = Arc::new(DashMap::new());
        let (tx, mut rx) = mpsc::channel::<PublishResult>(total);
        let worker_count = self.workers.clamp(1, total);
        debug!(workers = worker_count, jobs = total, "starting worker pool");

        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let queue = Arc::clone(&queue);
            let name_locks = Arc::clone(&name_locks);
            let publisher = Arc::clone(&publisher);
            let stats = Arc::clone(&self.stats);
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    let next = match queue.lock() {
                        Ok(mut guard) => guard.pop_front(),
                        Err(poisoned) => poisoned.into_inner().pop_front(),
                    };
                    let Some(job) = next else {
                        break;
                    };

                    let lock = name_locks
                        .entry(job.repo_name.clone())
                        .or_default()
                        .clone();
                    let result = {
                        let _guard = lock.lock().await;
                        publisher.publish(&job).await
                    };

                    stats.record(&result);
                    if tx.send(result).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(tx);

        let mut results = Vec::with_capacity(total);
        while let Some(result) = rx.recv().await {
            if self.verbose {
                let line = format_result_line(&result);
                if reporter.bar().is_hidden() {
                    println!("{line}");
                } else {
                    reporter.bar().println(line);
                }
            }
            results.push(result);
        }

        let joined = join_all(handles).await;
        reporter.stop().await;
        for outcome in joined {
            outcome.context("publish worker panicked")?;
        }

        Ok(results)
    }
}

fn format_result_line(result: &PublishResult) -> String {
    let symbol = if !result.success {
        "🔴"
    } else if result.skipped {
        "🟠"
    } else {
        "🟢"
    };
    match &result.repo_url {
        Some(url) if result.success => {
            format!("{symbol} {} → {} ({})", result.path.display(), url, result.message)
        }
        _ => format!("{symbol} {} # {}", result.path.display(), result.message),
    }
}
