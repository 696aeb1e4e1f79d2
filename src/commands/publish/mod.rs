//! Bulk publish command implementation

mod dispatcher;
mod executor;
mod planner;

use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::core::{
    enumerate_directories, finished_title, generate_failure_report, progress_title,
    set_terminal_title, DirectorySource, Job, PublishResult, PublishSettings, RunStatistics,
    StatsSnapshot,
};
use crate::git::GitCli;
use crate::remote::{resolve_token, GitHubRemote};

pub use dispatcher::Dispatcher;
pub use executor::{
    Publisher, CANCELLED_MESSAGE, DRY_RUN_MESSAGE, MISSING_DIR_MESSAGE, SKIPPED_MESSAGE,
    SUCCESS_MESSAGE,
};
pub use planner::{plan_jobs, JobPlan, NameCollision};

pub const NO_DIRS_MESSAGE: &str = "No directories found to process";

/// How a publish run ended
#[derive(Debug)]
pub enum PublishRun {
    /// Enumeration produced nothing; nothing was dispatched
    NoDirectories,
    Completed {
        results: Vec<PublishResult>,
        summary: StatsSnapshot,
    },
}

/// Handles the publish command end to end
pub async fn handle_publish_command(
    settings: PublishSettings,
    source: DirectorySource,
    cancel: CancellationToken,
) -> Result<PublishRun> {
    let dirs = enumerate_directories(source).await;
    if dirs.is_empty() {
        println!("{NO_DIRS_MESSAGE}");
        return Ok(PublishRun::NoDirectories);
    }

    let plan = plan_jobs(dirs);
    report_plan(&plan);
    set_terminal_title(&progress_title(0, plan.jobs.len() as u64));

    let worker_word = if settings.workers == 1 { "worker" } else { "workers" };
    println!(
        "🚀 Publishing {} directories with {} {}{}",
        plan.jobs.len(),
        settings.workers,
        worker_word,
        if settings.dry_run { " (dry run)" } else { "" }
    );
    println!("   Account: {} on {}\n", settings.account, settings.host);

    // Dry runs make no network calls, token lookup included
    let token = if settings.dry_run {
        None
    } else {
        let token = resolve_token(&cancel).await;
        if token.is_none() {
            println!("⚠️  No GitHub token found (gh auth token / GITHUB_TOKEN); using `gh repo create`\n");
        }
        token
    };

    let vcs = Arc::new(GitCli::new(settings.command_timeout, cancel.clone()));
    let remote = Arc::new(GitHubRemote::new(&settings, token, cancel.clone())?);
    let publisher = Arc::new(Publisher::new(vcs, remote, settings.clone(), cancel));

    let (results, summary) = publish_all(plan.jobs, publisher, &settings, true).await?;

    println!("\n{}", summary.generate_summary(settings.dry_run));
    let failures = generate_failure_report(&results);
    if !failures.is_empty() {
        println!("\n{failures}");
    }
    println!();

    set_terminal_title(&finished_title(summary.failed));
    Ok(PublishRun::Completed { results, summary })
}

/// Runs `jobs` through a worker pool sized from `settings`
///
/// Returns the results in completion order and the final counters.
pub async fn publish_all(
    jobs: Vec<Job>,
    publisher: Arc<Publisher>,
    settings: &PublishSettings,
    show_progress: bool,
) -> Result<(Vec<PublishResult>, StatsSnapshot)> {
    let stats = Arc::new(RunStatistics::new(jobs.len()));
    let dispatcher = Dispatcher::new(settings.workers, Arc::clone(&stats))
        .with_progress(show_progress)
        .with_verbose(settings.verbose);

    let results = dispatcher.run(jobs, publisher).await?;
    Ok((results, stats.snapshot()))
}

fn report_plan(plan: &JobPlan) {
    if !plan.duplicate_paths.is_empty() {
        println!(
            "ℹ️  Skipping {} duplicate {}",
            plan.duplicate_paths.len(),
            if plan.duplicate_paths.len() == 1 { "path" } else { "paths" }
        );
    }

    for collision in &plan.name_collisions {
        println!(
            "⚠️  {} directories map to repository '{}'; they run one at a time and the last push wins:",
            collision.paths.len(),
            collision.repo_name
        );
        for path in &collision.paths {
            println!("   • {}", path.display());
        }
    }

    if !plan.duplicate_paths.is_empty() || !plan.name_collisions.is_empty() {
        println!();
    }
}
