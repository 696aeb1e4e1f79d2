//! Per-directory publish state machine

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::{DEFAULT_BRANCH, HTTP_POST_BUFFER, REMOTE_NAME, VCS_DIR_NAME};
use crate::core::{
    append_ignore_entries, find_oversized_files, Job, PublishResult, PublishSettings,
    OVERSIZE_THRESHOLD,
};
use crate::git::{is_rate_limit_error, CommandError, CommandOutput, Step, StepOutcome, Vcs};
use crate::remote::RemoteHost;
use crate::utils::remove_vcs_dirs;

pub const MISSING_DIR_MESSAGE: &str = "Directory does not exist";
pub const CANCELLED_MESSAGE: &str = "Cancelled before start";
pub const DRY_RUN_MESSAGE: &str = "Dry run - would push";
pub const SKIPPED_MESSAGE: &str = "Skipped - already synced";
pub const SUCCESS_MESSAGE: &str = "Success";
const RATE_LIMIT_PREFIX: &str = "⚠️ RATE LIMIT: ";
const COMMIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Publishes one directory to its hosted repository
pub struct Publisher {
    vcs: Arc<dyn Vcs>,
    remote: Arc<dyn RemoteHost>,
    settings: PublishSettings,
    cancel: CancellationToken,
    oversize_threshold: u64,
}

impl Publisher {
    pub fn new(
        vcs: Arc<dyn Vcs>,
        remote: Arc<dyn RemoteHost>,
        settings: PublishSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            vcs,
            remote,
            settings,
            cancel,
            oversize_threshold: OVERSIZE_THRESHOLD,
        }
    }

    /// Overrides the size above which files are kept out of plain git
    pub fn with_oversize_threshold(mut self, bytes: u64) -> Self {
        self.oversize_threshold = bytes;
        self
    }

    /// Runs every step for `job`; never panics on step failure
    pub async fn publish(&self, job: &Job) -> PublishResult {
        match self.run_steps(job).await {
            Ok(result) | Err(result) => result,
        }
    }

    async fn run_steps(&self, job: &Job) -> Result<PublishResult, PublishResult> {
        let path = job.path.as_path();

        if self.cancel.is_cancelled() {
            return Err(PublishResult::failure(path, CANCELLED_MESSAGE));
        }

        if !is_directory(path).await {
            return Err(PublishResult::failure(path, MISSING_DIR_MESSAGE));
        }

        let browse_url = self.remote.browse_url(&job.repo_name);

        if self.settings.dry_run {
            return Ok(PublishResult::success(path, DRY_RUN_MESSAGE, browse_url));
        }

        if self.settings.skip_synced && self.is_already_synced(job).await {
            debug!(path = %path.display(), "already synced");
            return Ok(PublishResult::success(path, SKIPPED_MESSAGE, browse_url).skipped());
        }

        self.settle(path, Step::Reset, self.reset(path).await)?;
        self.settle(path, Step::Configure, self.configure(path).await)?;

        let (oversized, ignore_result) = self.exclude_oversized(path).await;
        self.settle(path, Step::IgnoreUpdate, ignore_result)?;

        let staged = self.git(path, &["add", "-A"]).await;
        self.settle(path, Step::Stage, staged)?;

        let message = format!(
            "Auto commit {}",
            chrono::Local::now().format(COMMIT_TIMESTAMP_FORMAT)
        );
        let committed = self
            .git(path, &["commit", "--allow-empty", "-m", &message])
            .await;
        self.settle(path, Step::Commit, committed)?;

        let outcome = self.remote.ensure_repo(&job.repo_name).await;
        debug!(path = %path.display(), repo = %job.repo_name, outcome = %outcome, "remote ensured");

        let remote_result = self.configure_remote(path, &job.repo_name).await;
        self.settle(path, Step::ConfigureRemote, remote_result)?;

        let pushed = self
            .git(
                path,
                &["push", "--set-upstream", REMOTE_NAME, DEFAULT_BRANCH, "--force"],
            )
            .await;
        self.settle(path, Step::Push, pushed).map_err(|mut failure| {
            if is_rate_limit_error(&failure.message) {
                failure.message = format!("{RATE_LIMIT_PREFIX}{}", failure.message);
            }
            failure
        })?;

        info!(path = %path.display(), repo = %job.repo_name, "published");
        Ok(PublishResult::success(path, SUCCESS_MESSAGE, browse_url).with_oversized_files(oversized))
    }

    /// Applies the step's tolerance: fatal failures end the job
    fn settle<T, E: Display>(
        &self,
        path: &Path,
        step: Step,
        result: Result<T, E>,
    ) -> Result<(), PublishResult> {
        match StepOutcome::evaluate(step, result.map(|_| ())) {
            StepOutcome::Done => Ok(()),
            StepOutcome::SoftFailed(message) => {
                warn!(path = %path.display(), step = %step, "{message}");
                Ok(())
            }
            StepOutcome::Fatal(message) => {
                debug!(path = %path.display(), step = %step, "{message}");
                Err(PublishResult::failure(path, message))
            }
        }
    }

    async fn git(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, CommandError> {
        self.vcs.run(dir, args).await
    }

    /// Drops all existing history, nested repositories included, and starts
    /// a fresh repository on the default branch
    async fn reset(&self, path: &Path) -> Result<(), String> {
        let root = path.to_path_buf();
        match tokio::task::spawn_blocking(move || remove_vcs_dirs(&root)).await {
            Ok(Ok(0)) => {}
            Ok(Ok(removed)) => debug!(path = %path.display(), removed, "cleared existing history"),
            Ok(Err(e)) => return Err(format!("cannot remove existing history: {e}")),
            Err(e) => return Err(e.to_string()),
        }

        self.git(path, &["init", "-b", DEFAULT_BRANCH])
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn configure(&self, path: &Path) -> Result<(), CommandError> {
        let identity = &self.settings.identity;
        let entries = [
            ("user.name", identity.name.as_str()),
            ("user.email", identity.email.as_str()),
            ("core.autocrlf", "false"),
            ("http.postBuffer", HTTP_POST_BUFFER),
        ];

        let mut first_error = None;
        for (key, value) in entries {
            if let Err(e) = self.git(path, &["config", key, value]).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Scans for oversized files and keeps them out of plain git history
    ///
    /// Returns how many files were found along with the step result.
    async fn exclude_oversized(&self, path: &Path) -> (usize, Result<(), String>) {
        let dir = path.to_path_buf();
        let threshold = self.oversize_threshold;
        let oversized = match tokio::task::spawn_blocking(move || find_oversized_files(dir, threshold)).await {
            Ok(files) => files,
            Err(e) => return (0, Err(e.to_string())),
        };

        if oversized.is_empty() {
            return (0, Ok(()));
        }

        info!(path = %path.display(), count = oversized.len(), "oversized files found");
        let count = oversized.len();

        if self.settings.lfs {
            match self.git(path, &["lfs", "install", "--local"]).await {
                Ok(_) => return (count, self.track_with_lfs(path, &oversized).await),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "git lfs unavailable, ignoring oversized files instead");
                }
            }
        }

        (count, write_ignore_entries(path.to_path_buf(), oversized).await)
    }

    async fn track_with_lfs(&self, path: &Path, files: &[String]) -> Result<(), String> {
        for file in files {
            self.git(path, &["lfs", "track", file])
                .await
                .map_err(|e| format!("lfs track {file}: {e}"))?;
        }
        Ok(())
    }

    async fn configure_remote(&self, path: &Path, repo_name: &str) -> Result<(), CommandError> {
        let clone_url = self.remote.clone_url(repo_name);

        // A freshly initialised repository has no origin yet
        let _ = self.git(path, &["remote", "remove", REMOTE_NAME]).await;
        self.git(path, &["remote", "add", REMOTE_NAME, &clone_url]).await?;
        Ok(())
    }

    /// Clean working tree, origin pointing at the expected repository, and
    /// nothing ahead of the remote branch
    async fn is_already_synced(&self, job: &Job) -> bool {
        let path = job.path.as_path();
        if !tokio::fs::try_exists(path.join(VCS_DIR_NAME)).await.unwrap_or(false) {
            return false;
        }

        match self.git(path, &["remote", "get-url", REMOTE_NAME]).await {
            Ok(output) if output.stdout == self.remote.clone_url(&job.repo_name) => {}
            _ => return false,
        }

        match self.git(path, &["status", "--porcelain"]).await {
            Ok(output) if output.stdout.is_empty() => {}
            _ => return false,
        }

        let ahead_range = format!("{REMOTE_NAME}/{DEFAULT_BRANCH}..HEAD");
        matches!(
            self.git(path, &["rev-list", "--count", &ahead_range]).await,
            Ok(output) if output.stdout == "0"
        )
    }
}

async fn is_directory(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_dir())
        .unwrap_or(false)
}

async fn write_ignore_entries(dir: PathBuf, entries: Vec<String>) -> Result<(), String> {
    match tokio::task::spawn_blocking(move || append_ignore_entries(dir, &entries)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(e.to_string()),
    }
}
