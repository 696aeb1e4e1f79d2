//! External command execution for git and the hosting CLI

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

const GIT_PROGRAM: &str = "git";

/// Why an external command did not succeed
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{}", describe_failure(.code, .output))]
    Failed { code: Option<i32>, output: String },

    #[error("timed out after {secs} seconds")]
    TimedOut { secs: u64 },

    #[error("cancelled")]
    Cancelled,
}

impl CommandError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::TimedOut { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommandError::Cancelled)
    }
}

fn describe_failure(code: &Option<i32>, output: &str) -> String {
    match (output.is_empty(), code) {
        (false, _) => output.to_string(),
        (true, Some(code)) => format!("exit status {code}"),
        (true, None) => "terminated by signal".to_string(),
    }
}

/// Trimmed output of a successful command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs a program with a timeout, honouring cancellation
///
/// The child is killed when the timeout fires or the token is cancelled.
/// A non-zero exit becomes [`CommandError::Failed`] carrying stderr, or
/// stdout when stderr is empty.
pub async fn run_program(
    program: &str,
    args: &[&str],
    dir: Option<&Path>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<CommandOutput, CommandError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .kill_on_drop(true);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    trace!(program, ?args, dir = ?dir, "running command");

    let output = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(CommandError::Cancelled),
        result = tokio::time::timeout(timeout, command.output()) => match result {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(CommandError::Spawn {
                    program: program.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(CommandError::TimedOut {
                    secs: timeout.as_secs(),
                })
            }
        },
    };

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if output.status.success() {
        Ok(CommandOutput { stdout, stderr })
    } else {
        Err(CommandError::Failed {
            code: output.status.code(),
            output: if stderr.is_empty() { stdout } else { stderr },
        })
    }
}

/// Version-control backend used by the publisher
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Runs `git <args>` inside `dir`
    async fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, CommandError>;
}

/// [`Vcs`] backed by the `git` binary
#[derive(Clone, Debug)]
pub struct GitCli {
    timeout: Duration,
    cancel: CancellationToken,
}

impl GitCli {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }
}

#[async_trait]
impl Vcs for GitCli {
    async fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, CommandError> {
        let result = run_program(GIT_PROGRAM, args, Some(dir), self.timeout, &self.cancel).await;
        if let Err(e) = &result {
            debug!(dir = %dir.display(), command = %args.join(" "), error = %e, "git command failed");
        }
        result
    }
}

/// Detects if an error message indicates a rate limit issue
pub fn is_rate_limit_error(error_msg: &str) -> bool {
    let error_lower = error_msg.to_lowercase();
    error_lower.contains("rate limit")
        || error_lower.contains("too many requests")
        || error_lower.contains("secondary rate limit")
        || (error_lower.contains("403") && error_lower.contains("github"))
}
