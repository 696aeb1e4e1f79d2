//! API token lookup

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::config::{EnvSource, ProcessEnv, TOKEN_ENV_VAR};
use crate::git::run_program;

const TOKEN_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Finds an API token: `gh auth token` first, then `GITHUB_TOKEN`
///
/// Returns `None` when neither is available. The token itself is never logged.
pub async fn resolve_token(cancel: &CancellationToken) -> Option<String> {
    let from_cli = match run_program(
        "gh",
        &["auth", "token"],
        None,
        Duration::from_secs(TOKEN_LOOKUP_TIMEOUT_SECS),
        cancel,
    )
    .await
    {
        Ok(output) => Some(output.stdout),
        Err(e) => {
            debug!(error = %e, "gh auth token unavailable");
            None
        }
    };

    pick_token(from_cli, &ProcessEnv)
}

fn pick_token(from_cli: Option<String>, env: &dyn EnvSource) -> Option<String> {
    from_cli
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| env.var(TOKEN_ENV_VAR).map(|t| t.trim().to_string()))
        .filter(|t| !t.is_empty())
}
