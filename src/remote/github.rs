//! GitHub implementation of [`RemoteHost`]

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{browse_url, EnsureOutcome, RemoteHost};
use crate::core::config::{API_TIMEOUT_SECS, RATE_LIMIT_PAUSE_MS, USER_AGENT};
use crate::core::PublishSettings;
use crate::git::run_program;

const CLI_PROGRAM: &str = "gh";

pub struct GitHubRemote {
    client: Client,
    host: String,
    account: String,
    api_base: String,
    token: Option<String>,
    cli_timeout: Duration,
    create_pause: Duration,
    cancel: CancellationToken,
}

impl GitHubRemote {
    pub fn new(
        settings: &PublishSettings,
        token: Option<String>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(API_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            client,
            host: settings.host.clone(),
            account: settings.account.clone(),
            api_base: settings.api_base.clone(),
            token,
            cli_timeout: settings.command_timeout,
            create_pause: Duration::from_millis(RATE_LIMIT_PAUSE_MS),
            cancel,
        })
    }

    /// Overrides the pause taken after every creation attempt
    pub fn with_create_pause(mut self, pause: Duration) -> Self {
        self.create_pause = pause;
        self
    }

    /// Sends `request` unless the run is cancelled first; `None` on cancellation
    async fn send(&self, request: RequestBuilder) -> Option<reqwest::Result<Response>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            response = request.send() => Some(response),
        }
    }

    async fn ensure_with_api(&self, name: &str, token: &str) -> EnsureOutcome {
        let lookup_url = format!("{}/repos/{}/{}", self.api_base, self.account, name);
        let lookup = self
            .client
            .get(&lookup_url)
            .header(AUTHORIZATION, format!("token {token}"));
        let response = match self.send(lookup).await {
            None => return EnsureOutcome::Cancelled,
            Some(Ok(response)) => response,
            Some(Err(e)) => {
                warn!(repo = name, error = %e, "repository lookup failed");
                return EnsureOutcome::LookupFailed;
            }
        };

        if response.status() != StatusCode::NOT_FOUND {
            debug!(repo = name, status = %response.status(), "repository present");
            return EnsureOutcome::Exists;
        }

        let create = self
            .client
            .post(format!("{}/user/repos", self.api_base))
            .header(AUTHORIZATION, format!("token {token}"))
            .json(&json!({ "name": name, "private": false }));
        let outcome = match self.send(create).await {
            None => return EnsureOutcome::Cancelled,
            Some(Ok(response)) if response.status().is_success() => {
                info!(repo = name, "created repository");
                EnsureOutcome::Created
            }
            Some(Ok(response)) => {
                warn!(repo = name, status = %response.status(), "repository creation rejected");
                EnsureOutcome::CreateFailed
            }
            Some(Err(e)) => {
                warn!(repo = name, error = %e, "repository creation failed");
                EnsureOutcome::CreateFailed
            }
        };

        // Keeps bursts of creations under the secondary rate limit
        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = tokio::time::sleep(self.create_pause) => {}
        }
        outcome
    }

    async fn create_with_cli(&self, name: &str) -> EnsureOutcome {
        let full_name = format!("{}/{}", self.account, name);
        match run_program(
            CLI_PROGRAM,
            &["repo", "create", &full_name, "--public"],
            None,
            self.cli_timeout,
            &self.cancel,
        )
        .await
        {
            Ok(_) => info!(repo = name, "created repository with gh"),
            // Usually "already exists"; the push reports anything real
            Err(e) => debug!(repo = name, error = %e, "gh repo create did not succeed"),
        }
        EnsureOutcome::CliAttempted
    }
}

#[async_trait]
impl RemoteHost for GitHubRemote {
    fn browse_url(&self, name: &str) -> String {
        browse_url(&self.host, &self.account, name)
    }

    async fn ensure_repo(&self, name: &str) -> EnsureOutcome {
        match &self.token {
            Some(token) => self.ensure_with_api(name, token).await,
            None => self.create_with_cli(name).await,
        }
    }
}
