//! Hosted repository management
//!
//! A [`RemoteHost`] knows the URLs of hosted repositories and can make sure
//! one exists before the first push. Ensuring never fails the caller: every
//! problem is reported as an [`EnsureOutcome`] and the push decides.

use async_trait::async_trait;
use std::fmt;

pub mod github;
pub mod token;

pub use github::GitHubRemote;
pub use token::resolve_token;

/// What happened when making sure a hosted repository exists
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// Lookup found the repository
    Exists,
    /// Repository was missing and got created
    Created,
    /// Repository was missing and creation was rejected
    CreateFailed,
    /// Lookup did not complete
    LookupFailed,
    /// No token; creation was attempted through the hosting CLI
    CliAttempted,
    /// The run was cancelled before the service answered
    Cancelled,
}

impl fmt::Display for EnsureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EnsureOutcome::Exists => "exists",
            EnsureOutcome::Created => "created",
            EnsureOutcome::CreateFailed => "create-failed",
            EnsureOutcome::LookupFailed => "lookup-failed",
            EnsureOutcome::CliAttempted => "cli-attempted",
            EnsureOutcome::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

#[async_trait]
pub trait RemoteHost: Send + Sync {
    /// Web URL of the repository
    fn browse_url(&self, name: &str) -> String;

    /// URL used as the `origin` remote
    fn clone_url(&self, name: &str) -> String {
        format!("{}.git", self.browse_url(name))
    }

    async fn ensure_repo(&self, name: &str) -> EnsureOutcome;
}

/// `https://<host>/<account>/<name>`
pub fn browse_url(host: &str, account: &str, name: &str) -> String {
    format!("https://{host}/{account}/{name}")
}
