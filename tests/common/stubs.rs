//! Recording stand-ins for the git binary and the hosting service

use async_trait::async_trait;
use gitfleet::git::{CommandError, CommandOutput, Vcs};
use gitfleet::remote::{browse_url, EnsureOutcome, RemoteHost};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

pub const TEST_ACCOUNT: &str = "tester";
pub const TEST_HOST: &str = "github.com";

#[derive(Clone)]
enum Scripted {
    Fail(String),
    TimeOut,
    Respond(String),
}

/// [`Vcs`] that records every call and succeeds unless told otherwise
///
/// Behaviour is keyed on the git subcommand (the first argument).
#[derive(Default)]
pub struct StubVcs {
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
    scripts: HashMap<String, Scripted>,
    delay: Option<Duration>,
}

impl StubVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// `git <subcommand>` exits non-zero with `message` on stderr
    pub fn failing(mut self, subcommand: &str, message: &str) -> Self {
        self.scripts
            .insert(subcommand.to_string(), Scripted::Fail(message.to_string()));
        self
    }

    /// `git <subcommand>` runs into the command timeout
    pub fn timing_out(mut self, subcommand: &str) -> Self {
        self.scripts
            .insert(subcommand.to_string(), Scripted::TimeOut);
        self
    }

    /// `git <subcommand>` succeeds and prints `stdout`
    pub fn responding(mut self, subcommand: &str, stdout: &str) -> Self {
        self.scripts
            .insert(subcommand.to_string(), Scripted::Respond(stdout.to_string()));
        self
    }

    /// Every call sleeps this long first
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Full argument lists run in `dir`, in order
    pub fn calls_in(&self, dir: &Path) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path == dir)
            .map(|(_, args)| args.clone())
            .collect()
    }

    /// Just the subcommands run in `dir`, in order
    pub fn subcommands_in(&self, dir: &Path) -> Vec<String> {
        self.calls_in(dir)
            .into_iter()
            .filter_map(|args| args.into_iter().next())
            .collect()
    }
}

#[async_trait]
impl Vcs for StubVcs {
    async fn run(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push((
            dir.to_path_buf(),
            args.iter().map(|a| a.to_string()).collect(),
        ));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let subcommand = args.first().copied().unwrap_or_default();
        match self.scripts.get(subcommand) {
            None => Ok(CommandOutput::default()),
            Some(Scripted::Respond(stdout)) => Ok(CommandOutput {
                stdout: stdout.clone(),
                stderr: String::new(),
            }),
            Some(Scripted::Fail(message)) => Err(CommandError::Failed {
                code: Some(1),
                output: message.clone(),
            }),
            Some(Scripted::TimeOut) => Err(CommandError::TimedOut { secs: 1 }),
        }
    }
}

/// [`RemoteHost`] that records ensure calls and tracks overlap per name
#[derive(Default)]
pub struct StubRemote {
    ensured: Mutex<Vec<String>>,
    in_flight: Mutex<HashMap<String, usize>>,
    max_overlap: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
}

impl StubRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every ensure call takes this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn ensured(&self) -> Vec<String> {
        self.ensured.lock().unwrap().clone()
    }

    /// Highest number of concurrent ensure calls seen for `name`
    pub fn max_overlap(&self, name: &str) -> usize {
        self.max_overlap
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl RemoteHost for StubRemote {
    fn browse_url(&self, name: &str) -> String {
        browse_url(TEST_HOST, TEST_ACCOUNT, name)
    }

    async fn ensure_repo(&self, name: &str) -> EnsureOutcome {
        self.ensured.lock().unwrap().push(name.to_string());
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            let current = in_flight.entry(name.to_string()).or_default();
            *current += 1;
            let mut max = self.max_overlap.lock().unwrap();
            let seen = max.entry(name.to_string()).or_default();
            *seen = (*seen).max(*current);
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(current) = self.in_flight.lock().unwrap().get_mut(name) {
            *current -= 1;
        }
        EnsureOutcome::Exists
    }
}
