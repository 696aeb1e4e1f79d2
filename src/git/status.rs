//! Publish steps and how their failures are treated

use std::fmt;

/// Ordered steps of publishing one directory
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Directory must exist
    Exists,
    /// Drop any previous history and `git init`
    Reset,
    /// Identity and transport settings
    Configure,
    /// Exclude or LFS-track oversized files
    IgnoreUpdate,
    /// `git add -A`
    Stage,
    /// `git commit`
    Commit,
    /// Make sure the hosted repository exists
    EnsureRemote,
    /// Point `origin` at the hosted repository
    ConfigureRemote,
    /// Force push to the hosted repository
    Push,
}

/// Whether a failing step aborts the job
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tolerance {
    Fatal,
    BestEffort,
}

impl Step {
    /// All steps in execution order
    pub const ALL: [Step; 9] = [
        Step::Exists,
        Step::Reset,
        Step::Configure,
        Step::IgnoreUpdate,
        Step::Stage,
        Step::Commit,
        Step::EnsureRemote,
        Step::ConfigureRemote,
        Step::Push,
    ];

    pub fn tolerance(self) -> Tolerance {
        match self {
            Step::Exists | Step::Reset | Step::Stage | Step::Push => Tolerance::Fatal,
            Step::Configure
            | Step::IgnoreUpdate
            | Step::Commit
            | Step::EnsureRemote
            | Step::ConfigureRemote => Tolerance::BestEffort,
        }
    }

    /// Name used as the prefix of failure messages
    pub fn label(self) -> &'static str {
        match self {
            Step::Exists => "existence check",
            Step::Reset => "git init",
            Step::Configure => "git config",
            Step::IgnoreUpdate => "ignore update",
            Step::Stage => "git add",
            Step::Commit => "git commit",
            Step::EnsureRemote => "remote ensure",
            Step::ConfigureRemote => "git remote",
            Step::Push => "git push",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of running one step, after its tolerance has been applied
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Failed, but the job continues
    SoftFailed(String),
    /// Failed and the job stops with this message
    Fatal(String),
}

impl StepOutcome {
    pub fn evaluate<E: fmt::Display>(step: Step, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => StepOutcome::Done,
            Err(e) => {
                let message = format!("{} failed: {}", step.label(), e);
                match step.tolerance() {
                    Tolerance::Fatal => StepOutcome::Fatal(message),
                    Tolerance::BestEffort => StepOutcome::SoftFailed(message),
                }
            }
        }
    }
}
