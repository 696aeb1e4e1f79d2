//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod git;
pub mod stubs;

pub use self::fixtures::DirTreeBuilder;
pub use self::git::{git_output, init_bare_repo, init_work_repo, is_git_available};
pub use self::stubs::{StubRemote, StubVcs, TEST_ACCOUNT};

use gitfleet::core::PublishSettings;

/// Settings for the test account with a small worker pool
pub fn test_settings(workers: usize) -> PublishSettings {
    let mut settings = PublishSettings::for_account(TEST_ACCOUNT);
    settings.workers = workers;
    settings
}
