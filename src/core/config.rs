//! Configuration constants and layered run settings
//!
//! Settings are resolved from, lowest precedence first: built-in defaults,
//! the TOML config file, environment variables, and finally CLI flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// Concurrency
pub const DEFAULT_WORKERS: usize = 20;

// Discovery
pub const DEFAULT_MAX_DEPTH: usize = 20;
pub const VCS_DIR_NAME: &str = ".git";
pub const COMMENT_PREFIX: &str = "#";
pub const ONELINER_PREFIX: &str = "gitit ";
pub const ONELINER_SEPARATOR: &str = ";";

// Naming
pub const FALLBACK_REPO_NAME: &str = "repo";
pub const MAX_REPO_NAME_LENGTH: usize = 100;

// Oversize handling
pub const OVERSIZE_THRESHOLD: u64 = 100 * 1024 * 1024;
pub const IGNORE_FILE_NAME: &str = ".gitignore";
pub const IGNORE_MARKER: &str = "# gitfleet: auto-excluded large files (>100MB)";

// Git
pub const DEFAULT_BRANCH: &str = "main";
pub const REMOTE_NAME: &str = "origin";
pub const HTTP_POST_BUFFER: &str = "524288000";
pub const GIT_OPERATION_TIMEOUT_SECS: u64 = 600;

// Remote host
pub const DEFAULT_HOST: &str = "github.com";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const API_TIMEOUT_SECS: u64 = 10;
pub const RATE_LIMIT_PAUSE_MS: u64 = 500;
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";
pub const ACCOUNT_ENV_VAR: &str = "GITFLEET_ACCOUNT";
pub const API_BASE_ENV_VAR: &str = "GITFLEET_API_BASE";
pub const USER_AGENT: &str = concat!("gitfleet/", env!("CARGO_PKG_VERSION"));

// Progress
pub const PROGRESS_TICK_MS: u64 = 500;
pub const PROGRESS_CHARS: &str = "█░";
pub const PROGRESS_TEMPLATE: &str = "[{bar:40}] {percent}% | {pos}/{len} | {msg}";

// Summary
pub const SEQUENTIAL_SECS_PER_DIR: f64 = 15.0;
pub const SPEEDUP_REPORT_MIN_DIRS: u64 = 100;
pub const FAILED_DISPLAY_LIMIT: usize = 20;
pub const PATH_DISPLAY_WIDTH: usize = 40;
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 120;
pub const ERROR_MESSAGE_TRUNCATE_LENGTH: usize = 117;

// Config file
pub const CONFIG_DIR_NAME: &str = "gitfleet";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("no hosting account configured; pass --account, set GITFLEET_ACCOUNT, or add `account` to the config file")]
    MissingAccount,
}

/// Commit identity written into every published repository
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Contents of `config.toml`; every key is optional
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub account: Option<String>,
    pub host: Option<String>,
    pub api_base: Option<String>,
    pub workers: Option<usize>,
    pub max_depth: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub lfs: Option<bool>,
    pub identity: Option<FileIdentity>,
}

impl FileConfig {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config file.
    ///
    /// An explicit path must exist. The default location
    /// (`<config dir>/gitfleet/config.toml`) is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match default_config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if required {
                    Err(ConfigError::NotFound(path))
                } else {
                    Ok(Self::default())
                }
            }
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Values that come from the command line; `None` means "not given"
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub account: Option<String>,
    pub host: Option<String>,
    pub workers: Option<usize>,
    pub max_depth: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub dry_run: bool,
    pub verbose: bool,
    pub lfs: bool,
    pub skip_synced: bool,
}

/// Environment lookups, injectable for tests
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Fully resolved settings for one run
#[derive(Clone, Debug)]
pub struct PublishSettings {
    pub account: String,
    pub host: String,
    pub api_base: String,
    pub identity: Identity,
    pub workers: usize,
    pub max_depth: usize,
    pub command_timeout: Duration,
    pub dry_run: bool,
    pub verbose: bool,
    pub lfs: bool,
    pub skip_synced: bool,
}

impl PublishSettings {
    /// Merges defaults, file config, environment and CLI overrides
    pub fn resolve(
        file: FileConfig,
        env: &dyn EnvSource,
        cli: CliOverrides,
    ) -> Result<Self, ConfigError> {
        let account = cli
            .account
            .or_else(|| env.var(ACCOUNT_ENV_VAR))
            .or(file.account)
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(ConfigError::MissingAccount)?;

        let host = cli
            .host
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let api_base = env
            .var(API_BASE_ENV_VAR)
            .or(file.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let file_identity = file.identity.unwrap_or_default();
        let identity = Identity {
            name: file_identity.name.unwrap_or_else(|| account.clone()),
            email: file_identity
                .email
                .unwrap_or_else(|| format!("{account}@users.noreply.{host}")),
        };

        let workers = cli
            .workers
            .or(file.workers)
            .unwrap_or(DEFAULT_WORKERS)
            .max(1);

        Ok(Self {
            account,
            host,
            api_base,
            identity,
            workers,
            max_depth: cli.max_depth.or(file.max_depth).unwrap_or(DEFAULT_MAX_DEPTH),
            command_timeout: Duration::from_secs(
                cli.timeout_secs
                    .or(file.timeout_secs)
                    .unwrap_or(GIT_OPERATION_TIMEOUT_SECS)
                    .max(1),
            ),
            dry_run: cli.dry_run,
            verbose: cli.verbose,
            lfs: cli.lfs || file.lfs.unwrap_or(false),
            skip_synced: cli.skip_synced,
        })
    }

    /// Settings for tests and embedding, with every optional value at its default
    pub fn for_account(account: &str) -> Self {
        Self {
            account: account.to_string(),
            host: DEFAULT_HOST.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            identity: Identity {
                name: account.to_string(),
                email: format!("{account}@users.noreply.{DEFAULT_HOST}"),
            },
            workers: DEFAULT_WORKERS,
            max_depth: DEFAULT_MAX_DEPTH,
            command_timeout: Duration::from_secs(GIT_OPERATION_TIMEOUT_SECS),
            dry_run: false,
            verbose: false,
            lfs: false,
            skip_synced: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapEnv(HashMap<&'static str, &'static str>);

    impl EnvSource for MapEnv {
        fn var(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    fn empty_env() -> MapEnv {
        MapEnv(HashMap::new())
    }

    #[test]
    fn test_missing_account_is_an_error() {
        let err = PublishSettings::resolve(FileConfig::default(), &empty_env(), CliOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingAccount));
    }

    #[test]
    fn test_defaults_are_applied() {
        let cli = CliOverrides {
            account: Some("octocat".to_string()),
            ..Default::default()
        };
        let settings = PublishSettings::resolve(FileConfig::default(), &empty_env(), cli).unwrap();

        assert_eq!(settings.workers, DEFAULT_WORKERS);
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(settings.host, "github.com");
        assert_eq!(settings.api_base, "https://api.github.com");
        assert_eq!(settings.identity.name, "octocat");
        assert_eq!(settings.identity.email, "octocat@users.noreply.github.com");
        assert_eq!(
            settings.command_timeout,
            Duration::from_secs(GIT_OPERATION_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let file = FileConfig::parse(
            r#"
account = "from-file"
workers = 7
max_depth = 3
api_base = "https://ghe.example.com/api/v3/"

[identity]
email = "bot@example.com"
"#,
            Path::new("config.toml"),
        )
        .unwrap();
        let env = MapEnv(HashMap::from([(ACCOUNT_ENV_VAR, "from-env")]));

        let settings =
            PublishSettings::resolve(file.clone(), &env, CliOverrides::default()).unwrap();
        assert_eq!(settings.account, "from-env");
        assert_eq!(settings.workers, 7);
        assert_eq!(settings.max_depth, 3);
        assert_eq!(settings.api_base, "https://ghe.example.com/api/v3");
        assert_eq!(settings.identity.name, "from-env");
        assert_eq!(settings.identity.email, "bot@example.com");

        let cli = CliOverrides {
            account: Some("from-cli".to_string()),
            workers: Some(2),
            ..Default::default()
        };
        let settings = PublishSettings::resolve(file, &env, cli).unwrap();
        assert_eq!(settings.account, "from-cli");
        assert_eq!(settings.workers, 2);
    }

    #[test]
    fn test_zero_workers_clamped_to_one() {
        let cli = CliOverrides {
            account: Some("octocat".to_string()),
            workers: Some(0),
            ..Default::default()
        };
        let settings = PublishSettings::resolve(FileConfig::default(), &empty_env(), cli).unwrap();
        assert_eq!(settings.workers, 1);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = FileConfig::parse("acount = \"typo\"", Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = FileConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "account = \"octocat\"\nlfs = true\n").unwrap();

        let file = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(file.account.as_deref(), Some("octocat"));
        assert_eq!(file.lfs, Some(true));
    }
}
