//! gitfleet: publish many local directories as GitHub repositories in parallel

use clap::{CommandFactory, Parser};
use gitfleet::commands::handle_publish_command;
use gitfleet::commands::publish::PublishRun;
use gitfleet::core::config::ProcessEnv;
use gitfleet::core::{CliOverrides, DirectorySource, FileConfig, LogWriter, PublishSettings};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Parser, Debug)]
#[command(name = "gitfleet", version, about = "Publish many local directories as GitHub repositories in parallel")]
struct Cli {
    /// File with directory paths, one per line
    #[arg(short = 'f', long = "file", value_name = "FILE", conflicts_with_all = ["dir", "path"])]
    file: Option<PathBuf>,

    /// Root directory to scan recursively
    #[arg(short = 'd', long = "dir", value_name = "DIR", conflicts_with = "path")]
    dir: Option<PathBuf>,

    /// Root directory to scan (same as --dir)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Number of parallel workers [default: 20]
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Maximum scan depth below the root [default: 20]
    #[arg(long = "depth", value_name = "N")]
    depth: Option<usize>,

    /// Print every result and enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Report what would be pushed without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Hosting account that owns the repositories
    #[arg(long, value_name = "NAME")]
    account: Option<String>,

    /// Hosting host [default: github.com]
    #[arg(long)]
    host: Option<String>,

    /// Per-command timeout in seconds [default: 600]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Track oversized files with Git LFS instead of ignoring them
    #[arg(long)]
    lfs: bool,

    /// Leave directories that are already published and clean untouched
    #[arg(long)]
    skip_synced: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

enum Input {
    File(PathBuf),
    Tree(PathBuf),
}

impl Cli {
    fn input(&self) -> Option<Input> {
        if let Some(file) = &self.file {
            return Some(Input::File(file.clone()));
        }
        self.dir
            .as_ref()
            .or(self.path.as_ref())
            .map(|root| Input::Tree(root.clone()))
    }

    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            account: self.account.clone(),
            host: self.host.clone(),
            workers: self.workers,
            max_depth: self.depth,
            timeout_secs: self.timeout,
            dry_run: self.dry_run,
            verbose: self.verbose,
            lfs: self.lfs,
            skip_synced: self.skip_synced,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let Some(input) = cli.input() else {
        eprintln!("❌ No input provided: pass --file, --dir or a PATH\n");
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    };

    let settings = match FileConfig::load(cli.config.as_deref())
        .and_then(|file| PublishSettings::resolve(file, &ProcessEnv, cli.overrides()))
    {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };

    let source = match input {
        Input::File(path) => DirectorySource::File(path),
        Input::Tree(root) => DirectorySource::Tree {
            root,
            max_depth: settings.max_depth,
        },
    };

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    match handle_publish_command(settings, source, cancel).await {
        Ok(PublishRun::Completed { .. }) => ExitCode::SUCCESS,
        Ok(PublishRun::NoDirectories) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// First Ctrl-C cancels the run, the second exits immediately
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("interrupt received, cancelling remaining work");
        eprintln!("\n⚠️  Interrupted: finishing up, press Ctrl-C again to abort");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}

fn setup_logging(verbose: bool) {
    let default_filter = if verbose { "gitfleet=debug" } else { "gitfleet=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(|| LogWriter)
        .with_target(false)
        .init();
}
