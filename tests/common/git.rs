//! Git testing utilities

use anyhow::Result;
use std::path::Path;
use std::process::Command;

/// Checks if git is available in the environment
pub fn is_git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Creates a bare repository that can be pushed to
pub fn init_bare_repo(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    let output = Command::new("git")
        .args(["init", "--bare", "--quiet"])
        .current_dir(path)
        .output()?;

    if !output.status.success() {
        anyhow::bail!(
            "git init --bare failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// Runs git in `dir` and returns trimmed stdout
pub fn git_output(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git").args(args).current_dir(dir).output()?;
    if !output.status.success() {
        anyhow::bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Turns `dir` into a working repository with one commit of its current files
pub fn init_work_repo(dir: &Path) -> Result<()> {
    git_output(dir, &["init", "--quiet"])?;
    git_output(dir, &["add", "-A"])?;
    git_output(
        dir,
        &[
            "-c",
            "user.name=Fixture",
            "-c",
            "user.email=fixture@example.com",
            "commit",
            "--quiet",
            "-m",
            "fixture",
        ],
    )?;
    Ok(())
}
