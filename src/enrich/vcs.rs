//! Git status via the `git` command line

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use super::VcsProbe;
use crate::domain::VcsStatus;

/// Shells out to `git` for branch and dirty state
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl VcsProbe for GitCli {
    fn status(&self, path: &Path) -> Result<VcsStatus> {
        if !path.join(".git").exists() {
            return Ok(VcsStatus::default());
        }

        // Branch and dirty state degrade independently
        let branch = current_branch(path)
            .map_err(|e| tracing::debug!("git branch failed for {}: {:#}", path.display(), e))
            .ok();
        let dirty = is_dirty(path)
            .map_err(|e| tracing::debug!("git status failed for {}: {:#}", path.display(), e))
            .unwrap_or(false);

        Ok(VcsStatus {
            is_repo: true,
            branch,
            dirty,
        })
    }
}

fn git(path: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(path)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .context("Failed to run git")?;

    if !output.status.success() {
        anyhow::bail!("git {} exited with {}", args.join(" "), output.status);
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn current_branch(path: &Path) -> Result<String> {
    git(path, &["rev-parse", "--abbrev-ref", "HEAD"])
}

fn is_dirty(path: &Path) -> Result<bool> {
    Ok(!git(path, &["status", "--porcelain"])?.is_empty())
}
