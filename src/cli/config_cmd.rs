//! Configuration commands

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use super::session::Session;
use crate::storage::Config;

/// Writes a default config to `path`
pub fn init(output: &Output, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to(path)?;
    output.success(&format!("Wrote config to {}", path.display()));

    if !output.is_json() {
        println!();
        println!("Next steps:");
        println!("  proj set-path <dir>   point proj at your projects directory");
        println!("  proj list             show what was found");
    }
    Ok(())
}

/// Points the scanner at a new projects directory
pub fn set_path(output: &Output, session: Session, path: &Path) -> Result<()> {
    let path = crate::storage::expand_path(path);
    let path = path
        .canonicalize()
        .with_context(|| format!("Directory not found: {}", path.display()))?;
    if !path.is_dir() {
        anyhow::bail!("Not a directory: {}", path.display());
    }

    let Session {
        mut config,
        config_path,
    } = session;
    config.repos_path = path.display().to_string();
    config.save_to(&config_path)?;

    output.success(&format!("Projects directory set to {}", path.display()));
    Ok(())
}

/// Prints the effective configuration
pub fn show(output: &Output, session: &Session) -> Result<()> {
    if output.is_json() {
        output.data(&session.config);
        return Ok(());
    }

    let content = toml::to_string_pretty(&session.config).context("Failed to serialize config")?;
    println!("# {}", session.config_path.display());
    print!("{}", content);
    Ok(())
}
