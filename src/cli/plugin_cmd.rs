//! Plugin commands: listing plugins, their actions, and running actions

use anyhow::{Context, Result};
use clap::Subcommand;

use super::list::CD_FILE_ENV;
use super::output::Output;
use super::session::Session;
use crate::domain::PluginProject;
use crate::plugin::RegistryError;

#[derive(Subcommand)]
pub enum PluginCommands {
    /// List loaded plugins
    List,
}

pub fn run(cmd: PluginCommands, session: &Session, output: &Output) -> Result<()> {
    match cmd {
        PluginCommands::List => list_plugins(session, output),
    }
}

fn list_plugins(session: &Session, output: &Output) -> Result<()> {
    let mut registry = session.plugins()?;
    let plugins = registry.plugins();

    if output.is_json() {
        let items: Vec<_> = plugins
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name(),
                    "version": p.manifest.version,
                    "description": p.manifest.description,
                    "capabilities": p.manifest.capabilities,
                    "path": p.dir.display().to_string(),
                })
            })
            .collect();
        output.data(&items);
    } else if plugins.is_empty() {
        println!("No plugins loaded.");
        println!();
        println!("Plugins are loaded from {}", registry.plugins_dir().display());
        println!("when their directory name is listed in plugins.enabled.");
    } else {
        println!("{:<20} {:<10} {:<20} DESCRIPTION", "NAME", "VERSION", "CAPABILITIES");
        println!("{}", "-".repeat(70));
        for plugin in plugins {
            let caps: Vec<_> = plugin.manifest.capabilities.iter().map(|c| c.as_str()).collect();
            println!(
                "{:<20} {:<10} {:<20} {}",
                plugin.name(),
                plugin.manifest.version,
                caps.join(","),
                plugin.manifest.description
            );
        }
    }

    registry.shutdown();
    Ok(())
}

/// Lists plugin actions available for a project
pub fn actions(session: &Session, output: &Output, project_name: &str) -> Result<()> {
    let mut registry = session.plugins()?;
    let project = session.find_project(project_name, Some(&registry))?;

    let mut actions = registry.actions(&PluginProject::from(&project));
    actions.sort_by_key(|a| a.priority);
    output.verbose_ctx("actions", &format!("{} actions for {}", actions.len(), project.name));

    if output.is_json() {
        output.data(&actions);
    } else if actions.is_empty() {
        println!("No plugin actions for {}", project.name);
    } else {
        println!("{:<24} {:<24} DESCRIPTION", "ID", "LABEL");
        println!("{}", "-".repeat(70));
        for action in &actions {
            let label = format!("{} {}", action.icon, action.label);
            println!("{:<24} {:<24} {}", action.id, label.trim(), action.description);
        }
    }

    registry.shutdown();
    Ok(())
}

/// Runs an action through the plugins
pub fn run_action(session: &Session, output: &Output, action_id: &str, project_name: &str) -> Result<()> {
    let mut registry = session.plugins()?;
    let project = session.find_project(project_name, Some(&registry))?;

    let outcome = registry.execute_action(action_id, &PluginProject::from(&project));
    registry.shutdown();

    let result = match outcome {
        Ok(result) => result,
        Err(RegistryError::Unhandled(id)) => {
            anyhow::bail!("No plugin handled action '{}' (built-in actions are not available here)", id)
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(cd_path) = &result.cd_path {
        if let Some(cd_file) = std::env::var_os(CD_FILE_ENV) {
            std::fs::write(&cd_file, cd_path).context("Failed to write cd file")?;
        }
    }

    if output.is_json() {
        output.data(&result);
    } else {
        if !result.message.is_empty() {
            println!("{}", result.message);
        }
        if let Some(cmd) = &result.exec_cmd {
            println!("exec: {}", cmd.join(" "));
        }
        if let Some(cd_path) = &result.cd_path {
            println!("cd: {}", cd_path);
        }
    }

    if !result.success {
        anyhow::bail!("Action '{}' failed", action_id);
    }
    Ok(())
}
