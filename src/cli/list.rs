//! Project listing and navigation commands

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use super::session::Session;
use crate::discovery::{self, SortKey};
use crate::domain::{Depth, Project};

/// Environment variable naming a file to receive the selected path
pub const CD_FILE_ENV: &str = "PROJ_CD_FILE";

pub fn list(
    session: &Session,
    output: &Output,
    sort: Option<SortKey>,
    query: Option<&str>,
    root: Option<&Path>,
) -> Result<()> {
    let registry = if session.config.plugins.enabled.is_empty() {
        None
    } else {
        Some(session.plugins()?)
    };

    let projects = session.scan(root, registry.as_ref())?;
    let key = sort.unwrap_or(session.config.display.sort_by);
    output.verbose_ctx("list", &format!("Found {} entries, sorting by {}", projects.len(), key));

    let projects = discovery::sort(projects, key);
    let projects = discovery::filter(projects, query.unwrap_or(""));

    if output.is_json() {
        output.data(&projects);
    } else if projects.is_empty() {
        println!("No projects found");
    } else {
        let display = &session.config.display;
        for project in &projects {
            println!("{}", format_row(project, display.show_language, display.show_git_status));
        }
    }

    Ok(())
}

fn format_row(project: &Project, show_language: bool, show_git: bool) -> String {
    let indent = match project.depth {
        Depth::Top => "",
        Depth::Child => "  └─ ",
    };

    if project.is_group {
        return format!("{}{}/ ({} projects)", indent, project.name, project.sub_project_count);
    }

    let mut row = format!("{}{:<32}", indent, project.name);
    if show_language {
        row.push_str(&format!(" {:<12}", project.language));
    }
    if show_git && project.vcs.is_repo {
        let dirty = if project.vcs.dirty { "*" } else { "" };
        row.push_str(&format!(" {}{}", project.branch(), dirty));
    }
    if project.container.has_dockerfile || project.container.has_compose {
        row.push_str(" [docker]");
    }
    if project.is_monorepo() {
        row.push_str(&format!(" (+{} projects)", project.sub_project_count));
    }
    row.trim_end().to_string()
}

/// Resolves a project by name and hands its path to the shell
pub fn jump(session: &Session, output: &Output, name: &str) -> Result<()> {
    let project = session.find_project(name, None)?;
    output.verbose_ctx("jump", &format!("Matched {}", project.path.display()));

    match std::env::var_os(CD_FILE_ENV) {
        Some(cd_file) => std::fs::write(&cd_file, project.path.display().to_string())
            .with_context(|| format!("Failed to write cd file: {}", Path::new(&cd_file).display()))?,
        None if output.is_json() => output.data(&serde_json::json!({
            "name": project.name,
            "path": project.path.display().to_string(),
        })),
        None => println!("{}", project.path.display()),
    }

    Ok(())
}
