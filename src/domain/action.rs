//! Plugin-facing views of projects and the actions plugins contribute

use serde::{Deserialize, Serialize};

use super::project::Project;

/// The subset of a project sent to plugins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginProject {
    pub name: String,
    pub path: String,
    pub language: String,
    #[serde(default)]
    pub git_branch: String,
    #[serde(default)]
    pub git_dirty: bool,
    #[serde(default)]
    pub is_git_repo: bool,
}

impl From<&Project> for PluginProject {
    fn from(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            path: project.path.display().to_string(),
            language: project.language.clone(),
            git_branch: project.branch().to_string(),
            git_dirty: project.vcs.dirty,
            is_git_repo: project.vcs.is_repo,
        }
    }
}

/// An action a plugin offers for a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub priority: i32,
}

/// Outcome of executing an action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub success: bool,

    #[serde(default)]
    pub message: String,

    /// Directory the host shell should change into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cd_path: Option<String>,

    /// Command the host should exec after exiting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_cmd: Option<Vec<String>>,
}

/// A language detection rule contributed by a plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRule {
    pub language: String,

    #[serde(default)]
    pub priority: i32,

    /// Marker file names, any of which identifies the language
    #[serde(default)]
    pub files: Vec<String>,

    /// Regular expression matched against file names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}
