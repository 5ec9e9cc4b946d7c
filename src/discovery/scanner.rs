//! Directory scanner
//!
//! Walks the root and exactly one level below it. Top-level directories are
//! emitted as projects or groups, followed by their child projects.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::classify::is_project_root;
use crate::domain::{Depth, Project, UNKNOWN_LANGUAGE};
use crate::enrich::Enrichment;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to read projects directory {path}: {source}")]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Which directories the scanner skips
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Directory names to skip (exact match)
    pub exclude: Vec<String>,

    /// Include directories whose name starts with `.`
    pub show_hidden: bool,
}

impl ScanOptions {
    pub fn new(exclude: Vec<String>, show_hidden: bool) -> Self {
        Self {
            exclude,
            show_hidden,
        }
    }

    fn is_visible(&self, name: &str) -> bool {
        if !self.show_hidden && name.starts_with('.') {
            return false;
        }
        !self.exclude.iter().any(|pattern| pattern == name)
    }
}

/// Discovers projects under a root directory
pub struct Scanner {
    options: ScanOptions,
    enrichment: Enrichment,
}

impl Scanner {
    /// Creates a scanner using the default probes
    pub fn new(options: ScanOptions) -> Self {
        Self::with_enrichment(options, Enrichment::default())
    }

    pub fn with_enrichment(options: ScanOptions, enrichment: Enrichment) -> Self {
        Self {
            options,
            enrichment,
        }
    }

    /// Scans `root` for projects and groups.
    ///
    /// Only a failure to list `root` itself is an error; anything below it
    /// degrades to missing entries or default metadata. A relative `root` is
    /// resolved against the working directory so every path is absolute.
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<Vec<Project>, ScanError> {
        let root = crate::storage::expand_path(root.as_ref());
        let root = std::path::absolute(&root).unwrap_or(root);
        let top_level = fs::read_dir(&root).map_err(|source| ScanError::ReadRoot {
            path: root.clone(),
            source,
        })?;

        let mut projects = Vec::new();
        for (name, dir) in self.visible_dirs(top_level) {
            let is_project = is_project_root(&dir);
            let children = self.child_projects(&dir);

            let mut parent = if is_project {
                match self.describe(&name, &dir, Depth::Top) {
                    Some(p) => p,
                    None => continue,
                }
            } else if !children.is_empty() {
                Project::group(&name, &dir, children.len(), modified_time(&dir).unwrap_or_default())
            } else {
                tracing::trace!("Skipping {}: not a project and holds none", dir.display());
                continue;
            };

            parent.sub_project_count = children.len();
            projects.push(parent);
            projects.extend(children);
        }

        tracing::debug!("Scanned {}: {} entries", root.display(), projects.len());
        Ok(projects)
    }

    /// Finds project roots directly inside `dir`, nested under it
    fn child_projects(&self, dir: &Path) -> Vec<Project> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot read {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        self.visible_dirs(entries)
            .into_iter()
            .filter(|(_, path)| is_project_root(path))
            .filter_map(|(name, path)| {
                let mut child = self.describe(&name, &path, Depth::Child)?;
                child.nest_under(dir);
                Some(child)
            })
            .collect()
    }

    /// Visible subdirectories in name order
    fn visible_dirs(&self, entries: fs::ReadDir) -> Vec<(String, PathBuf)> {
        let mut dirs: Vec<_> = entries
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                self.options
                    .is_visible(&name)
                    .then(|| (name, entry.path()))
            })
            .collect();

        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        dirs
    }

    /// Builds an enriched project entity, or `None` if the directory vanished
    fn describe(&self, name: &str, path: &Path, depth: Depth) -> Option<Project> {
        let last_modified = match modified_time(path) {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", path.display(), e);
                return None;
            }
        };

        let mut project = Project::new(name, path, depth);
        project.last_modified = last_modified;

        project.language = self.enrichment.language.detect(path).unwrap_or_else(|e| {
            tracing::warn!("Language detection failed for {}: {:#}", path.display(), e);
            UNKNOWN_LANGUAGE.to_string()
        });

        project.vcs = self.enrichment.vcs.status(path).unwrap_or_else(|e| {
            tracing::warn!("VCS status failed for {}: {:#}", path.display(), e);
            Default::default()
        });

        project.container = self.enrichment.container.detect(path).unwrap_or_else(|e| {
            tracing::warn!("Container detection failed for {}: {:#}", path.display(), e);
            Default::default()
        });

        Some(project)
    }
}

fn modified_time(path: &Path) -> std::io::Result<DateTime<Utc>> {
    Ok(fs::metadata(path)?.modified()?.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContainerInfo, VcsStatus};
    use crate::enrich::{ContainerProbe, DockerFiles, GitCli, LanguageDetector, MarkerLanguages, VcsProbe};
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn mkdir(root: &Path, rel: &str) {
        fs::create_dir_all(root.join(rel)).unwrap();
    }

    fn scanner() -> Scanner {
        Scanner::new(ScanOptions::default())
    }

    fn find<'a>(projects: &'a [Project], name: &str) -> &'a Project {
        projects
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("{} not in scan result", name))
    }

    /// root/{webdev/{frontend, backend, notes}, standalone}
    fn webdev_fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "webdev/frontend/package.json");
        touch(dir.path(), "webdev/backend/go.mod");
        touch(dir.path(), "webdev/notes/todo.txt");
        touch(dir.path(), "standalone/go.mod");
        dir
    }

    #[test]
    fn groups_and_standalone_projects() {
        let dir = webdev_fixture();
        let projects = scanner().scan(dir.path()).unwrap();

        assert_eq!(projects.len(), 4);

        let webdev = find(&projects, "webdev");
        assert!(webdev.is_group);
        assert_eq!(webdev.depth, Depth::Top);
        assert_eq!(webdev.sub_project_count, 2);

        for name in ["frontend", "backend"] {
            let child = find(&projects, name);
            assert_eq!(child.depth, Depth::Child);
            assert_eq!(child.parent_path.as_deref(), Some(webdev.path.as_path()));
            assert!(!child.is_group);
        }

        assert!(projects.iter().all(|p| p.name != "notes"));

        let standalone = find(&projects, "standalone");
        assert_eq!(standalone.depth, Depth::Top);
        assert!(!standalone.is_group);
        assert_eq!(standalone.sub_project_count, 0);
        assert_eq!(standalone.language, "Go");
    }

    #[test]
    fn children_follow_their_parent() {
        let dir = webdev_fixture();
        let projects = scanner().scan(dir.path()).unwrap();

        let parents: HashSet<_> = projects
            .iter()
            .filter(|p| p.depth == Depth::Top)
            .map(|p| p.path.clone())
            .collect();

        let mut current_parent: Option<PathBuf> = None;
        for p in &projects {
            match p.depth {
                Depth::Top => current_parent = Some(p.path.clone()),
                Depth::Child => {
                    let parent = p.parent_path.clone().unwrap();
                    assert!(parents.contains(&parent));
                    assert_eq!(current_parent.as_ref(), Some(&parent));
                }
            }
        }
    }

    #[test]
    fn monorepo_is_project_with_children() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "mono/package.json");
        touch(dir.path(), "mono/packages/Cargo.toml");
        touch(dir.path(), "mono/apps/web/package.json");

        let projects = scanner().scan(dir.path()).unwrap();

        let mono = find(&projects, "mono");
        assert!(!mono.is_group);
        assert!(mono.is_monorepo());
        assert_eq!(mono.sub_project_count, 1);

        // apps/ holds a project two levels down, which is never inspected
        assert!(projects.iter().all(|p| p.name != "web" && p.name != "apps"));
    }

    #[test]
    fn hidden_and_excluded_directories_are_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".secret/go.mod");
        touch(dir.path(), "node_modules/package.json");
        touch(dir.path(), "node_modules_extra/package.json");
        touch(dir.path(), "group/.hidden-child/go.mod");
        touch(dir.path(), "group/vendor/go.mod");
        touch(dir.path(), "group/app/go.mod");

        let options = ScanOptions::new(vec!["node_modules".into(), "vendor".into()], false);
        let projects = Scanner::new(options).scan(dir.path()).unwrap();
        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["group", "app", "node_modules_extra"]);
    }

    #[test]
    fn show_hidden_includes_dot_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".dotfiles/Makefile");

        let projects = Scanner::new(ScanOptions::new(vec![], true))
            .scan(dir.path())
            .unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, ".dotfiles");
    }

    #[test]
    fn files_at_top_level_are_ignored() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "README.md");

        assert!(scanner().scan(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = scanner().scan(dir.path().join("missing")).unwrap_err();

        assert!(matches!(err, ScanError::ReadRoot { .. }));
    }

    struct FailingProbe;

    impl VcsProbe for FailingProbe {
        fn status(&self, _: &Path) -> anyhow::Result<VcsStatus> {
            anyhow::bail!("vcs unavailable")
        }
    }

    impl LanguageDetector for FailingProbe {
        fn detect(&self, _: &Path) -> anyhow::Result<String> {
            anyhow::bail!("language unavailable")
        }
    }

    impl ContainerProbe for FailingProbe {
        fn detect(&self, _: &Path) -> anyhow::Result<ContainerInfo> {
            anyhow::bail!("container unavailable")
        }
    }

    #[test]
    fn probe_failures_degrade_fields() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "api/Dockerfile");
        touch(dir.path(), "api/go.mod");
        mkdir(dir.path(), "api/.git");

        let enrichment = Enrichment::new(FailingProbe, FailingProbe, FailingProbe);
        let projects = Scanner::with_enrichment(ScanOptions::default(), enrichment)
            .scan(dir.path())
            .unwrap();

        assert_eq!(projects.len(), 1);
        let api = &projects[0];
        assert_eq!(api.language, UNKNOWN_LANGUAGE);
        assert!(!api.vcs.is_repo);
        assert!(!api.container.has_dockerfile);
    }

    #[test]
    fn one_failing_probe_leaves_others_intact() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "api/Dockerfile");
        touch(dir.path(), "api/go.mod");

        let enrichment = Enrichment::new(GitCli, FailingProbe, DockerFiles);
        let projects = Scanner::with_enrichment(ScanOptions::default(), enrichment)
            .scan(dir.path())
            .unwrap();

        assert_eq!(projects[0].language, UNKNOWN_LANGUAGE);
        assert!(projects[0].container.has_dockerfile);

        let enrichment = Enrichment::new(GitCli, MarkerLanguages::new(), FailingProbe);
        let projects = Scanner::with_enrichment(ScanOptions::default(), enrichment)
            .scan(dir.path())
            .unwrap();

        assert_eq!(projects[0].language, "Go");
        assert!(!projects[0].container.has_dockerfile);
    }
}
