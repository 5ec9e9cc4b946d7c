//! Plugin discovery and loading
//!
//! Plugins live in subdirectories of the plugins directory, each with a
//! `plugin.json` manifest. Only directories named in the enabled list are
//! loaded. A plugin that fails to load is skipped; it never takes down the
//! host or its siblings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use super::manifest::{Capability, PluginManifest};
use super::protocol::method;
use super::transport::{Transport, TransportError};
use crate::domain::{Action, ActionResult, LanguageRule, PluginProject};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to prepare plugins directory {path}: {source}")]
    PluginsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No plugin handled action: {0}")]
    Unhandled(String),
}

/// A plugin whose process is running and initialized
pub struct LoadedPlugin {
    pub manifest: PluginManifest,

    /// Directory the plugin was loaded from
    pub dir: PathBuf,

    /// Manifest defaults merged with host settings
    pub config: Map<String, Value>,

    transport: Transport,
}

impl LoadedPlugin {
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.manifest.has(capability)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    fn actions(&self, project: &PluginProject) -> Result<Vec<Action>, TransportError> {
        let params = serde_json::to_value(project).map_err(TransportError::Encode)?;
        let actions: Option<Vec<Action>> = self.transport.call_as(method::ACTIONS, Some(params))?;
        Ok(actions.unwrap_or_default())
    }

    fn execute(&self, action_id: &str, project: &PluginProject) -> Result<Option<ActionResult>, TransportError> {
        let params = serde_json::json!({
            "action": action_id,
            "project": project,
        });
        self.transport.call_as(method::EXECUTE_ACTION, Some(params))
    }

    fn languages(&self) -> Result<Vec<LanguageRule>, TransportError> {
        let rules: Option<Vec<LanguageRule>> = self.transport.call_as(method::LANGUAGES, None)?;
        Ok(rules.unwrap_or_default())
    }
}

/// Loads enabled plugins and routes requests to them
pub struct PluginRegistry {
    /// Directory containing one subdirectory per plugin
    plugins_dir: PathBuf,

    /// Plugin directory names allowed to load
    enabled: Vec<String>,

    /// Host configuration per plugin directory name
    host_config: HashMap<String, Map<String, Value>>,

    /// Loaded plugins, in load order
    plugins: Vec<LoadedPlugin>,
}

impl PluginRegistry {
    /// Creates a new registry; nothing is spawned until [`load_all`](Self::load_all)
    pub fn new(
        plugins_dir: impl Into<PathBuf>,
        enabled: Vec<String>,
        host_config: HashMap<String, Map<String, Value>>,
    ) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
            enabled,
            host_config,
            plugins: Vec::new(),
        }
    }

    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|e| e == name)
    }

    /// Loads every enabled plugin, skipping the ones that fail.
    ///
    /// Only an unusable plugins directory is an error.
    pub fn load_all(&mut self) -> Result<(), RegistryError> {
        let dir_err = |source| RegistryError::PluginsDir {
            path: self.plugins_dir.clone(),
            source,
        };

        std::fs::create_dir_all(&self.plugins_dir).map_err(dir_err)?;
        let entries = std::fs::read_dir(&self.plugins_dir).map_err(dir_err)?;

        let mut dirs: Vec<(String, PathBuf)> = entries
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
            .filter(|(name, _)| self.is_enabled(name))
            .collect();
        dirs.sort();

        for (dir_name, dir) in dirs {
            match self.load_one(&dir_name, &dir) {
                Ok(plugin) => {
                    if self.get(plugin.name()).is_some() {
                        tracing::warn!(
                            "Skipping plugin in {}: name {} already loaded",
                            dir.display(),
                            plugin.name()
                        );
                        Self::close(plugin);
                        continue;
                    }
                    tracing::debug!("Loaded plugin {} {}", plugin.name(), plugin.manifest.version);
                    self.plugins.push(plugin);
                }
                Err(e) => tracing::warn!("Failed to load plugin {}: {:#}", dir_name, e),
            }
        }

        Ok(())
    }

    fn load_one(&self, dir_name: &str, dir: &Path) -> anyhow::Result<LoadedPlugin> {
        let manifest = PluginManifest::load(dir)?;
        let config = manifest.merged_config(self.host_config.get(dir_name));

        let mut transport = Transport::spawn(&manifest.name, &manifest.executable_path(dir))?;
        if let Err(e) = transport.init(Value::Object(config.clone())) {
            // A rejected plugin is not waited on
            transport.kill();
            return Err(anyhow::Error::new(e).context("init failed"));
        }

        Ok(LoadedPlugin {
            manifest,
            dir: dir.to_path_buf(),
            config,
            transport,
        })
    }

    /// Gets a plugin by manifest name
    pub fn get(&self, name: &str) -> Option<&LoadedPlugin> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    /// Lists all loaded plugins in load order
    pub fn plugins(&self) -> &[LoadedPlugin] {
        &self.plugins
    }

    /// Collects actions from every plugin with the `actions` capability.
    ///
    /// A plugin that fails to answer contributes nothing.
    pub fn actions(&self, project: &PluginProject) -> Vec<Action> {
        let mut actions = Vec::new();

        for plugin in self.plugins.iter().filter(|p| p.has(Capability::Actions)) {
            match plugin.actions(project) {
                Ok(found) => actions.extend(found),
                Err(e) => tracing::warn!("Plugin {} failed to get actions: {}", plugin.name(), e),
            }
        }

        actions
    }

    /// Offers the action to each plugin in turn; the first result wins
    pub fn execute_action(
        &self,
        action_id: &str,
        project: &PluginProject,
    ) -> Result<ActionResult, RegistryError> {
        for plugin in &self.plugins {
            match plugin.execute(action_id, project) {
                Ok(Some(result)) => return Ok(result),
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!("Plugin {} did not handle {}: {}", plugin.name(), action_id, e)
                }
            }
        }

        Err(RegistryError::Unhandled(action_id.to_string()))
    }

    /// Collects language rules from every plugin with the `languages` capability
    pub fn languages(&self) -> Vec<LanguageRule> {
        let mut rules = Vec::new();

        for plugin in self.plugins.iter().filter(|p| p.has(Capability::Languages)) {
            match plugin.languages() {
                Ok(found) => rules.extend(found),
                Err(e) => tracing::warn!("Plugin {} failed to get languages: {}", plugin.name(), e),
            }
        }

        rules
    }

    /// Stops every plugin; failures are logged, never returned
    pub fn shutdown(&mut self) {
        for plugin in self.plugins.drain(..) {
            Self::close(plugin);
        }
    }

    fn close(mut plugin: LoadedPlugin) {
        if let Err(e) = plugin.transport.shutdown() {
            tracing::warn!("Failed to shut down plugin {}: {}", plugin.name(), e);
        }
    }
}

impl Drop for PluginRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn registry(dir: &Path, enabled: &[&str]) -> PluginRegistry {
        PluginRegistry::new(
            dir,
            enabled.iter().map(|s| s.to_string()).collect(),
            HashMap::new(),
        )
    }

    #[test]
    fn new_registry_is_empty() {
        let reg = registry(Path::new("/tmp"), &[]);
        assert!(reg.plugins().is_empty());
        assert!(reg.get("anything").is_none());
    }

    #[test]
    fn is_enabled_matches_exact_names() {
        let reg = registry(Path::new("/tmp"), &["plugin1", "plugin2"]);

        assert!(reg.is_enabled("plugin1"));
        assert!(reg.is_enabled("plugin2"));
        assert!(!reg.is_enabled("plugin3"));
        assert!(!reg.is_enabled("plugin"));
    }

    #[test]
    fn load_all_creates_plugins_dir() {
        let dir = TempDir::new().unwrap();
        let plugins_dir = dir.path().join("plugins");

        let mut reg = registry(&plugins_dir, &["example"]);
        reg.load_all().unwrap();

        assert!(plugins_dir.is_dir());
        assert!(reg.plugins().is_empty());
    }

    #[test]
    fn bad_manifests_are_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("broken")).unwrap();
        std::fs::write(dir.path().join("broken/plugin.json"), "nope").unwrap();
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();
        std::fs::create_dir_all(dir.path().join("missing-exe")).unwrap();
        std::fs::write(
            dir.path().join("missing-exe/plugin.json"),
            json!({"name": "m", "version": "1", "executable": "does-not-exist"}).to_string(),
        )
        .unwrap();

        let mut reg = registry(dir.path(), &["broken", "empty", "missing-exe"]);
        reg.load_all().unwrap();

        assert!(reg.plugins().is_empty());
    }

    #[test]
    fn execute_without_plugins_is_unhandled() {
        let reg = registry(Path::new("/tmp"), &[]);
        let project = PluginProject {
            name: "api".into(),
            path: "/code/api".into(),
            language: "Go".into(),
            git_branch: String::new(),
            git_dirty: false,
            is_git_repo: false,
        };

        let err = reg.execute_action("build", &project).unwrap_err();
        assert!(matches!(err, RegistryError::Unhandled(id) if id == "build"));
        assert!(reg.actions(&project).is_empty());
        assert!(reg.languages().is_empty());
    }
}
