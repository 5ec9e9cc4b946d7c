//! Shared command state: configuration, scanning and plugins

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::discovery::{self, Scanner};
use crate::domain::Project;
use crate::enrich::{Enrichment, MarkerLanguages};
use crate::plugin::PluginRegistry;
use crate::storage::Config;

/// Configuration plus where it came from
pub struct Session {
    pub config: Config,
    pub config_path: PathBuf,
}

impl Session {
    /// Loads the config at `path`, or at the default location
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = Self::resolve_path(path)?;
        let config = Config::load_from(&config_path)?;

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn resolve_path(path: Option<PathBuf>) -> Result<PathBuf> {
        path.or_else(Config::default_path)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.config.plugins_dir(&self.config_path)
    }

    /// Starts every enabled plugin
    pub fn plugins(&self) -> Result<PluginRegistry> {
        let mut registry = PluginRegistry::new(
            self.plugins_dir(),
            self.config.plugins.enabled.clone(),
            self.config.plugins.config.clone(),
        );
        registry.load_all()?;
        Ok(registry)
    }

    /// Scans `root` (or the configured projects directory).
    ///
    /// Language rules from `registry` extend the built-in detection.
    pub fn scan(&self, root: Option<&Path>, registry: Option<&PluginRegistry>) -> Result<Vec<Project>> {
        let root = root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.repos_dir());

        let rules = registry.map(|r| r.languages()).unwrap_or_default();
        let enrichment = Enrichment::default().with_language(MarkerLanguages::new().with_rules(rules));
        let scanner = Scanner::with_enrichment(self.config.scan_options(), enrichment);

        scanner
            .scan(&root)
            .with_context(|| "Failed to scan projects (run 'proj init' or 'proj set-path' first)")
    }

    /// Scans and finds a project by name
    pub fn find_project(&self, name: &str, registry: Option<&PluginRegistry>) -> Result<Project> {
        let projects = self.scan(None, registry)?;
        discovery::find_by_name(&projects, name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Project not found: {}", name))
    }
}
