//! Configuration handling for proj
//!
//! Configuration is stored as TOML in `~/.config/proj/config.toml` (or the
//! platform equivalent). A missing file means defaults.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::discovery::{ScanOptions, SortKey};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

const DEFAULT_EDITORS: &[(&str, &[&str])] = &[
    ("code", &["code", "--goto"]),
    ("nvim", &["nvim"]),
    ("vim", &["vim"]),
    ("emacs", &["emacsclient", "-n"]),
    ("idea", &["idea"]),
    ("goland", &["goland"]),
    ("pycharm", &["pycharm"]),
    ("webstorm", &["webstorm"]),
    ("clion", &["clion"]),
    ("rubymine", &["rubymine"]),
    ("phpstorm", &["phpstorm"]),
    ("zed", &["zed"]),
    ("subl", &["subl"]),
    ("hx", &["hx"]),
    ("cursor", &["cursor"]),
];

/// Editor used to open projects.
///
/// Stored for front ends that run built-in actions; proj itself only
/// persists and displays it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Alias of the default editor
    pub default: String,

    /// Command line for each editor alias
    pub aliases: HashMap<String, Vec<String>>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let aliases = DEFAULT_EDITORS
            .iter()
            .map(|(alias, cmd)| (alias.to_string(), cmd.iter().map(|s| s.to_string()).collect()))
            .collect();

        Self {
            default: "code".to_string(),
            aliases,
        }
    }
}

/// Display preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Include directories starting with `.`
    pub show_hidden_dirs: bool,

    /// Default sort order
    pub sort_by: SortKey,

    pub show_git_status: bool,

    pub show_language: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_hidden_dirs: false,
            sort_by: SortKey::LastModified,
            show_git_status: true,
            show_language: true,
        }
    }
}

/// Built-in action toggles, stored for front ends like [`EditorConfig`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    pub enable_git_operations: bool,
    pub enable_test_runner: bool,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            enable_git_operations: true,
            enable_test_runner: true,
        }
    }
}

/// Plugin settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Plugin directory names to load
    pub enabled: Vec<String>,

    /// Plugins directory (defaults to `plugins/` next to the config file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Settings passed to each plugin's `init`, keyed by plugin directory name
    pub config: HashMap<String, Map<String, Value>>,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for projects
    pub repos_path: String,

    /// Shell for built-in actions (stored, not used by proj)
    pub shell: String,

    /// Directory names never scanned (exact match)
    pub exclude_patterns: Vec<String>,

    pub editor: EditorConfig,

    pub display: DisplayConfig,

    pub actions: ActionsConfig,

    pub plugins: PluginsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repos_path: "~/code".to_string(),
            shell: "/bin/bash".to_string(),
            exclude_patterns: [".git", "node_modules", ".DS_Store", "__pycache__", "vendor"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            editor: EditorConfig::default(),
            display: DisplayConfig::default(),
            actions: ActionsConfig::default(),
            plugins: PluginsConfig::default(),
        }
    }
}

impl Config {
    /// Returns the config directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "proj", "proj").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the default config file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Loads configuration from `path`, or defaults if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")?;

        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.repos_path.trim().is_empty() {
            return Err(ConfigError::Invalid("repos_path is empty".to_string()));
        }
        Ok(())
    }

    /// The projects directory with `~` expanded
    pub fn repos_dir(&self) -> PathBuf {
        expand_path(Path::new(&self.repos_path))
    }

    /// Plugins directory for a config loaded from `config_path`
    pub fn plugins_dir(&self, config_path: &Path) -> PathBuf {
        match &self.plugins.dir {
            Some(dir) => expand_path(dir),
            None => config_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join("plugins"),
        }
    }

    /// Scanner options derived from exclusions and display settings
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::new(self.exclude_patterns.clone(), self.display.show_hidden_dirs)
    }
}

/// Expands a leading `~` to the home directory
pub fn expand_path(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}
