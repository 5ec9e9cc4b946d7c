//! Plugin manifests
//!
//! Each plugin directory holds a `plugin.json` describing the plugin and the
//! executable to spawn.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Manifest file name inside a plugin directory
pub const MANIFEST_FILE: &str = "plugin.json";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid manifest {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// A feature a plugin opts into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Contributes actions for projects
    Actions,
    /// Contributes language detection rules
    Languages,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Actions => "actions",
            Capability::Languages => "languages",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "actions" => Some(Capability::Actions),
            "languages" => Some(Capability::Languages),
            _ => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The capabilities declared by a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0.insert(capability);
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|c| c.as_str()))
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(names
            .iter()
            .filter_map(|name| {
                let cap = Capability::parse(name);
                if cap.is_none() {
                    tracing::debug!("Ignoring unknown plugin capability: {}", name);
                }
                cap
            })
            .collect())
    }
}

/// Plugin manifest declaring metadata and capabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Unique plugin name
    pub name: String,

    pub version: String,

    #[serde(default)]
    pub description: String,

    /// Executable path, relative to the plugin directory
    pub executable: String,

    #[serde(default)]
    pub capabilities: CapabilitySet,

    /// Default configuration, overridden by host settings
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl PluginManifest {
    /// Reads `plugin.json` from a plugin directory
    pub fn load(plugin_dir: &Path) -> Result<Self, ManifestError> {
        let path = plugin_dir.join(MANIFEST_FILE);

        let content = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
            path: path.clone(),
            source,
        })?;

        let manifest: PluginManifest =
            serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
                path: path.clone(),
                source,
            })?;

        if manifest.name.trim().is_empty() {
            return Err(ManifestError::Invalid {
                path,
                reason: "name is empty".to_string(),
            });
        }
        if manifest.executable.trim().is_empty() {
            return Err(ManifestError::Invalid {
                path,
                reason: "executable is empty".to_string(),
            });
        }

        Ok(manifest)
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Absolute path of the executable for a plugin living in `plugin_dir`
    pub fn executable_path(&self, plugin_dir: &Path) -> PathBuf {
        plugin_dir.join(&self.executable)
    }

    /// Manifest defaults with `overrides` applied key by key
    pub fn merged_config(&self, overrides: Option<&Map<String, Value>>) -> Map<String, Value> {
        let mut merged = self.config.clone();
        if let Some(overrides) = overrides {
            for (key, value) in overrides {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}
