//! Project and group entities produced by a scan
//!
//! A scan yields a flat list where every child (depth 1) follows its parent
//! (depth 0). Groups are plain folders that only exist to hold projects.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Language reported when nothing could be detected
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Nesting level of an entity in a scan result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Depth {
    /// Direct child of the scan root
    #[default]
    Top,
    /// Project nested one level under a top-level entity
    Child,
}

impl Depth {
    pub fn as_u8(self) -> u8 {
        match self {
            Depth::Top => 0,
            Depth::Child => 1,
        }
    }
}

impl Serialize for Depth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Depth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Depth::Top),
            1 => Ok(Depth::Child),
            other => Err(serde::de::Error::custom(format!(
                "depth must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// Version control state of a project directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcsStatus {
    pub is_repo: bool,
    pub branch: Option<String>,
    pub dirty: bool,
}

/// Container tooling found in a project directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub has_dockerfile: bool,
    pub has_compose: bool,
}

/// A project or group discovered under the scan root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Directory name
    pub name: String,

    /// Absolute path to the directory
    pub path: PathBuf,

    /// Path of the top-level entity this one is nested under
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<PathBuf>,

    /// Detected language, empty for groups
    pub language: String,

    /// Version control state
    pub vcs: VcsStatus,

    /// Directory modification time
    pub last_modified: DateTime<Utc>,

    /// Docker files present in the directory
    pub container: ContainerInfo,

    pub depth: Depth,

    /// Number of child projects found one level down
    pub sub_project_count: usize,

    /// True for folders that contain projects but are not projects themselves
    pub is_group: bool,
}

impl Project {
    /// Creates a bare project entity with default metadata
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, depth: Depth) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            parent_path: None,
            language: UNKNOWN_LANGUAGE.to_string(),
            vcs: VcsStatus::default(),
            last_modified: DateTime::<Utc>::default(),
            container: ContainerInfo::default(),
            depth,
            sub_project_count: 0,
            is_group: false,
        }
    }

    /// Creates a group entity for a folder holding `children` projects
    pub fn group(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        children: usize,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            language: String::new(),
            last_modified,
            sub_project_count: children,
            is_group: true,
            ..Self::new(name, path, Depth::Top)
        }
    }

    /// Re-parents this entity under `parent`
    pub fn nest_under(&mut self, parent: &Path) {
        self.depth = Depth::Child;
        self.parent_path = Some(parent.to_path_buf());
    }

    /// Groups are organizational only and never offered for selection
    pub fn is_selectable(&self) -> bool {
        !self.is_group
    }

    /// A project that also holds nested projects
    pub fn is_monorepo(&self) -> bool {
        !self.is_group && self.depth == Depth::Top && self.sub_project_count > 0
    }

    pub fn branch(&self) -> &str {
        self.vcs.branch.as_deref().unwrap_or("")
    }
}
