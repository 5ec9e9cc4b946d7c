//! # Enrichment
//!
//! Per-project metadata probes used by the scanner after classification.
//!
//! Each probe sits behind a trait so the scanner can be driven with fakes in
//! tests. A failing probe only degrades its own field:
//!
//! | Probe | Default | On error |
//! |-------|---------|----------|
//! | [`VcsProbe`] | [`GitCli`] | not a repository |
//! | [`LanguageDetector`] | [`MarkerLanguages`] | `"Unknown"` |
//! | [`ContainerProbe`] | [`DockerFiles`] | no Docker files |

mod container;
mod language;
mod vcs;

use std::path::Path;

use anyhow::Result;

use crate::domain::{ContainerInfo, VcsStatus};

pub use container::DockerFiles;
pub use language::MarkerLanguages;
pub use vcs::GitCli;

/// Reports version control state for a directory
pub trait VcsProbe: Send + Sync {
    fn status(&self, path: &Path) -> Result<VcsStatus>;
}

/// Names the primary language of a directory
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, path: &Path) -> Result<String>;
}

/// Reports container tooling present in a directory
pub trait ContainerProbe: Send + Sync {
    fn detect(&self, path: &Path) -> Result<ContainerInfo>;
}

/// The set of probes applied to every discovered project
pub struct Enrichment {
    pub vcs: Box<dyn VcsProbe>,
    pub language: Box<dyn LanguageDetector>,
    pub container: Box<dyn ContainerProbe>,
}

impl Enrichment {
    pub fn new(
        vcs: impl VcsProbe + 'static,
        language: impl LanguageDetector + 'static,
        container: impl ContainerProbe + 'static,
    ) -> Self {
        Self {
            vcs: Box::new(vcs),
            language: Box::new(language),
            container: Box::new(container),
        }
    }

    /// Replaces the language detector, e.g. one extended with plugin rules
    pub fn with_language(mut self, language: impl LanguageDetector + 'static) -> Self {
        self.language = Box::new(language);
        self
    }
}

impl Default for Enrichment {
    fn default() -> Self {
        Self::new(GitCli, MarkerLanguages::new(), DockerFiles)
    }
}

/// Lists the entry names of a directory
pub(crate) fn list_names(path: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(path)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}
