//! Docker file detection

use std::path::Path;

use anyhow::{Context, Result};

use super::ContainerProbe;
use crate::domain::ContainerInfo;

const COMPOSE_FILES: &[&str] = &[
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Looks for Dockerfiles and Compose files at the top of a project
#[derive(Debug, Clone, Copy, Default)]
pub struct DockerFiles;

impl ContainerProbe for DockerFiles {
    fn detect(&self, path: &Path) -> Result<ContainerInfo> {
        let entries = std::fs::read_dir(path)
            .with_context(|| format!("Failed to read directory: {}", path.display()))?;

        let mut info = ContainerInfo::default();
        for entry in entries.flatten() {
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if is_dockerfile(&name) {
                info.has_dockerfile = true;
            }
            if COMPOSE_FILES.contains(&name.as_str()) {
                info.has_compose = true;
            }
        }

        Ok(info)
    }
}

fn is_dockerfile(name: &str) -> bool {
    name == "Dockerfile" || name.starts_with("Dockerfile.")
}
