//! Project root classification

use std::path::Path;

/// Files or directories whose presence marks a project root
pub const PROJECT_MARKERS: &[&str] = &[
    ".git",
    "go.mod",
    "package.json",
    "Cargo.toml",
    "requirements.txt",
    "setup.py",
    "pyproject.toml",
    "Gemfile",
    "pom.xml",
    "build.gradle",
    "composer.json",
    "CMakeLists.txt",
    "Makefile",
    ".project",
    "README.md",
    "README",
];

/// Returns true if `path` directly contains any project marker.
///
/// Unreadable or missing directories are simply not project roots.
pub fn is_project_root(path: &Path) -> bool {
    PROJECT_MARKERS
        .iter()
        .any(|marker| path.join(marker).symlink_metadata().is_ok())
}

/// Classifies an already-read directory listing
pub fn is_project_listing<S: AsRef<str>>(names: &[S]) -> bool {
    names
        .iter()
        .any(|name| PROJECT_MARKERS.contains(&name.as_ref()))
}
