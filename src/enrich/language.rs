//! Marker-file language detection
//!
//! Built-in rules are checked in order and the first match wins. Plugins can
//! contribute extra rules which are consulted after the built-ins, lowest
//! priority first.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use super::{list_names, LanguageDetector};
use crate::domain::{LanguageRule, UNKNOWN_LANGUAGE};

/// Directory listing with lookup helpers
struct Listing {
    names: Vec<String>,
}

impl Listing {
    fn has(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.has(n))
    }

    fn has_ext(&self, exts: &[&str]) -> bool {
        self.names.iter().any(|n| {
            Path::new(n)
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .is_some_and(|e| exts.iter().any(|x| *x == e))
        })
    }
}

type Check = fn(&Listing) -> bool;

const BUILTIN: &[(&str, Check)] = &[
    ("Go", |l| l.has_any(&["go.mod", "go.sum"])),
    ("Rust", |l| l.has("Cargo.toml")),
    ("TypeScript", |l| l.has("tsconfig.json") || l.has_ext(&["ts", "tsx"])),
    ("JavaScript", |l| l.has("package.json")),
    ("Python", |l| {
        l.has_any(&["pyproject.toml", "requirements.txt", "setup.py", "Pipfile"])
    }),
    ("Java", |l| {
        l.has_any(&["pom.xml", "build.gradle", "build.gradle.kts"])
    }),
    ("C#", |l| l.has_ext(&["csproj", "sln"])),
    ("Ruby", |l| l.has("Gemfile") || l.has_ext(&["gemspec"])),
    ("PHP", |l| l.has("composer.json")),
    ("Swift", |l| l.has("Package.swift") || l.has_ext(&["swift"])),
    ("Kotlin", |l| l.has_ext(&["kt", "kts"])),
    ("C/C++", |l| {
        l.has_ext(&["c", "cpp", "cc", "cxx", "h", "hpp"])
            && l.has_any(&["Makefile", "CMakeLists.txt"])
    }),
    ("Elixir", |l| l.has("mix.exs")),
    ("Zig", |l| l.has("build.zig")),
    ("Haskell", |l| l.has("stack.yaml") || l.has_ext(&["cabal"])),
    ("Scala", |l| l.has("build.sbt")),
    ("Clojure", |l| l.has_any(&["project.clj", "deps.edn"])),
];

/// A plugin rule with its pattern compiled
#[derive(Debug)]
struct ExtraRule {
    language: String,
    files: Vec<String>,
    pattern: Option<Regex>,
}

impl ExtraRule {
    fn matches(&self, listing: &Listing) -> bool {
        self.files.iter().any(|f| listing.has(f))
            || self
                .pattern
                .as_ref()
                .is_some_and(|re| listing.names.iter().any(|n| re.is_match(n)))
    }
}

/// Detects languages from well-known files at the top of a project
#[derive(Debug, Default)]
pub struct MarkerLanguages {
    extra: Vec<ExtraRule>,
}

impl MarkerLanguages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds plugin-provided rules; rules with an invalid pattern are skipped
    pub fn with_rules(mut self, mut rules: Vec<LanguageRule>) -> Self {
        rules.sort_by_key(|r| r.priority);

        for rule in rules {
            let pattern = match rule.pattern.as_deref().filter(|p| !p.is_empty()) {
                Some(p) => match Regex::new(p) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        tracing::warn!(
                            "Ignoring language rule for {}: invalid pattern: {}",
                            rule.language,
                            e
                        );
                        continue;
                    }
                },
                None => None,
            };

            self.extra.push(ExtraRule {
                language: rule.language,
                files: rule.files,
                pattern,
            });
        }

        self
    }

    /// Classifies an already-read directory listing
    pub fn detect_names(&self, names: Vec<String>) -> String {
        let listing = Listing { names };

        if let Some((language, _)) = BUILTIN.iter().find(|(_, check)| check(&listing)) {
            return language.to_string();
        }

        if let Some(rule) = self.extra.iter().find(|r| r.matches(&listing)) {
            return rule.language.clone();
        }

        if listing.has(".git") {
            return "Git Repo".to_string();
        }

        UNKNOWN_LANGUAGE.to_string()
    }
}

impl LanguageDetector for MarkerLanguages {
    fn detect(&self, path: &Path) -> Result<String> {
        let names = list_names(path)
            .with_context(|| format!("Failed to read directory: {}", path.display()))?;
        Ok(self.detect_names(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detects_builtin_languages() {
        let detector = MarkerLanguages::new();

        assert_eq!(detector.detect_names(names(&["go.mod"])), "Go");
        assert_eq!(detector.detect_names(names(&["Cargo.toml", "src"])), "Rust");
        assert_eq!(detector.detect_names(names(&["App.csproj"])), "C#");
        assert_eq!(detector.detect_names(names(&["mix.exs"])), "Elixir");
    }

    #[test]
    fn first_rule_wins() {
        let detector = MarkerLanguages::new();

        // TypeScript is checked before JavaScript
        let lang = detector.detect_names(names(&["package.json", "tsconfig.json"]));
        assert_eq!(lang, "TypeScript");
    }

    #[test]
    fn c_needs_sources_and_build_file() {
        let detector = MarkerLanguages::new();

        assert_eq!(detector.detect_names(names(&["main.c"])), UNKNOWN_LANGUAGE);
        assert_eq!(detector.detect_names(names(&["main.c", "Makefile"])), "C/C++");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let detector = MarkerLanguages::new();
        assert_eq!(detector.detect_names(names(&["Main.KT"])), "Kotlin");
    }

    #[test]
    fn git_repo_fallback() {
        let detector = MarkerLanguages::new();

        assert_eq!(detector.detect_names(names(&[".git", "notes.txt"])), "Git Repo");
        assert_eq!(detector.detect_names(names(&["notes.txt"])), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn plugin_rules_after_builtins() {
        let detector = MarkerLanguages::new().with_rules(vec![
            LanguageRule {
                language: "Nim".to_string(),
                priority: 10,
                files: vec![],
                pattern: Some(r"\.nimble$".to_string()),
            },
            LanguageRule {
                language: "Gleam".to_string(),
                priority: 1,
                files: vec!["gleam.toml".to_string()],
                pattern: None,
            },
        ]);

        assert_eq!(detector.detect_names(names(&["app.nimble"])), "Nim");
        assert_eq!(detector.detect_names(names(&["gleam.toml"])), "Gleam");
        assert_eq!(
            detector.detect_names(names(&["gleam.toml", "go.mod"])),
            "Go"
        );
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let detector = MarkerLanguages::new().with_rules(vec![LanguageRule {
            language: "Broken".to_string(),
            priority: 0,
            files: vec!["broken.txt".to_string()],
            pattern: Some("(".to_string()),
        }]);

        assert_eq!(detector.detect_names(names(&["broken.txt"])), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn detect_reads_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Gemfile"), "").unwrap();

        assert_eq!(MarkerLanguages::new().detect(dir.path()).unwrap(), "Ruby");
        assert!(MarkerLanguages::new()
            .detect(&dir.path().join("missing"))
            .is_err());
    }
}
