//! Hierarchy-preserving sort
//!
//! Top-level entities are sorted among themselves and each one's children are
//! sorted separately, so a child never drifts away from its parent.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Depth, Project};

/// Sentinel language that sorts groups after every real language
const GROUP_LANGUAGE: &str = "\u{10FFFF}";

/// Field to order projects by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Name, ascending
    Name,
    /// Modification time, newest first
    #[default]
    #[value(name = "last-modified", alias = "lastModified")]
    LastModified,
    /// Language, ascending; groups last
    Language,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::LastModified => "lastModified",
            SortKey::Language => "language",
        }
    }

    fn compare(&self, a: &Project, b: &Project) -> Ordering {
        let primary = match self {
            SortKey::Name => Ordering::Equal,
            SortKey::LastModified => b.last_modified.cmp(&a.last_modified),
            SortKey::Language => language_of(a).cmp(language_of(b)),
        };
        primary.then_with(|| a.name.cmp(&b.name))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortKey::Name),
            "lastModified" | "last-modified" | "last_modified" => Ok(SortKey::LastModified),
            "language" => Ok(SortKey::Language),
            other => Err(format!("Unknown sort key: {}", other)),
        }
    }
}

fn language_of(p: &Project) -> &str {
    if p.is_group {
        GROUP_LANGUAGE
    } else {
        &p.language
    }
}

/// Sorts a scan result by `key` without breaking parent/child runs.
///
/// Children whose parent is not in `projects` are dropped.
pub fn sort(projects: Vec<Project>, key: SortKey) -> Vec<Project> {
    let total = projects.len();
    let (parents, children): (Vec<_>, Vec<_>) =
        projects.into_iter().partition(|p| p.depth == Depth::Top);

    let mut families: Vec<(Project, Vec<Project>)> =
        parents.into_iter().map(|p| (p, Vec::new())).collect();
    let index: HashMap<PathBuf, usize> = families
        .iter()
        .enumerate()
        .map(|(i, (p, _))| (p.path.clone(), i))
        .collect();

    for child in children {
        let slot = child.parent_path.as_ref().and_then(|parent| index.get(parent));
        match slot {
            Some(&i) => families[i].1.push(child),
            None => tracing::debug!("Dropping orphaned child {}", child.path.display()),
        }
    }

    families.sort_by(|a, b| key.compare(&a.0, &b.0));

    let mut sorted = Vec::with_capacity(total);
    for (parent, mut kids) in families {
        kids.sort_by(|a, b| key.compare(a, b));
        sorted.push(parent);
        sorted.extend(kids);
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use std::path::Path;

    fn project(name: &str, language: &str, age_days: i64) -> Project {
        let mut p = Project::new(name, format!("/code/{}", name), Depth::Top);
        p.language = language.to_string();
        p.last_modified = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() - Duration::days(age_days);
        p
    }

    fn child(parent: &Project, name: &str, language: &str, age_days: i64) -> Project {
        let mut c = project(name, language, age_days);
        c.path = parent.path.join(name);
        c.nest_under(&parent.path);
        c
    }

    fn group(name: &str, children: usize) -> Project {
        Project::group(name, format!("/code/{}", name), children, Utc::now())
    }

    fn names(projects: &[Project]) -> Vec<&str> {
        projects.iter().map(|p| p.name.as_str()).collect()
    }

    /// The webdev/standalone layout with children in scan order
    fn webdev() -> Vec<Project> {
        let webdev = group("webdev", 2);
        let frontend = child(&webdev, "frontend", "JavaScript", 1);
        let backend = child(&webdev, "backend", "Go", 2);
        let standalone = project("standalone", "Go", 0);
        vec![webdev, frontend, backend, standalone]
    }

    #[test]
    fn name_sort_keeps_children_with_parent() {
        let sorted = sort(webdev(), SortKey::Name);
        assert_eq!(names(&sorted), vec!["standalone", "webdev", "backend", "frontend"]);
    }

    #[test]
    fn last_modified_sorts_newest_first() {
        let sorted = sort(webdev(), SortKey::LastModified);

        // webdev was stamped with now(), standalone is older
        assert_eq!(names(&sorted), vec!["webdev", "frontend", "backend", "standalone"]);
    }

    #[test]
    fn language_sort_puts_groups_last() {
        let projects = vec![
            group("aaa-group", 1),
            child(&group("aaa-group", 1), "inner", "Rust", 0),
            project("zed", "Go", 0),
            project("alpha", "Python", 0),
            project("beta", "Go", 0),
        ];

        let sorted = sort(projects, SortKey::Language);
        assert_eq!(names(&sorted), vec!["beta", "zed", "alpha", "aaa-group", "inner"]);
    }

    #[test]
    fn equal_keys_break_ties_by_name() {
        let mut a = project("b-project", "Go", 5);
        let mut b = project("a-project", "Go", 5);
        a.last_modified = b.last_modified;
        b.language = a.language.clone();

        let sorted = sort(vec![a, b], SortKey::LastModified);
        assert_eq!(names(&sorted), vec!["a-project", "b-project"]);
    }

    #[test]
    fn orphans_are_dropped() {
        let ghost = project("ghost", "Go", 0);
        let orphan = child(&ghost, "orphan", "Go", 0);
        let sorted = sort(vec![project("solo", "Go", 0), orphan], SortKey::Name);

        assert_eq!(names(&sorted), vec!["solo"]);
    }

    #[test]
    fn parse_sort_key() {
        assert_eq!("lastModified".parse::<SortKey>().unwrap(), SortKey::LastModified);
        assert_eq!("last-modified".parse::<SortKey>().unwrap(), SortKey::LastModified);
        assert_eq!("language".parse::<SortKey>().unwrap(), SortKey::Language);
        assert!("size".parse::<SortKey>().is_err());
    }

    fn key() -> impl Strategy<Value = SortKey> {
        prop_oneof![
            Just(SortKey::Name),
            Just(SortKey::LastModified),
            Just(SortKey::Language)
        ]
    }

    /// Up to 6 families, each a project or group with up to 4 children
    fn families() -> impl Strategy<Value = Vec<Project>> {
        let lang = prop_oneof![Just("Go"), Just("Rust"), Just("Python")];
        let family = (any::<bool>(), "[a-e]{1,3}", lang.clone(), 0i64..30, prop::collection::vec(("[a-e]{1,3}", lang, 0i64..30), 0..4));

        prop::collection::vec(family, 0..6).prop_map(|fams| {
            let mut out = Vec::new();
            for (i, (is_group, name, lang, age, kids)) in fams.into_iter().enumerate() {
                let name = format!("{}{}", name, i);
                let mut parent = if is_group && !kids.is_empty() {
                    group(&name, kids.len())
                } else {
                    project(&name, lang, age)
                };
                parent.sub_project_count = kids.len();
                let children: Vec<_> = kids
                    .into_iter()
                    .enumerate()
                    .map(|(j, (n, l, a))| child(&parent, &format!("{}{}", n, j), l, a))
                    .collect();
                out.push(parent);
                out.extend(children);
            }
            out
        })
    }

    fn is_contiguous(projects: &[Project]) -> bool {
        let mut current: Option<&Path> = None;
        for p in projects {
            match p.depth {
                Depth::Top => current = Some(&p.path),
                Depth::Child => {
                    if p.parent_path.as_deref() != current {
                        return false;
                    }
                }
            }
        }
        true
    }

    proptest! {
        #[test]
        fn sort_preserves_families(projects in families(), key in key()) {
            let len = projects.len();
            let sorted = sort(projects, key);

            prop_assert_eq!(sorted.len(), len);
            prop_assert!(is_contiguous(&sorted));
        }

        #[test]
        fn language_ties_ordered_by_name(projects in families()) {
            let sorted = sort(projects, SortKey::Language);
            let top: Vec<_> = sorted.iter().filter(|p| p.depth == Depth::Top).collect();

            for pair in top.windows(2) {
                if language_of(pair[0]) == language_of(pair[1]) {
                    prop_assert!(pair[0].name <= pair[1].name);
                }
            }
        }
    }
}
