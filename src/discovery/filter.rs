//! Search and selection filters over scan results

use crate::domain::Project;

/// Keeps projects whose name, language or branch contains `query`,
/// ignoring case. An empty query keeps everything.
pub fn filter(projects: Vec<Project>, query: &str) -> Vec<Project> {
    if query.is_empty() {
        return projects;
    }

    let query = query.to_lowercase();
    projects
        .into_iter()
        .filter(|p| {
            [p.name.as_str(), p.language.as_str(), p.branch()]
                .iter()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}

/// Projects a user can act on; groups are left out
pub fn selectable(projects: &[Project]) -> Vec<&Project> {
    projects.iter().filter(|p| p.is_selectable()).collect()
}

/// Finds a selectable project by name: an exact case-insensitive match wins,
/// otherwise the first project whose name contains `name`
pub fn find_by_name<'a>(projects: &'a [Project], name: &str) -> Option<&'a Project> {
    let wanted = name.to_lowercase();
    let candidates = selectable(projects);

    candidates
        .iter()
        .find(|p| p.name.to_lowercase() == wanted)
        .or_else(|| {
            candidates
                .iter()
                .find(|p| p.name.to_lowercase().contains(&wanted))
        })
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Depth;
    use chrono::Utc;

    fn project(name: &str, language: &str, branch: Option<&str>) -> Project {
        let mut p = Project::new(name, format!("/code/{}", name), Depth::Top);
        p.language = language.to_string();
        p.vcs.branch = branch.map(String::from);
        p
    }

    fn sample() -> Vec<Project> {
        vec![
            Project::group("services", "/code/services", 1, Utc::now()),
            project("api-server", "Go", Some("main")),
            project("Web", "TypeScript", Some("feature/login")),
            project("api", "Rust", None),
        ]
    }

    #[test]
    fn empty_query_keeps_all() {
        assert_eq!(filter(sample(), "").len(), 4);
    }

    #[test]
    fn matches_name_language_and_branch() {
        let names = |q: &str| -> Vec<String> {
            filter(sample(), q).into_iter().map(|p| p.name).collect()
        };

        assert_eq!(names("WEB"), vec!["Web"]);
        assert_eq!(names("rust"), vec!["api"]);
        assert_eq!(names("login"), vec!["Web"]);
        assert!(names("python").is_empty());
    }

    #[test]
    fn selectable_excludes_groups() {
        let projects = sample();
        let items = selectable(&projects);

        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|p| !p.is_group));
    }

    #[test]
    fn exact_name_beats_substring() {
        let projects = sample();

        assert_eq!(find_by_name(&projects, "API").unwrap().name, "api");
        assert_eq!(find_by_name(&projects, "serv").unwrap().name, "api-server");
        assert_eq!(find_by_name(&projects, "we").unwrap().name, "Web");
        assert!(find_by_name(&projects, "services").is_none());
    }
}
