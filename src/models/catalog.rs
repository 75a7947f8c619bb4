// src/models/catalog.rs

//! The crawled project forest and the operations that need no network.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::models::{Distribution, File, FilterSet, Node, Project, Version};

/// All projects visible to the logged-in user.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Copy of the catalog holding only entries matched by `filters`.
    ///
    /// A project survives if its own description matches the project
    /// pattern and at least one file below it passes the remaining levels.
    pub fn filter(&self, filters: &FilterSet) -> Self {
        let below = filters.below_projects();

        let projects = self
            .projects
            .iter()
            .filter(|project| filters.projects.is_match(project.description()))
            .filter_map(|project| project.filter(&below))
            .collect();

        Self { projects }
    }

    /// Every file together with its ancestors, depth-first in crawl order.
    pub fn files(&self) -> Vec<DownloadRecord<'_>> {
        let mut records = Vec::new();

        for project in &self.projects {
            for distribution in project.distributions() {
                for version in distribution.versions() {
                    for file in version.files() {
                        records.push(DownloadRecord {
                            project,
                            distribution,
                            version,
                            file,
                        });
                    }
                }
            }
        }

        records
    }

    /// Pretty printed JSON with a three-space indent.
    pub fn to_json(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// A file joined with the project, distribution and version it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct DownloadRecord<'a> {
    pub project: &'a Project,
    pub distribution: &'a Distribution,
    pub version: &'a Version,
    pub file: &'a File,
}

impl DownloadRecord<'_> {
    pub fn url(&self) -> &url::Url {
        &self.file.link().url
    }

    /// File name for saving: the file description alone, or all four
    /// descriptions joined with `-`.
    pub fn file_name(&self, filename_only: bool) -> String {
        if filename_only {
            sanitize_component(self.file.description())
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for DownloadRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components = [
            self.project.description(),
            self.distribution.description(),
            self.version.description(),
            self.file.description(),
        ];

        let name = components
            .iter()
            .map(|component| sanitize_component(component))
            .collect::<Vec<_>>()
            .join("-");

        f.write_str(&name)
    }
}

/// Replace path separators so a description stays a single path component.
pub fn sanitize_component(component: &str) -> String {
    component.replace(['\\', '/'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entry, FileDetails, Link};
    use url::Url;

    fn link(href: &str, text: &str) -> Link {
        let base = Url::parse("https://portal.example.com/mod_perl/").unwrap();
        Link::new(&base, href, text).unwrap()
    }

    fn file(id: u64, name: &str) -> File {
        File::new(link(&format!("attachment.pl?Do=GET&Id={id}"), name), id, FileDetails::default())
    }

    fn catalog() -> Catalog {
        let alpha = Entry::new(
            link("deploy.pl?ProjectId=1", "Alpha"),
            1,
            vec![Entry::new(
                link("deploy.pl?Do=DISTR&Id=10", "linux/x86"),
                10,
                vec![
                    Entry::new(
                        link("deploy.pl?Do=VERSION&Id=100", "1.0"),
                        100,
                        vec![file(1000, "readme.txt"), file(1001, "build.log")],
                    ),
                    Entry::new(link("deploy.pl?Do=VERSION&Id=101", "2.0"), 101, vec![]),
                ],
            )],
        );
        let beta = Entry::new(
            link("deploy.pl?ProjectId=2", "Beta"),
            2,
            vec![Entry::new(
                link("deploy.pl?Do=DISTR&Id=20", "win"),
                20,
                vec![Entry::new(
                    link("deploy.pl?Do=VERSION&Id=200", "3.1"),
                    200,
                    vec![file(2000, "setup.exe")],
                )],
            )],
        );

        Catalog::new(vec![alpha, beta])
    }

    #[test]
    fn test_files_in_crawl_order() {
        let catalog = catalog();
        let ids: Vec<u64> = catalog.files().iter().map(|r| r.file.id()).collect();
        assert_eq!(ids, vec![1000, 1001, 2000]);
    }

    #[test]
    fn test_filter_projects_by_own_description() {
        let filters = FilterSet::new(Some("^Be"), None, None, None).unwrap();
        let filtered = catalog().filter(&filters);

        assert_eq!(filtered.projects().len(), 1);
        assert_eq!(filtered.projects()[0].id(), 2);
    }

    #[test]
    fn test_filter_files_keeps_ancestor_chain() {
        let original = catalog();
        let filtered = original.filter(&FilterSet::files("^readme").unwrap());

        let records = filtered.files();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].project.id(), 1);
        assert_eq!(records[0].distribution.id(), 10);
        assert_eq!(records[0].version.id(), 100);
        assert_eq!(records[0].file.description(), "readme.txt");

        assert_eq!(original.files().len(), 3);
    }

    #[test]
    fn test_filter_without_any_match_is_empty() {
        let filtered = catalog().filter(&FilterSet::files("^nomatch").unwrap());
        assert!(filtered.projects().is_empty());
        assert!(filtered.files().is_empty());
    }

    #[test]
    fn test_default_filter_drops_versions_without_files() {
        let filtered = catalog().filter(&FilterSet::default());
        let alpha = &filtered.projects()[0];

        assert_eq!(alpha.distributions()[0].versions().len(), 1);
        assert_eq!(filtered.files().len(), 3);
    }

    #[test]
    fn test_file_name() {
        let catalog = catalog();
        let records = catalog.files();

        assert_eq!(records[0].file_name(true), "readme.txt");
        assert_eq!(records[0].file_name(false), "Alpha-linux-x86-1.0-readme.txt");
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component(r"a\b/c"), "a-b-c");
    }

    #[test]
    fn test_to_json_shape() {
        let json = catalog().to_json().unwrap();
        assert!(json.starts_with("[\n   {"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let projects = value.as_array().unwrap();
        assert_eq!(projects.len(), 2);

        let alpha = &projects[0];
        for key in ["description", "id", "url", "distributions"] {
            assert!(alpha.get(key).is_some(), "missing {key}");
        }

        let versions = alpha["distributions"][0]["versions"].as_array().unwrap();
        assert!(versions[0].get("files").is_some());
        assert!(versions[1].get("files").is_none());
    }

    #[test]
    fn test_to_yaml_shape() {
        let yaml = catalog().to_yaml().unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();

        let first = &value[0];
        assert_eq!(first["description"].as_str(), Some("Alpha"));
        assert_eq!(first["id"].as_u64(), Some(1));
        assert!(first["distributions"][0]["versions"][0]["files"].is_sequence());
    }
}
