// src/services/crawler.rs

//! Hierarchy crawler service.
//!
//! Walks project → distribution → version → file by following the links
//! on each listing page. Every level accepts only the links matching its
//! [`LinkRule`], keeps one entry per id and then descends into each entry.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    Distribution, Entry, File, FileDetails, Level, Link, Node, Project, Version, dedup_by_id,
};
use crate::services::session::{PATH_ATTACHMENT, PATH_DEPLOY, Page, Session};

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));

const KEY_DO: &str = "Do";
const KEY_ID: &str = "Id";
const KEY_PROJECT_ID: &str = "ProjectId";

// ASCII only: every accepted id must parse as u64
const PATTERN_ID: &str = "[0-9]+";

/// Condition set a link must satisfy to count as an entry of a level.
#[derive(Debug, Clone)]
pub struct LinkRule {
    /// Required raw href path, e.g. `deploy.pl`
    path: &'static str,

    /// Required query parameters and the regex each value must fully match
    params: Vec<(&'static str, Regex)>,

    /// Parameter holding the entry id
    id_param: &'static str,
}

impl LinkRule {
    pub fn new(
        path: &'static str,
        params: &[(&'static str, &str)],
        id_param: &'static str,
    ) -> Result<Self> {
        let params = params
            .iter()
            .map(|(key, pattern)| {
                Regex::new(&format!("^(?:{pattern})$"))
                    .map(|regex| (*key, regex))
                    .map_err(|e| AppError::pattern(*pattern, e))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            path,
            params,
            id_param,
        })
    }

    /// Project links on the page returned by the login.
    pub fn projects() -> Self {
        Self::new(PATH_DEPLOY, &[(KEY_PROJECT_ID, PATTERN_ID)], KEY_PROJECT_ID)
            .expect("valid project rule")
    }

    /// Distribution links on a project page.
    pub fn distributions() -> Self {
        Self::new(PATH_DEPLOY, &[(KEY_DO, "DISTR"), (KEY_ID, PATTERN_ID)], KEY_ID)
            .expect("valid distribution rule")
    }

    /// Version links on a distribution page.
    pub fn versions() -> Self {
        Self::new(PATH_DEPLOY, &[(KEY_DO, "VERSION"), (KEY_ID, PATTERN_ID)], KEY_ID)
            .expect("valid version rule")
    }

    /// File links on a version page.
    pub fn files() -> Self {
        Self::new(PATH_ATTACHMENT, &[(KEY_DO, "GET"), (KEY_ID, PATTERN_ID)], KEY_ID)
            .expect("valid file rule")
    }

    /// Whether `link` satisfies the path and every parameter condition.
    pub fn matches(&self, link: &Link) -> bool {
        link.path == self.path
            && self.params.iter().all(|(key, regex)| {
                link.param(key)
                    .is_some_and(|value| regex.is_match(value))
            })
    }

    /// Id of a link accepted by this rule.
    ///
    /// The rule's own conditions guarantee the parameter, so a failure here
    /// means the page no longer fits the rule and aborts the crawl.
    pub fn id_of(&self, link: &Link) -> Result<u64> {
        link.param(self.id_param)
            .and_then(|value| value.parse().ok())
            .ok_or_else(|| AppError::missing_id(self.id_param, link.url.as_str()))
    }
}

/// All rules of one crawl.
#[derive(Debug, Clone)]
struct Rules {
    projects: LinkRule,
    distributions: LinkRule,
    versions: LinkRule,
    files: LinkRule,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            projects: LinkRule::projects(),
            distributions: LinkRule::distributions(),
            versions: LinkRule::versions(),
            files: LinkRule::files(),
        }
    }
}

/// Links of `document` accepted by `rule`, in document order.
///
/// Each link is returned with the anchor's file details when `with_details`
/// is set (only file rows carry them).
pub fn extract_links(
    document: &Html,
    base_url: &Url,
    rule: &LinkRule,
    with_details: bool,
) -> Vec<(Link, FileDetails)> {
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| {
            let link = Link::from_anchor(base_url, anchor)?;
            if !rule.matches(&link) {
                log::trace!("Discarding link {}", link.href);
                return None;
            }

            let details = if with_details {
                FileDetails::from_anchor(anchor)
            } else {
                FileDetails::default()
            };
            Some((link, details))
        })
        .collect()
}

/// Service building the entry tree of a logged-in session.
pub struct HierarchyCrawler<'a> {
    session: &'a Session,
    rules: Rules,
}

impl<'a> HierarchyCrawler<'a> {
    /// Create a new hierarchy crawler.
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            rules: Rules::default(),
        }
    }

    /// Log in and crawl every project down to its files.
    pub fn crawl(&self, user: &str, password: &str) -> Result<Vec<Project>> {
        let page = self.session.login(user, password)?;

        let mut projects: Vec<Project> = self.entries(page, &self.rules.projects, |link, id, _| {
            Entry::new(link, id, Vec::new())
        })?;
        log::info!("Found {} projects", projects.len());

        for project in &mut projects {
            log::info!("Crawling project {} ({})", project.description(), project.id());
            let distributions = self.distributions(project.id())?;
            project.set_children(distributions);
        }

        Ok(projects)
    }

    fn distributions(&self, project_id: u64) -> Result<Vec<Distribution>> {
        let page = self
            .session
            .get(PATH_DEPLOY, &[(KEY_PROJECT_ID, project_id.to_string())])?;

        let mut distributions: Vec<Distribution> = self.entries(page, &self.rules.distributions, |link, id, _| {
            Entry::new(link, id, Vec::new())
        })?;
        log_level_count(Level::Distribution, distributions.len(), project_id);

        for distribution in &mut distributions {
            let versions = self.versions(distribution.id())?;
            distribution.set_children(versions);
        }

        Ok(distributions)
    }

    fn versions(&self, distribution_id: u64) -> Result<Vec<Version>> {
        let page = self.session.get(
            PATH_DEPLOY,
            &[(KEY_DO, "DISTR".to_string()), (KEY_ID, distribution_id.to_string())],
        )?;

        let mut versions: Vec<Version> = self.entries(page, &self.rules.versions, |link, id, _| {
            Entry::new(link, id, Vec::new())
        })?;
        log_level_count(Level::Version, versions.len(), distribution_id);

        for version in &mut versions {
            let files = self.files(version.id())?;
            version.set_children(files);
        }

        Ok(versions)
    }

    fn files(&self, version_id: u64) -> Result<Vec<File>> {
        let page = self.session.get(
            PATH_DEPLOY,
            &[(KEY_DO, "VERSION".to_string()), (KEY_ID, version_id.to_string())],
        )?;

        let files = self.entries(page, &self.rules.files, File::new)?;
        log_level_count(Level::File, files.len(), version_id);

        Ok(files)
    }

    /// Turn the accepted links of a page into deduplicated entries.
    ///
    /// A missing or non-HTML page yields no entries.
    fn entries<T, F>(&self, page: Option<Page>, rule: &LinkRule, build: F) -> Result<Vec<T>>
    where
        T: Node,
        F: Fn(Link, u64, FileDetails) -> T,
    {
        let Some(document) = page.and_then(Page::into_html) else {
            return Ok(Vec::new());
        };

        let with_details = T::LEVEL == Level::File;
        let entries = extract_links(&document, self.session.base_url(), rule, with_details)
            .into_iter()
            .map(|(link, details)| {
                let id = rule.id_of(&link)?;
                Ok(build(link, id, details))
            })
            .collect::<Result<Vec<T>>>()?;

        Ok(dedup_by_id(entries))
    }
}

fn log_level_count(level: Level, count: usize, parent_id: u64) {
    log::debug!("Found {count} {level} entries below {parent_id}");
}
