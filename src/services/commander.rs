// src/services/commander.rs

//! Portal client: a logged-in session together with its crawled catalog.

use std::path::Path;

use crate::error::Result;
use crate::models::{Catalog, DownloadRecord, FilterSet, PortalConfig};
use crate::services::crawler::HierarchyCrawler;
use crate::services::session::{Page, Session};
use crate::utils::fs;

/// Logged-in portal client holding the full (or a filtered) hierarchy.
///
/// The whole tree is crawled once in [`EbCommand::connect`]. Filtering
/// returns a new client sharing the session; exports and downloads work on
/// whatever tree the client holds.
#[derive(Debug, Clone)]
pub struct EbCommand {
    session: Session,
    catalog: Catalog,
}

impl EbCommand {
    /// Log in and crawl every project visible to `user`.
    pub fn connect(config: &PortalConfig, user: &str, password: &str) -> Result<Self> {
        let session = Session::new(config)?;

        log::info!("Logging in to {} as {user}", session.base_url());
        let projects = HierarchyCrawler::new(&session).crawl(user, password)?;

        let client = Self {
            session,
            catalog: Catalog::new(projects),
        };
        log::info!(
            "Crawled {} projects with {} files",
            client.catalog.projects().len(),
            client.catalog.files().len()
        );

        Ok(client)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Client restricted to the entries matched by `filters`.
    pub fn filter(&self, filters: &FilterSet) -> Self {
        Self {
            session: self.session.clone(),
            catalog: self.catalog.filter(filters),
        }
    }

    pub fn files(&self) -> Vec<DownloadRecord<'_>> {
        self.catalog.files()
    }

    pub fn to_json(&self) -> Result<String> {
        self.catalog.to_json()
    }

    pub fn to_yaml(&self) -> Result<String> {
        self.catalog.to_yaml()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        fs::write_text(path, &self.to_json()?)?;
        log::info!("Wrote JSON to {}", path.display());
        Ok(())
    }

    pub fn write_yaml(&self, path: &Path) -> Result<()> {
        fs::write_text(path, &self.to_yaml()?)?;
        log::info!("Wrote YAML to {}", path.display());
        Ok(())
    }

    /// Fetch every file again and store it in `output_dir`.
    ///
    /// Files whose content cannot be retrieved are skipped. Returns the
    /// number of files written.
    pub fn download(&self, output_dir: &Path, filename_only: bool) -> Result<usize> {
        let mut written = 0;

        for record in self.files() {
            let Some(content) = self.session.fetch(record.url()).and_then(Page::into_bytes)
            else {
                log::warn!("No content for {}, skipping", record.url());
                continue;
            };
            if content.is_empty() {
                log::warn!("Empty content for {}, skipping", record.url());
                continue;
            }

            let target = output_dir.join(record.file_name(filename_only));
            fs::write_bytes(&target, &content)?;
            log::info!("Downloaded {}", target.display());
            written += 1;
        }

        Ok(written)
    }
}
