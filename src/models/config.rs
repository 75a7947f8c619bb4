//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::FilterSet;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Portal connection settings
    #[serde(default)]
    pub portal: PortalConfig,

    /// Filter/export/download jobs, run in order
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// Accepted shapes of a configuration file.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    // Tried first: a sequence would otherwise deserialize as a `Config` tuple
    Jobs(Vec<Job>),
    Full(Config),
}

impl From<ConfigFile> for Config {
    fn from(file: ConfigFile) -> Self {
        match file {
            ConfigFile::Full(config) => config,
            ConfigFile::Jobs(jobs) => Config {
                jobs,
                ..Config::default()
            },
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, or YAML for `.yaml`/`.yml`.
    ///
    /// YAML files may also be a bare list of jobs.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            let file: ConfigFile = serde_yaml::from_str(&content)?;
            Ok(file.into())
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.portal.validate()?;
        for job in &self.jobs {
            job.filters()?;
        }
        Ok(())
    }
}

/// Portal connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Directory URL holding `login.pl`, `deploy.pl` and `attachment.pl`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Skip TLS certificate verification (the portal's certificate is not trusted)
    #[serde(default = "defaults::accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    /// Proxy for plain HTTP requests
    #[serde(default)]
    pub proxy_http: Option<String>,

    /// Proxy for HTTPS requests
    #[serde(default)]
    pub proxy_https: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            accept_invalid_certs: defaults::accept_invalid_certs(),
            proxy_http: None,
            proxy_https: None,
        }
    }
}

impl PortalConfig {
    /// Parsed base URL.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.base_url()?;
        if !base.path().ends_with('/') {
            return Err(AppError::config(format!(
                "portal.base_url must end with '/': {}",
                self.base_url
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(AppError::config("portal.user_agent is empty"));
        }
        for proxy in [&self.proxy_http, &self.proxy_https].into_iter().flatten() {
            Url::parse(proxy)?;
        }
        Ok(())
    }
}

/// One filter/export/download job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Job {
    #[serde(default)]
    pub filter_projects: Option<String>,

    #[serde(default)]
    pub filter_distributions: Option<String>,

    #[serde(default)]
    pub filter_versions: Option<String>,

    #[serde(default)]
    pub filter_files: Option<String>,

    /// Write the filtered hierarchy as JSON to this file
    #[serde(default)]
    pub json: Option<PathBuf>,

    /// Write the filtered hierarchy as YAML to this file
    #[serde(default)]
    pub yaml: Option<PathBuf>,

    /// Download the filtered files
    #[serde(default)]
    pub download: Option<DownloadJob>,
}

impl Job {
    /// Compile the job's patterns.
    pub fn filters(&self) -> Result<FilterSet> {
        FilterSet::new(
            self.filter_projects.as_deref(),
            self.filter_distributions.as_deref(),
            self.filter_versions.as_deref(),
            self.filter_files.as_deref(),
        )
    }
}

/// Download target of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DownloadJob {
    /// Output directory
    pub path: PathBuf,

    /// Name files by their own description only
    #[serde(default)]
    pub filename_only: bool,

    /// Create the output directory if it is missing
    #[serde(default)]
    pub mkdir: bool,
}

mod defaults {
    pub fn base_url() -> String {
        "https://command.elektrobit.com/command/mod_perl/".into()
    }
    pub fn user_agent() -> String {
        concat!("ebcommander/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn accept_invalid_certs() -> bool {
        true
    }
}
