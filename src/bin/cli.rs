//! EB command portal CLI
//!
//! Crawls the portal once, then exports and/or downloads what the filters
//! select.

use std::path::PathBuf;

use clap::Parser;
use ebcommander::{
    error::Result,
    models::{Config, DownloadJob, Job},
    pipeline,
    services::EbCommand,
};

/// ebcommander - EB command portal client
#[derive(Parser, Debug)]
#[command(
    name = "ebcommander",
    version,
    about = "Crawl the EB command portal and export or download its files"
)]
struct Cli {
    /// Portal user name
    #[arg(short, long)]
    user: String,

    /// Portal password
    #[arg(short, long)]
    password: String,

    /// Proxy for HTTP requests
    #[arg(long)]
    proxy_http: Option<String>,

    /// Proxy for HTTPS requests
    #[arg(long)]
    proxy_https: Option<String>,

    /// Portal directory URL (default: the public portal)
    #[arg(long)]
    base_url: Option<String>,

    /// Write the hierarchy as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the hierarchy as YAML to this file
    #[arg(long)]
    yaml: Option<PathBuf>,

    /// Regex selecting files by name (matched from the start)
    #[arg(short, long)]
    filter: Option<String>,

    /// Download the selected files into this existing directory
    #[arg(short, long)]
    download: Option<PathBuf>,

    /// Job file (TOML, or YAML for .yaml/.yml); takes priority over the
    /// filter/export/download flags
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Single job built from the filter/export/download flags.
    fn flag_job(&self) -> Job {
        Job {
            filter_files: self.filter.clone(),
            json: self.json.clone(),
            yaml: self.yaml.clone(),
            download: self.download.clone().map(|path| DownloadJob {
                path,
                filename_only: false,
                mkdir: false,
            }),
            ..Job::default()
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            log::info!(
                "Loaded {} jobs from {}",
                config.jobs.len(),
                path.display()
            );
            config
        }
        None => Config {
            jobs: vec![cli.flag_job()],
            ..Config::default()
        },
    };

    if let Some(base_url) = &cli.base_url {
        config.portal.base_url = base_url.clone();
    }
    if cli.proxy_http.is_some() {
        config.portal.proxy_http = cli.proxy_http.clone();
    }
    if cli.proxy_https.is_some() {
        config.portal.proxy_https = cli.proxy_https.clone();
    }

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {e}");
        return Err(e);
    }

    let client = EbCommand::connect(&config.portal, &cli.user, &cli.password)?;
    let downloaded = pipeline::run_jobs(&client, &config.jobs)?;

    log::info!("Done! {downloaded} files downloaded");

    Ok(())
}
