// src/pipeline/jobs.rs

//! Filter/export/download jobs against one crawled hierarchy.

use crate::error::Result;
use crate::models::{DownloadJob, Job};
use crate::services::EbCommand;
use crate::utils::fs;

/// Run `jobs` in order. Every job filters the full hierarchy independently.
///
/// Returns the total number of downloaded files.
pub fn run_jobs(client: &EbCommand, jobs: &[Job]) -> Result<usize> {
    let mut downloaded = 0;

    for (index, job) in jobs.iter().enumerate() {
        log::info!("Running job {}/{}", index + 1, jobs.len());
        downloaded += run_job(client, job)?;
    }

    Ok(downloaded)
}

/// Filter, then download, then write JSON and YAML as configured.
pub fn run_job(client: &EbCommand, job: &Job) -> Result<usize> {
    let filtered = client.filter(&job.filters()?);
    log::info!("{} files match", filtered.files().len());

    let downloaded = match &job.download {
        Some(download) => run_download(&filtered, download)?,
        None => 0,
    };

    if let Some(path) = &job.json {
        filtered.write_json(path)?;
    }
    if let Some(path) = &job.yaml {
        filtered.write_yaml(path)?;
    }

    Ok(downloaded)
}

fn run_download(client: &EbCommand, download: &DownloadJob) -> Result<usize> {
    if download.mkdir && !download.path.exists() {
        fs::ensure_dir(&download.path)?;
    }

    if !download.path.is_dir() {
        log::warn!(
            "Download directory {} does not exist, skipping download",
            download.path.display()
        );
        return Ok(0);
    }

    let count = client.download(&download.path, download.filename_only)?;
    log::info!("Downloaded {count} files to {}", download.path.display());
    Ok(count)
}
