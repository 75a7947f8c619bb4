//! Pipeline entry points.
//!
//! - `run_jobs`: Run configured filter/export/download jobs in order

pub mod jobs;

pub use jobs::{run_job, run_jobs};
