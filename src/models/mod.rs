// src/models/mod.rs

//! Domain models for the portal client.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod catalog;
mod config;
mod entry;
mod link;
mod pattern;
mod size;

// Re-export all public types
pub use catalog::{Catalog, DownloadRecord, sanitize_component};
pub use config::{Config, DownloadJob, Job, PortalConfig};
pub use entry::{
    Distribution, Entry, File, Level, Node, ParentLevel, Project, UPLOAD_TIME_FORMAT, Version,
    dedup_by_id,
};
pub use link::{FileDetails, Link, parse_upload_time};
pub use pattern::{FilterSet, MATCH_ANY, Pattern};
pub use size::{Size, SizeUnit};
