// src/utils/fs.rs

//! File system utilities.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Write text to a file, replacing existing content.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    Ok(())
}

/// Write raw bytes to a file, replacing existing content.
pub fn write_bytes(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content)?;
    Ok(())
}

/// Ensure a directory exists.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}
