//! Shared test utilities for integration tests.
//!
//! Provides helpers for writing markdown fixtures into temporary
//! directories and for pulling attributes out of rendered HTML.

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Writes a markdown file into a fresh temporary directory.
///
/// # Returns
///
/// The directory guard and the path of the written file
///
/// # Errors
///
/// Returns error if the directory or file cannot be created
pub fn write_markdown(name: &str, content: &str) -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok((dir, path))
}

/// Collects every `id="..."` value in document order.
pub fn ids(html: &str) -> Vec<String> {
    html.split("id=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(String::from)
        .collect()
}

/// Counts occurrences of `needle` in `html`.
pub fn count(html: &str, needle: &str) -> usize {
    html.matches(needle).count()
}
