//! Rendered feed cache keyed by category.

use anyhow::Result;
use std::collections::HashMap;

/// Key used for the uncategorized feed.
pub const MAIN_FEED: &str = "main";

/// Lazily filled store of rendered feeds.
///
/// Owned by the caller and filled on first read. Entries stay until a post
/// write invalidates them; there is no eviction. A missing or empty category
/// addresses the main feed.
#[derive(Debug, Default, Clone)]
pub struct FeedCache {
    entries: HashMap<String, String>,
}

impl FeedCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached feed for a category.
    pub fn get(&self, category: Option<&str>) -> Option<&str> {
        self.entries.get(key(category)).map(String::as_str)
    }

    /// Returns the cached feed, generating and storing it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the generator's error. Nothing is cached in that case.
    pub fn get_or_insert_with<F>(&mut self, category: Option<&str>, generate: F) -> Result<&str>
    where
        F: FnOnce() -> Result<String>,
    {
        let key = key(category);
        if !self.entries.contains_key(key) {
            let feed = generate()?;
            tracing::debug!(category = key, bytes = feed.len(), "Cached feed");
            self.entries.insert(key.to_string(), feed);
        }

        Ok(self.entries.get(key).map(String::as_str).unwrap_or_default())
    }

    /// Stores a feed, replacing any previous entry.
    pub fn insert(&mut self, category: Option<&str>, feed: String) -> Option<String> {
        self.entries.insert(key(category).to_string(), feed)
    }

    /// Drops the entry for one category. Returns true when one was cached.
    pub fn invalidate(&mut self, category: Option<&str>) -> bool {
        let key = key(category);
        let removed = self.entries.remove(key).is_some();
        tracing::debug!(category = key, removed, "Invalidated feed");
        removed
    }

    /// Drops every entry.
    pub fn invalidate_all(&mut self) {
        tracing::debug!(entries = self.entries.len(), "Invalidated all feeds");
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn key(category: Option<&str>) -> &str {
    match category {
        Some(category) if !category.is_empty() => category,
        _ => MAIN_FEED,
    }
}
