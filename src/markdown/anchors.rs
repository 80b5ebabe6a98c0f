//! Heading anchor ids.

use std::collections::{HashMap, HashSet};

use crate::slug::slugify;

/// Id used when a heading's text produces an empty slug.
const EMPTY_SLUG: &str = "section";

/// Collision-free anchor ids for a single document.
///
/// The first heading producing a slug gets the bare slug; later ones get
/// `-1`, `-2`, ... suffixes, skipping any suffixed id already taken by an
/// earlier heading (a literal `Intro 1` heading, for example). A fresh
/// registry is created for every render call.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    claimed: HashSet<String>,
    /// Next suffix to try per base slug.
    counters: HashMap<String, usize>,
}

impl AnchorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a unique anchor id for heading text.
    ///
    /// # Examples
    ///
    /// ```
    /// use blogmark::AnchorRegistry;
    ///
    /// let mut anchors = AnchorRegistry::new();
    /// assert_eq!(anchors.claim("Intro"), "intro");
    /// assert_eq!(anchors.claim("Intro"), "intro-1");
    /// assert_eq!(anchors.claim("Intro "), "intro-2");
    /// ```
    pub fn claim(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = EMPTY_SLUG.to_string();
        }

        if self.claimed.insert(base.clone()) {
            return base;
        }

        let next = self.counters.entry(base.clone()).or_insert(1);
        loop {
            let candidate = format!("{}-{}", base, next);
            *next += 1;
            if self.claimed.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Number of ids handed out so far.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Returns true when no id has been claimed.
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
