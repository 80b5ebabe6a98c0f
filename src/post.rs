//! Post write path: everything derived from a title and markdown body.

use anyhow::{Context, Result, bail};

use crate::markdown::MarkdownRenderer;
use crate::slug::post_slug;

/// Content persisted for a post on create or update.
///
/// The markdown is rendered exactly once here. Readers are served `html`
/// as stored; it is never regenerated per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub slug: String,
    pub markdown: String,
    pub html: String,
}

impl PostContent {
    /// Builds post content, rendering the markdown.
    ///
    /// # Errors
    ///
    /// Returns error if the title is blank, produces an empty slug, or the
    /// renderer reports an internal failure. The post must not be saved in
    /// any of these cases.
    pub fn from_markdown(renderer: &MarkdownRenderer, title: &str, markdown: &str) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            bail!("Post title is empty");
        }

        let slug = post_slug(title);
        if slug.is_empty() {
            bail!("Post title has no characters usable in a slug: {:?}", title);
        }

        let html = renderer
            .render(markdown)
            .with_context(|| format!("Failed to render post: {}", title))?;

        tracing::debug!(slug = %slug, bytes = html.len(), "Rendered post");

        Ok(Self {
            title: title.to_string(),
            slug,
            markdown: markdown.to_string(),
            html,
        })
    }
}
