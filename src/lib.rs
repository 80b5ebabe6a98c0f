//! Markdown to HTML rendering for a blogging platform.
//!
//! Post bodies are rendered once when written and served as stored, so
//! output is deterministic and safe to embed without further escaping.

use std::sync::LazyLock;

mod cache;
mod config;
mod error;
mod highlight;
pub mod markdown;
mod options;
mod post;
pub mod preview;
mod slug;

pub use cache::{FeedCache, MAIN_FEED};
pub use config::Config;
pub use error::RenderError;
pub use highlight::Highlighter;
pub use markdown::{AnchorRegistry, Block, Document, Inline, MarkdownRenderer};
pub use options::{DEFAULT_HIGHLIGHT_LANGUAGES, RenderOptions};
pub use post::PostContent;
pub use slug::{post_slug, slugify};

/// Renderer with the default configuration, built on first use.
static DEFAULT_RENDERER: LazyLock<MarkdownRenderer> = LazyLock::new(MarkdownRenderer::new);

/// Renders markdown with every extension enabled.
///
/// # Examples
///
/// ```
/// let html = blogmark::render("**bold**").unwrap();
/// assert_eq!(html, "<p><strong>bold</strong></p>\n");
/// assert_eq!(blogmark::render("").unwrap(), "");
/// ```
///
/// # Errors
///
/// Returns an error only on an internal invariant violation.
pub fn render(markdown: &str) -> Result<String, RenderError> {
    DEFAULT_RENDERER.render(markdown)
}
