//! Markdown rendering entry point.

use super::block::{BlockOptions, parse_blocks};
use super::html::HtmlWriter;
use super::inline::{InlineOptions, InlineParser};
use super::nodes::Document;
use super::stages::{Pipeline, Stage, StageContext};
use crate::error::RenderError;
use crate::options::RenderOptions;

/// Renders markdown to HTML with GitHub Flavored Markdown extensions.
///
/// Built once with a fixed [`RenderOptions`] and shared across threads.
/// Every call is independent: anchor ids are tracked per call, so rendering
/// the same text always yields the same bytes.
///
/// # Examples
///
/// ```
/// use blogmark::MarkdownRenderer;
///
/// let renderer = MarkdownRenderer::new();
/// let html = renderer.render("This is **bold** text.").unwrap();
/// assert_eq!(html, "<p>This is <strong>bold</strong> text.</p>\n");
/// ```
#[derive(Debug)]
pub struct MarkdownRenderer {
    options: RenderOptions,
    inline: InlineParser,
    pipeline: Pipeline,
}

impl MarkdownRenderer {
    /// Creates a renderer with every extension enabled.
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Creates a renderer for the given configuration.
    ///
    /// Highlight grammars for the registered languages are loaded here, so
    /// construction is the expensive part; rendering reuses them.
    pub fn with_options(options: RenderOptions) -> Self {
        let inline = InlineParser::new(InlineOptions {
            strikethrough: options.strikethrough,
            image_sizing: options.image_sizing,
            autolinks: options.autolinks,
            raw_html: options.raw_html,
            hard_breaks: options.hard_breaks,
        });
        let pipeline = Pipeline::from_options(&options);
        tracing::debug!(stages = ?pipeline, "Built markdown renderer");

        Self {
            options,
            inline,
            pipeline,
        }
    }

    /// Appends a stage after the built-in extensions.
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.pipeline.push(stage);
        self
    }

    /// Configuration this renderer was built with.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders markdown content to an HTML fragment.
    ///
    /// Empty input yields an empty string. Malformed markdown never fails;
    /// it falls back to literal text.
    ///
    /// # Errors
    ///
    /// Returns an error only when an internal invariant is violated, in
    /// which case no partial output is produced.
    pub fn render(&self, content: &str) -> Result<String, RenderError> {
        if content.is_empty() {
            return Ok(String::new());
        }
        let document = self.parse(content)?;
        self.render_document(&document)
    }

    /// Renders optional content, treating `None` as empty input.
    pub fn render_opt(&self, content: Option<&str>) -> Result<String, RenderError> {
        match content {
            Some(content) => self.render(content),
            None => Ok(String::new()),
        }
    }

    /// Parses content into a document and applies the block stages.
    ///
    /// The returned document carries heading anchors, task flags, alert
    /// kinds and highlighted code, ready for [`render_document`].
    ///
    /// [`render_document`]: MarkdownRenderer::render_document
    pub fn parse(&self, content: &str) -> Result<Document, RenderError> {
        let mut document = Document {
            blocks: parse_blocks(
                content,
                BlockOptions {
                    tables: self.options.tables,
                    raw_html: self.options.raw_html,
                },
            ),
        };

        let mut ctx = StageContext::new(&self.inline);
        self.pipeline.run_blocks(&mut document.blocks, &mut ctx)?;
        tracing::trace!(
            blocks = document.blocks.len(),
            anchors = ctx.anchors.len(),
            "Parsed markdown document"
        );

        Ok(document)
    }

    /// Serializes a parsed document to HTML.
    ///
    /// # Errors
    ///
    /// Fails on trees the parser cannot produce: heading levels outside
    /// 1 to 6, headings without anchors while anchors are enabled, table
    /// rows whose width differs from the alignment row, or nesting past
    /// the depth limits.
    pub fn render_document(&self, document: &Document) -> Result<String, RenderError> {
        HtmlWriter::new(&self.options, &self.inline, &self.pipeline).write_document(document)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
