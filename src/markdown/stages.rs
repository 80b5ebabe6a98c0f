//! Extension stages applied between parsing and serialization.
//!
//! Each extension is a [`Stage`] registered into a fixed [`Pipeline`] when
//! the renderer is built. Block hooks see every block of the document tree in
//! document order, one stage at a time; inline hooks see each block's parsed
//! spans just before they are written.

use super::anchors::AnchorRegistry;
use super::inline::InlineParser;
use super::nodes::{AlertKind, Block, Inline, plain_text};
use crate::error::RenderError;
use crate::highlight::Highlighter;
use crate::options::RenderOptions;

/// Per-render state shared by block stages.
pub struct StageContext<'a> {
    pub anchors: AnchorRegistry,
    inline: &'a InlineParser,
}

impl<'a> StageContext<'a> {
    pub(crate) fn new(inline: &'a InlineParser) -> Self {
        Self {
            anchors: AnchorRegistry::new(),
            inline,
        }
    }

    /// Parses inline text with the renderer's inline options.
    pub fn parse_inline(&self, text: &str) -> Vec<Inline> {
        self.inline.parse(text)
    }
}

/// A pure document transformation.
pub trait Stage: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrites one block. Children are visited after their parent.
    fn transform_block(&self, _block: &mut Block, _ctx: &mut StageContext<'_>) -> Result<(), RenderError> {
        Ok(())
    }

    /// Rewrites the parsed spans of one block.
    fn transform_inline(&self, _spans: &mut Vec<Inline>) {}
}

/// Ordered list of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Builds the stage list for the enabled extensions.
    ///
    /// Order is fixed: task lists, alerts, heading anchors, highlighting,
    /// typographer.
    pub fn from_options(options: &RenderOptions) -> Self {
        let mut pipeline = Self::default();

        if options.task_lists {
            pipeline.push(TaskListStage);
        }
        if options.alert_blocks {
            pipeline.push(AlertStage);
        }
        if options.heading_anchors {
            pipeline.push(HeadingAnchorStage);
        }
        if !options.highlight_languages.is_empty() {
            pipeline.push(HighlightStage::new(Highlighter::new(&options.highlight_languages)));
        }
        if options.typographer {
            pipeline.push(TypographerStage);
        }

        pipeline
    }

    /// Appends a stage.
    pub fn push(&mut self, stage: impl Stage + 'static) {
        self.stages.push(Box::new(stage));
    }

    /// Stage names in run order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs every block hook over the tree.
    pub fn run_blocks(&self, blocks: &mut [Block], ctx: &mut StageContext<'_>) -> Result<(), RenderError> {
        for stage in &self.stages {
            tracing::trace!(stage = stage.name(), "Running block stage");
            walk_blocks(stage.as_ref(), blocks, ctx)?;
        }
        Ok(())
    }

    /// Runs every inline hook over a block's spans.
    pub fn run_inline(&self, spans: &mut Vec<Inline>) {
        for stage in &self.stages {
            stage.transform_inline(spans);
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

fn walk_blocks(stage: &dyn Stage, blocks: &mut [Block], ctx: &mut StageContext<'_>) -> Result<(), RenderError> {
    for block in blocks {
        stage.transform_block(block, ctx)?;
        match block {
            Block::Blockquote { children, .. } => walk_blocks(stage, children, ctx)?,
            Block::List { items, .. } => {
                for item in items {
                    walk_blocks(stage, &mut item.children, ctx)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Turns `[ ]`, `[x]` and `[X]` at the start of a list item into a task flag.
pub struct TaskListStage;

impl Stage for TaskListStage {
    fn name(&self) -> &'static str {
        "task-lists"
    }

    fn transform_block(&self, block: &mut Block, _ctx: &mut StageContext<'_>) -> Result<(), RenderError> {
        let Block::List { items, .. } = block else {
            return Ok(());
        };

        for item in items.iter_mut().filter(|item| item.task.is_none()) {
            let Some(Block::Paragraph { text }) = item.children.first_mut() else {
                continue;
            };
            let checked = match text.get(..3) {
                Some("[ ]") => false,
                Some("[x]" | "[X]") => true,
                _ => continue,
            };
            let rest = &text[3..];
            if !rest.is_empty() && !rest.starts_with([' ', '\t', '\n']) {
                continue;
            }

            *text = rest.trim_start_matches([' ', '\t']).to_string();
            item.task = Some(checked);
        }

        Ok(())
    }
}

/// Turns a blockquote whose first line is a `[!KIND]` marker into an alert.
pub struct AlertStage;

impl Stage for AlertStage {
    fn name(&self) -> &'static str {
        "alerts"
    }

    fn transform_block(&self, block: &mut Block, _ctx: &mut StageContext<'_>) -> Result<(), RenderError> {
        let Block::Blockquote { alert, children } = block else {
            return Ok(());
        };
        if alert.is_some() {
            return Ok(());
        }
        let Some(Block::Paragraph { text }) = children.first_mut() else {
            return Ok(());
        };

        let (marker, rest) = text.split_once('\n').unwrap_or((text.as_str(), ""));
        let Some(kind) = AlertKind::from_marker(marker.trim_end()) else {
            return Ok(());
        };

        let rest = rest.to_string();
        *alert = Some(kind);
        if rest.trim().is_empty() {
            children.remove(0);
        } else {
            *text = rest;
        }

        Ok(())
    }
}

/// Assigns collision-free anchor ids to headings.
pub struct HeadingAnchorStage;

impl Stage for HeadingAnchorStage {
    fn name(&self) -> &'static str {
        "heading-anchors"
    }

    fn transform_block(&self, block: &mut Block, ctx: &mut StageContext<'_>) -> Result<(), RenderError> {
        if let Block::Heading { text, anchor, .. } = block
            && anchor.is_none()
        {
            let plain = plain_text(&ctx.parse_inline(text));
            *anchor = Some(ctx.anchors.claim(&plain));
        }
        Ok(())
    }
}

/// Highlights fenced code whose language is registered.
///
/// Unknown languages keep plain escaped output. A grammar failure is logged
/// and falls back the same way, so highlighting never fails a render.
pub struct HighlightStage {
    highlighter: Highlighter,
}

impl HighlightStage {
    pub fn new(highlighter: Highlighter) -> Self {
        Self { highlighter }
    }
}

impl Stage for HighlightStage {
    fn name(&self) -> &'static str {
        "highlight"
    }

    fn transform_block(&self, block: &mut Block, _ctx: &mut StageContext<'_>) -> Result<(), RenderError> {
        let Block::FencedCode {
            language: Some(language),
            content,
            highlighted,
        } = block
        else {
            return Ok(());
        };

        if !self.highlighter.supports(language) {
            tracing::debug!(language = %language, "No registered grammar, leaving code unhighlighted");
            return Ok(());
        }

        *highlighted = highlighted_or_plain(self.highlighter.highlight(content, language));
        Ok(())
    }
}

/// Highlighted markup, or `None` to keep plain escaped code after a grammar failure.
fn highlighted_or_plain(result: Result<String, RenderError>) -> Option<String> {
    match result {
        Ok(html) => Some(html),
        Err(err) => {
            tracing::warn!(error = %err, "Highlighting failed, using plain code");
            None
        }
    }
}

/// Typographic replacements and smart quotes on text spans.
///
/// Code, URLs and raw HTML are never touched.
pub struct TypographerStage;

const REPLACEMENTS: &[(&str, &str)] = &[
    ("(c)", "\u{a9}"),
    ("(r)", "\u{ae}"),
    ("(tm)", "\u{2122}"),
    ("+-", "\u{b1}"),
    ("...", "\u{2026}"),
    ("---", "\u{2014}"),
    ("--", "\u{2013}"),
];

impl Stage for TypographerStage {
    fn name(&self) -> &'static str {
        "typographer"
    }

    fn transform_inline(&self, spans: &mut Vec<Inline>) {
        let mut prev = None;
        smarten(spans, &mut prev);
    }
}

fn smarten(spans: &mut [Inline], prev: &mut Option<char>) {
    for span in spans {
        match span {
            Inline::Text(text) => *text = typeset(text, prev),
            Inline::Code(code) => *prev = code.chars().last().or(*prev),
            Inline::Autolink { text, .. } => *prev = text.chars().last().or(*prev),
            Inline::Image { .. } => *prev = Some('x'),
            Inline::SoftBreak | Inline::HardBreak => *prev = Some(' '),
            Inline::Html(_) => {}
            Inline::Emphasis { children, .. } | Inline::Strikethrough(children) | Inline::Link { children, .. } => {
                smarten(children, prev)
            }
        }
    }
}

/// Applies replacements and curls quotes. `prev` carries the last character
/// written so quotes at span boundaries open and close correctly.
fn typeset(text: &str, prev: &mut Option<char>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    'scan: while let Some(c) = rest.chars().next() {
        for (pattern, replacement) in REPLACEMENTS {
            if rest
                .get(..pattern.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(pattern))
            {
                out.push_str(replacement);
                *prev = replacement.chars().last();
                rest = &rest[pattern.len()..];
                continue 'scan;
            }
        }

        let opening = prev.is_none_or(|p| p.is_whitespace() || "([{-\u{2013}\u{2014}".contains(p));
        let emitted = match c {
            '"' if opening => '\u{201c}',
            '"' => '\u{201d}',
            '\'' if opening => '\u{2018}',
            '\'' => '\u{2019}',
            other => other,
        };
        out.push(emitted);
        *prev = Some(emitted);
        rest = &rest[c.len_utf8()..];
    }

    out
}
