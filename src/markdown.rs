//! Markdown rendering with GitHub Flavored Markdown support.
//!
//! Parsing happens in two passes: the block parser builds the document tree
//! with raw inline text in its leaves, then each leaf's text is parsed into
//! spans while the tree is written out. Extensions (task lists, alerts,
//! heading anchors, highlighting, typographer) run as stages in between.

mod anchors;
mod block;
mod escape;
mod html;
mod inline;
mod nodes;
mod renderer;
mod stages;

pub use anchors::AnchorRegistry;
pub use block::MAX_NESTING;
pub use escape::{escape_html, escape_text};
pub use inline::MAX_INLINE_DEPTH;
pub use nodes::{
    AlertKind, Alignment, Block, Document, Emphasis, ImageSize, Inline, ListItem, ListKind, plain_text,
};
pub use renderer::MarkdownRenderer;
pub use stages::{
    AlertStage, HeadingAnchorStage, HighlightStage, Pipeline, Stage, StageContext, TaskListStage,
    TypographerStage,
};
