//! Rendering error types.
//!
//! Malformed markdown never produces an error: the parsers fall back to
//! literal text. Errors here mean the document tree handed to the serializer
//! broke an invariant the parser guarantees.

/// Fatal rendering error.
///
/// Callers treat rendering as all-or-nothing: on error no HTML is produced
/// and the post must not be persisted.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Heading level outside `1..=6`.
    #[error("Invalid heading level: {0}")]
    InvalidHeadingLevel(u8),

    /// Heading anchors are enabled but a heading reached the serializer without an id.
    #[error("Heading has no anchor id: {0:?}")]
    MissingAnchor(String),

    /// Table rows disagree with the column alignment count.
    #[error("Malformed table: expected {expected} columns, found {found}")]
    MalformedTable { expected: usize, found: usize },

    /// Block tree nested deeper than the parser ever produces.
    #[error("Block nesting exceeds limit of {0}")]
    NestingTooDeep(usize),

    /// Syntax highlighting failed for a registered language.
    ///
    /// Returned by [`Highlighter::highlight`](crate::Highlighter::highlight).
    /// The rendering pipeline logs it and keeps the block as plain escaped
    /// code, so it never fails a render.
    #[error("Failed to highlight {language} code block: {message}")]
    Highlight { language: String, message: String },

    /// Writing into the output buffer failed.
    #[error("Failed to write HTML: {0}")]
    Format(#[from] std::fmt::Error),
}
