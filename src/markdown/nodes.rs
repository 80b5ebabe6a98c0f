//! Document tree produced by the block and inline parsers.
//!
//! Leaf blocks keep their inline source as raw text. Inline spans are parsed
//! from it when the block is serialized, after the block stages have had a
//! chance to rewrite the tree (task markers and alert declarators are plain
//! text until then).

/// A parsed markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// Block level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// ATX heading. `anchor` is filled by the heading anchor stage.
    Heading {
        level: u8,
        text: String,
        anchor: Option<String>,
    },
    Paragraph {
        text: String,
    },
    /// Fenced code. `highlighted` holds token markup from the highlight stage.
    FencedCode {
        language: Option<String>,
        content: String,
        highlighted: Option<String>,
    },
    Blockquote {
        alert: Option<AlertKind>,
        children: Vec<Block>,
    },
    List {
        kind: ListKind,
        tight: bool,
        items: Vec<ListItem>,
    },
    Table {
        header: Vec<String>,
        alignments: Vec<Alignment>,
        rows: Vec<Vec<String>>,
    },
    ThematicBreak,
    /// Trusted raw HTML, emitted verbatim.
    Html {
        raw: String,
    },
}

/// List flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered { start: u64 },
}

/// One list item and its nested blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListItem {
    /// `Some(checked)` for task items.
    pub task: Option<bool>,
    pub children: Vec<Block>,
}

/// Alert blockquote kind, declared by a `[!KIND]` marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    /// Parses an exact, case-sensitive `[!KIND]` marker.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "[!NOTE]" => Some(AlertKind::Note),
            "[!TIP]" => Some(AlertKind::Tip),
            "[!IMPORTANT]" => Some(AlertKind::Important),
            "[!WARNING]" => Some(AlertKind::Warning),
            "[!CAUTION]" => Some(AlertKind::Caution),
            _ => None,
        }
    }

    /// Lowercase name used in CSS classes.
    pub fn name(&self) -> &'static str {
        match self {
            AlertKind::Note => "note",
            AlertKind::Tip => "tip",
            AlertKind::Important => "important",
            AlertKind::Warning => "warning",
            AlertKind::Caution => "caution",
        }
    }

    /// Display title.
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::Note => "Note",
            AlertKind::Tip => "Tip",
            AlertKind::Important => "Important",
            AlertKind::Warning => "Warning",
            AlertKind::Caution => "Caution",
        }
    }
}

/// Table column alignment from the separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl Alignment {
    /// CSS `text-align` value, if any.
    pub fn css(&self) -> Option<&'static str> {
        match self {
            Alignment::None => None,
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
        }
    }
}

/// Emphasis flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Italic,
    Bold,
    BoldItalic,
}

/// Explicit image dimensions from a size suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// `=WxH`, either side may be omitted.
    Pixels {
        width: Option<u32>,
        height: Option<u32>,
    },
    /// `=W%`.
    Percent(u32),
}

/// Inline span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Emphasis {
        style: Emphasis,
        children: Vec<Inline>,
    },
    Strikethrough(Vec<Inline>),
    Code(String),
    Link {
        href: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    /// Detected URL; `href` may differ from `text` (`www.` hosts gain a scheme).
    Autolink {
        href: String,
        text: String,
    },
    Image {
        src: String,
        alt: String,
        title: Option<String>,
        size: Option<ImageSize>,
    },
    /// Trusted raw HTML tag or comment.
    Html(String),
    SoftBreak,
    HardBreak,
}

impl Inline {
    /// Child spans for container variants.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Inline>> {
        match self {
            Inline::Emphasis { children, .. }
            | Inline::Strikethrough(children)
            | Inline::Link { children, .. } => Some(children),
            _ => None,
        }
    }
}

/// Concatenates the plain text of spans, as used for alt text and anchors.
pub fn plain_text(spans: &[Inline]) -> String {
    let mut out = String::new();
    collect_text(spans, &mut out);
    out
}

fn collect_text(spans: &[Inline], out: &mut String) {
    for span in spans {
        match span {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Autolink { text, .. } => out.push_str(text),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::Emphasis { children, .. }
            | Inline::Strikethrough(children)
            | Inline::Link { children, .. } => collect_text(children, out),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::Html(_) => {}
        }
    }
}
