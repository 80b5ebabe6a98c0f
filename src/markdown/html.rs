//! HTML serialization of the document tree.
//!
//! Output follows GitHub's markup conventions so existing stylesheets for
//! rendered READMEs apply: `markdown-alert` containers, `task-list-item`
//! checkboxes, `anchor` links on headings and `hljs` code classes.

use std::fmt::Write;

use super::block::MAX_NESTING;
use super::escape::{escape_html, escape_text};
use super::inline::{InlineParser, MAX_INLINE_DEPTH};
use super::nodes::{Alignment, Block, Document, Emphasis, ImageSize, Inline, ListItem, ListKind};
use super::stages::Pipeline;
use crate::error::RenderError;
use crate::options::RenderOptions;

/// Writes a document as an HTML fragment.
pub(crate) struct HtmlWriter<'a> {
    options: &'a RenderOptions,
    inline: &'a InlineParser,
    pipeline: &'a Pipeline,
    out: String,
}

impl<'a> HtmlWriter<'a> {
    pub(crate) fn new(options: &'a RenderOptions, inline: &'a InlineParser, pipeline: &'a Pipeline) -> Self {
        Self {
            options,
            inline,
            pipeline,
            out: String::new(),
        }
    }

    /// Serializes the document, failing on any tree that the parser and
    /// stages could not have produced.
    pub(crate) fn write_document(mut self, document: &Document) -> Result<String, RenderError> {
        self.blocks(&document.blocks, 0)?;
        Ok(self.out)
    }

    fn blocks(&mut self, blocks: &[Block], depth: usize) -> Result<(), RenderError> {
        if depth > MAX_NESTING + 1 {
            return Err(RenderError::NestingTooDeep(depth));
        }
        for block in blocks {
            self.block(block, depth)?;
        }
        Ok(())
    }

    fn block(&mut self, block: &Block, depth: usize) -> Result<(), RenderError> {
        match block {
            Block::Heading { level, text, anchor } => self.heading(*level, text, anchor.as_deref())?,
            Block::Paragraph { text } => self.paragraph(text, false, None)?,
            Block::FencedCode {
                language,
                content,
                highlighted,
            } => {
                self.out.push_str("<pre><code");
                match (language, highlighted) {
                    (Some(language), Some(_)) => {
                        write!(self.out, " class=\"hljs language-{}\"", escape_html(language))?
                    }
                    (Some(language), None) => write!(self.out, " class=\"language-{}\"", escape_html(language))?,
                    (None, _) => {}
                }
                self.out.push('>');
                match highlighted {
                    Some(html) => self.out.push_str(html),
                    None => self.out.push_str(&escape_html(content)),
                }
                self.out.push_str("</code></pre>\n");
            }
            Block::Blockquote {
                alert: Some(kind),
                children,
            } => {
                writeln!(self.out, "<div class=\"markdown-alert markdown-alert-{}\">", kind.name())?;
                writeln!(self.out, "<p class=\"markdown-alert-title\">{}</p>", kind.title())?;
                self.blocks(children, depth + 1)?;
                self.out.push_str("</div>\n");
            }
            Block::Blockquote { alert: None, children } => {
                self.out.push_str("<blockquote>\n");
                self.blocks(children, depth + 1)?;
                self.out.push_str("</blockquote>\n");
            }
            Block::List { kind, tight, items } => self.list(*kind, *tight, items, depth)?,
            Block::Table {
                header,
                alignments,
                rows,
            } => self.table(header, alignments, rows)?,
            Block::ThematicBreak => self.out.push_str("<hr>\n"),
            Block::Html { raw } if self.options.raw_html => {
                self.out.push_str(raw);
                if !raw.ends_with('\n') {
                    self.out.push('\n');
                }
            }
            Block::Html { raw } => writeln!(self.out, "<p>{}</p>", escape_html(raw.trim_end()))?,
        }
        Ok(())
    }

    fn heading(&mut self, level: u8, text: &str, anchor: Option<&str>) -> Result<(), RenderError> {
        if !(1..=6).contains(&level) {
            return Err(RenderError::InvalidHeadingLevel(level));
        }
        if anchor.is_none() && self.options.heading_anchors {
            return Err(RenderError::MissingAnchor(text.to_string()));
        }

        match anchor {
            Some(id) => {
                let id = escape_html(id);
                write!(self.out, "<h{} id=\"{}\">", level, id)?;
                if self.options.heading_link_icons {
                    write!(
                        self.out,
                        "<a class=\"anchor\" aria-hidden=\"true\" href=\"#{}\"><span class=\"octicon octicon-link\"></span></a>",
                        id
                    )?;
                }
            }
            None => write!(self.out, "<h{}>", level)?,
        }
        self.inline_text(text)?;
        writeln!(self.out, "</h{}>", level)?;
        Ok(())
    }

    /// Writes a paragraph, bare when it sits in a tight list item.
    fn paragraph(&mut self, text: &str, tight: bool, checkbox: Option<bool>) -> Result<(), RenderError> {
        if !tight {
            self.out.push_str("<p>");
        }
        if let Some(checked) = checkbox {
            self.checkbox(checked);
        }
        self.inline_text(text)?;
        if !tight {
            self.out.push_str("</p>\n");
        }
        Ok(())
    }

    fn checkbox(&mut self, checked: bool) {
        self.out
            .push_str("<input class=\"task-list-item-checkbox\" type=\"checkbox\" disabled");
        if checked {
            self.out.push_str(" checked");
        }
        self.out.push_str("> ");
    }

    fn list(&mut self, kind: ListKind, tight: bool, items: &[ListItem], depth: usize) -> Result<(), RenderError> {
        let tag = match kind {
            ListKind::Unordered => "ul",
            ListKind::Ordered { .. } => "ol",
        };
        write!(self.out, "<{}", tag)?;
        if let ListKind::Ordered { start } = kind
            && start != 1
        {
            write!(self.out, " start=\"{}\"", start)?;
        }
        if items.iter().any(|item| item.task.is_some()) {
            self.out.push_str(" class=\"contains-task-list\"");
        }
        self.out.push_str(">\n");

        for item in items {
            self.list_item(item, tight, depth)?;
        }

        writeln!(self.out, "</{}>", tag)?;
        Ok(())
    }

    fn list_item(&mut self, item: &ListItem, tight: bool, depth: usize) -> Result<(), RenderError> {
        if item.task.is_some() {
            self.out.push_str("<li class=\"task-list-item\">");
        } else {
            self.out.push_str("<li>");
        }

        let mut checkbox = item.task;
        if !matches!(item.children.first(), Some(Block::Paragraph { .. }))
            && let Some(checked) = checkbox.take()
        {
            self.checkbox(checked);
        }

        let count = item.children.len();
        for (idx, child) in item.children.iter().enumerate() {
            match child {
                Block::Paragraph { text } if tight => {
                    self.paragraph(text, true, checkbox.take())?;
                    if idx + 1 < count {
                        self.out.push('\n');
                    }
                }
                Block::Paragraph { text } => {
                    self.break_line();
                    self.paragraph(text, false, checkbox.take())?;
                }
                other => {
                    self.break_line();
                    self.blocks(std::slice::from_ref(other), depth + 1)?;
                }
            }
        }

        self.out.push_str("</li>\n");
        Ok(())
    }

    fn break_line(&mut self) {
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn table(&mut self, header: &[String], alignments: &[Alignment], rows: &[Vec<String>]) -> Result<(), RenderError> {
        check_row(alignments, header)?;

        self.out.push_str("<table>\n<thead>\n<tr>\n");
        for (cell, alignment) in header.iter().zip(alignments) {
            self.cell("th", cell, *alignment)?;
        }
        self.out.push_str("</tr>\n</thead>\n");

        if !rows.is_empty() {
            self.out.push_str("<tbody>\n");
            for row in rows {
                check_row(alignments, row)?;
                self.out.push_str("<tr>\n");
                for (cell, alignment) in row.iter().zip(alignments) {
                    self.cell("td", cell, *alignment)?;
                }
                self.out.push_str("</tr>\n");
            }
            self.out.push_str("</tbody>\n");
        }

        self.out.push_str("</table>\n");
        Ok(())
    }

    fn cell(&mut self, tag: &str, text: &str, alignment: Alignment) -> Result<(), RenderError> {
        match alignment.css() {
            Some(align) => write!(self.out, "<{} style=\"text-align:{}\">", tag, align)?,
            None => write!(self.out, "<{}>", tag)?,
        }
        self.inline_text(text)?;
        writeln!(self.out, "</{}>", tag)?;
        Ok(())
    }

    fn inline_text(&mut self, text: &str) -> Result<(), RenderError> {
        let mut spans = self.inline.parse(text);
        self.pipeline.run_inline(&mut spans);
        self.spans(&spans, 0)
    }

    fn spans(&mut self, spans: &[Inline], depth: usize) -> Result<(), RenderError> {
        if depth > MAX_INLINE_DEPTH + 1 {
            return Err(RenderError::NestingTooDeep(depth));
        }

        for span in spans {
            match span {
                Inline::Text(text) => self.out.push_str(&escape_text(text)),
                Inline::Emphasis { style, children } => {
                    let (open, close) = match style {
                        Emphasis::Italic => ("<em>", "</em>"),
                        Emphasis::Bold => ("<strong>", "</strong>"),
                        Emphasis::BoldItalic => ("<em><strong>", "</strong></em>"),
                    };
                    self.out.push_str(open);
                    self.spans(children, depth + 1)?;
                    self.out.push_str(close);
                }
                Inline::Strikethrough(children) => {
                    self.out.push_str("<s>");
                    self.spans(children, depth + 1)?;
                    self.out.push_str("</s>");
                }
                Inline::Code(code) => write!(self.out, "<code>{}</code>", escape_html(code))?,
                Inline::Link { href, title, children } => {
                    write!(self.out, "<a href=\"{}\"", escape_html(href))?;
                    if let Some(title) = title {
                        write!(self.out, " title=\"{}\"", escape_html(title))?;
                    }
                    self.out.push('>');
                    self.spans(children, depth + 1)?;
                    self.out.push_str("</a>");
                }
                Inline::Autolink { href, text } => {
                    write!(self.out, "<a href=\"{}\">{}</a>", escape_html(href), escape_text(text))?
                }
                Inline::Image { src, alt, title, size } => {
                    write!(self.out, "<img src=\"{}\" alt=\"{}\"", escape_html(src), escape_html(alt))?;
                    if let Some(title) = title {
                        write!(self.out, " title=\"{}\"", escape_html(title))?;
                    }
                    match size {
                        Some(ImageSize::Pixels { width, height }) => {
                            if let Some(width) = width {
                                write!(self.out, " width=\"{}\"", width)?;
                            }
                            if let Some(height) = height {
                                write!(self.out, " height=\"{}\"", height)?;
                            }
                        }
                        Some(ImageSize::Percent(percent)) => write!(self.out, " style=\"width:{}%\"", percent)?,
                        None => {}
                    }
                    self.out.push('>');
                }
                Inline::Html(raw) if self.options.raw_html => self.out.push_str(raw),
                Inline::Html(raw) => self.out.push_str(&escape_html(raw)),
                Inline::SoftBreak => self.out.push('\n'),
                Inline::HardBreak => self.out.push_str("<br>\n"),
            }
        }
        Ok(())
    }
}

fn check_row(alignments: &[Alignment], cells: &[String]) -> Result<(), RenderError> {
    if cells.len() != alignments.len() {
        return Err(RenderError::MalformedTable {
            expected: alignments.len(),
            found: cells.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::inline::InlineOptions;
    use crate::markdown::nodes::AlertKind;
    use pretty_assertions::assert_eq;

    fn write(options: &RenderOptions, blocks: Vec<Block>) -> Result<String, RenderError> {
        let inline = InlineParser::new(InlineOptions {
            strikethrough: options.strikethrough,
            image_sizing: options.image_sizing,
            autolinks: options.autolinks,
            raw_html: options.raw_html,
            hard_breaks: options.hard_breaks,
        });
        let pipeline = Pipeline::default();
        HtmlWriter::new(options, &inline, &pipeline).write_document(&Document { blocks })
    }

    fn plain() -> RenderOptions {
        RenderOptions {
            heading_anchors: false,
            ..RenderOptions::minimal()
        }
    }

    fn paragraph(text: &str) -> Block {
        Block::Paragraph { text: text.to_string() }
    }

    #[test]
    fn test_heading_with_anchor_and_icon() {
        // Arrange
        let options = RenderOptions::default();
        let blocks = vec![Block::Heading {
            level: 2,
            text: "Intro".to_string(),
            anchor: Some("intro".to_string()),
        }];

        // Act
        let html = write(&options, blocks).expect("Should write heading");

        // Assert
        assert_eq!(
            html,
            "<h2 id=\"intro\"><a class=\"anchor\" aria-hidden=\"true\" href=\"#intro\"><span class=\"octicon octicon-link\"></span></a>Intro</h2>\n"
        );
    }

    #[test]
    fn test_invalid_heading_level_is_fatal() {
        // Arrange
        let blocks = vec![Block::Heading {
            level: 7,
            text: "Too deep".to_string(),
            anchor: None,
        }];

        // Act
        let result = write(&plain(), blocks);

        // Assert
        assert!(matches!(result, Err(RenderError::InvalidHeadingLevel(7))));
    }

    #[test]
    fn test_missing_anchor_is_fatal_when_anchors_enabled() {
        // Arrange
        let options = RenderOptions {
            heading_anchors: true,
            ..RenderOptions::minimal()
        };
        let blocks = vec![Block::Heading {
            level: 1,
            text: "Title".to_string(),
            anchor: None,
        }];

        // Act
        let result = write(&options, blocks);

        // Assert
        assert!(matches!(result, Err(RenderError::MissingAnchor(text)) if text == "Title"));
    }

    #[test]
    fn test_table_row_width_mismatch_is_fatal() {
        // Arrange
        let blocks = vec![Block::Table {
            header: vec!["a".to_string(), "b".to_string()],
            alignments: vec![Alignment::None, Alignment::None],
            rows: vec![vec!["1".to_string()]],
        }];

        // Act
        let result = write(&plain(), blocks);

        // Assert
        assert!(matches!(
            result,
            Err(RenderError::MalformedTable { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn test_table_alignment_styles() {
        // Arrange
        let blocks = vec![Block::Table {
            header: vec!["L".to_string(), "C".to_string(), "N".to_string()],
            alignments: vec![Alignment::Left, Alignment::Center, Alignment::None],
            rows: vec![vec!["1".to_string(), "2".to_string(), "3".to_string()]],
        }];

        // Act
        let html = write(&plain(), blocks).expect("Should write table");

        // Assert
        assert_eq!(
            html,
            "<table>\n<thead>\n<tr>\n<th style=\"text-align:left\">L</th>\n<th style=\"text-align:center\">C</th>\n<th>N</th>\n</tr>\n</thead>\n<tbody>\n<tr>\n<td style=\"text-align:left\">1</td>\n<td style=\"text-align:center\">2</td>\n<td>3</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_table_without_rows_omits_body() {
        // Arrange
        let blocks = vec![Block::Table {
            header: vec!["only".to_string()],
            alignments: vec![Alignment::None],
            rows: Vec::new(),
        }];

        // Act
        let html = write(&plain(), blocks).expect("Should write table");

        // Assert
        assert!(!html.contains("<tbody>"), "Should omit tbody: {}", html);
    }

    #[test]
    fn test_code_escaped_without_highlighting() {
        // Arrange
        let blocks = vec![Block::FencedCode {
            language: Some("cobol".to_string()),
            content: "<script>alert(1)</script>\n".to_string(),
            highlighted: None,
        }];

        // Act
        let html = write(&plain(), blocks).expect("Should write code");

        // Assert
        assert_eq!(
            html,
            "<pre><code class=\"language-cobol\">&lt;script&gt;alert(1)&lt;/script&gt;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_alert_container() {
        // Arrange
        let blocks = vec![Block::Blockquote {
            alert: Some(AlertKind::Warning),
            children: vec![paragraph("Danger")],
        }];

        // Act
        let html = write(&plain(), blocks).expect("Should write alert");

        // Assert
        assert_eq!(
            html,
            "<div class=\"markdown-alert markdown-alert-warning\">\n<p class=\"markdown-alert-title\">Warning</p>\n<p>Danger</p>\n</div>\n"
        );
    }

    #[test]
    fn test_tight_task_list() {
        // Arrange
        let blocks = vec![Block::List {
            kind: ListKind::Unordered,
            tight: true,
            items: vec![
                ListItem {
                    task: Some(true),
                    children: vec![paragraph("done")],
                },
                ListItem {
                    task: Some(false),
                    children: vec![paragraph("todo")],
                },
            ],
        }];

        // Act
        let html = write(&plain(), blocks).expect("Should write list");

        // Assert
        assert_eq!(
            html,
            "<ul class=\"contains-task-list\">\n\
             <li class=\"task-list-item\"><input class=\"task-list-item-checkbox\" type=\"checkbox\" disabled checked> done</li>\n\
             <li class=\"task-list-item\"><input class=\"task-list-item-checkbox\" type=\"checkbox\" disabled> todo</li>\n\
             </ul>\n"
        );
    }

    #[test]
    fn test_loose_ordered_list_with_start() {
        // Arrange
        let blocks = vec![Block::List {
            kind: ListKind::Ordered { start: 3 },
            tight: false,
            items: vec![ListItem {
                task: None,
                children: vec![paragraph("three")],
            }],
        }];

        // Act
        let html = write(&plain(), blocks).expect("Should write list");

        // Assert
        assert_eq!(html, "<ol start=\"3\">\n<li>\n<p>three</p>\n</li>\n</ol>\n");
    }

    #[test]
    fn test_inline_spans() {
        // Arrange
        let options = RenderOptions {
            strikethrough: true,
            image_sizing: true,
            ..plain()
        };
        let blocks = vec![paragraph(
            "**b** ~~s~~ `c<d` [l](u?a=1&b=2 \"T\") ![i](p.png =50%) a < b",
        )];

        // Act
        let html = write(&options, blocks).expect("Should write spans");

        // Assert
        assert_eq!(
            html,
            "<p><strong>b</strong> <s>s</s> <code>c&lt;d</code> <a href=\"u?a=1&amp;b=2\" title=\"T\">l</a> <img src=\"p.png\" alt=\"i\" style=\"width:50%\"> a &lt; b</p>\n"
        );
    }

    #[test]
    fn test_raw_html_escaped_when_disabled() {
        // Arrange
        let blocks = vec![Block::Html {
            raw: "<div>x</div>\n".to_string(),
        }];

        // Act
        let html = write(&plain(), blocks).expect("Should write html block");

        // Assert
        assert_eq!(html, "<p>&lt;div&gt;x&lt;/div&gt;</p>\n");
    }
}
