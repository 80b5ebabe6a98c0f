//! Block level parsing.
//!
//! Line oriented scan. Each line is classified by the first construct that
//! claims it, in fixed precedence order: thematic break, fenced code, heading,
//! blockquote, table, list item, raw HTML block, paragraph. Anything that no
//! construct claims is paragraph text, so parsing never fails.
//!
//! Container contents (blockquotes, list items) are stripped of their markers
//! and parsed recursively. Recursion stops at [`MAX_NESTING`]; deeper content
//! is kept as literal paragraph text.

use regex::Regex;
use std::sync::LazyLock;

use super::nodes::{Alignment, Block, ListItem, ListKind};

/// Container nesting limit for blockquotes and lists.
pub const MAX_NESTING: usize = 32;

/// Columns per tab stop when expanding leading tabs.
const TAB_WIDTH: usize = 4;

/// Opening line of a raw HTML block.
static HTML_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^<(?:!--|/?(?:address|article|aside|audio|blockquote|center|details|dialog|div|dl|dt|dd|fieldset|figcaption|figure|footer|form|h[1-6]|header|hr|iframe|li|main|nav|ol|p|picture|pre|script|section|source|style|summary|table|tbody|td|textarea|tfoot|th|thead|tr|ul|video)(?:\s|/?>|$))",
    )
    .expect("html block pattern is valid")
});

/// Syntax switches that change block classification.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockOptions {
    pub tables: bool,
    pub raw_html: bool,
}

/// Parses a whole document into top-level blocks.
pub(crate) fn parse_blocks(source: &str, options: BlockOptions) -> Vec<Block> {
    let lines: Vec<String> = source
        .split('\n')
        .map(|line| expand_leading_tabs(line.strip_suffix('\r').unwrap_or(line)))
        .map(|line| line.replace('\0', "\u{FFFD}"))
        .collect();

    BlockParser { options }.parse(&lines, 0)
}

struct BlockParser {
    options: BlockOptions,
}

impl BlockParser {
    fn parse(&self, lines: &[String], depth: usize) -> Vec<Block> {
        if depth > MAX_NESTING {
            tracing::debug!(depth, "Block nesting limit reached, keeping content as text");
            let text = paragraph_text(lines.iter().map(String::as_str).filter(|l| !is_blank(l)));
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![Block::Paragraph { text }]
            };
        }

        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].as_str();

            if is_blank(line) {
                i += 1;
                continue;
            }

            if is_thematic_break(line) {
                blocks.push(Block::ThematicBreak);
                i += 1;
                continue;
            }

            if let Some(fence) = Fence::open(line) {
                i = self.fenced_code(lines, i, fence, &mut blocks);
                continue;
            }

            if let Some((level, text)) = parse_heading(line) {
                blocks.push(Block::Heading {
                    level,
                    text,
                    anchor: None,
                });
                i += 1;
                continue;
            }

            if quote_content(line).is_some() {
                i = self.blockquote(lines, i, depth, &mut blocks);
                continue;
            }

            if self.options.tables
                && let Some((header, alignments)) = table_start(lines, i)
            {
                i = self.table(lines, i, header, alignments, &mut blocks);
                continue;
            }

            if let Some(marker) = ListMarker::parse(line) {
                i = self.list(lines, i, marker, depth, &mut blocks);
                continue;
            }

            if self.options.raw_html && is_html_block_start(line) {
                i = self.html_block(lines, i, &mut blocks);
                continue;
            }

            i = self.paragraph(lines, i, &mut blocks);
        }

        blocks
    }

    /// Consumes a fenced code block up to its closing fence or end of input.
    fn fenced_code(&self, lines: &[String], start: usize, fence: Fence, out: &mut Vec<Block>) -> usize {
        let mut content = String::new();
        let mut i = start + 1;

        while i < lines.len() {
            let line = lines[i].as_str();
            if fence.closes(line) {
                i += 1;
                break;
            }
            content.push_str(strip_indent(line, fence.indent));
            content.push('\n');
            i += 1;
        }

        out.push(Block::FencedCode {
            language: fence.language,
            content,
            highlighted: None,
        });
        i
    }

    fn blockquote(&self, lines: &[String], start: usize, depth: usize, out: &mut Vec<Block>) -> usize {
        let mut inner: Vec<String> = Vec::new();
        let mut i = start;

        while i < lines.len() {
            let line = lines[i].as_str();
            if let Some(content) = quote_content(line) {
                inner.push(content.to_string());
            } else if !is_blank(line)
                && inner.last().is_some_and(|prev| !is_blank(prev))
                && !starts_block(line, self.options)
            {
                // Lazy continuation of a quoted paragraph
                inner.push(line.trim_start().to_string());
            } else {
                break;
            }
            i += 1;
        }

        out.push(Block::Blockquote {
            alert: None,
            children: self.parse(&inner, depth + 1),
        });
        i
    }

    fn table(
        &self,
        lines: &[String],
        start: usize,
        header: Vec<String>,
        alignments: Vec<Alignment>,
        out: &mut Vec<Block>,
    ) -> usize {
        let columns = alignments.len();
        let mut rows = Vec::new();
        let mut i = start + 2;

        while i < lines.len() {
            let line = lines[i].as_str();
            if is_blank(line) || !line.contains('|') || starts_block(line, self.options) {
                break;
            }
            let mut cells = split_row(line);
            cells.resize(columns, String::new());
            rows.push(cells);
            i += 1;
        }

        out.push(Block::Table {
            header,
            alignments,
            rows,
        });
        i
    }

    fn list(
        &self,
        lines: &[String],
        start: usize,
        first: ListMarker,
        depth: usize,
        out: &mut Vec<Block>,
    ) -> usize {
        let mut items: Vec<Vec<String>> = Vec::new();
        let mut current: Vec<String> = vec![first.rest.clone()];
        let mut content_col = first.content_col;
        let mut tight = true;
        let mut saw_blank = false;
        let mut i = start + 1;

        while i < lines.len() {
            let line = lines[i].as_str();

            if is_blank(line) {
                current.push(String::new());
                saw_blank = true;
                i += 1;
                continue;
            }

            let indent = indent_width(line);
            if indent >= content_col {
                if saw_blank && current.iter().any(|l| !is_blank(l)) {
                    tight = false;
                }
                current.push(line[content_col..].to_string());
                saw_blank = false;
                i += 1;
                continue;
            }

            // Markers indented less than the content column are siblings at
            // this level, however far they are indented.
            if let Some(marker) = ListMarker::parse(line)
                && marker.same_list(&first)
                && !is_thematic_break(line)
            {
                if saw_blank {
                    tight = false;
                }
                items.push(std::mem::take(&mut current));
                current.push(marker.rest);
                content_col = marker.content_col;
                saw_blank = false;
                i += 1;
                continue;
            }

            if saw_blank {
                break;
            }

            if current.last().is_some_and(|prev| !is_blank(prev)) && !starts_block(line, self.options) {
                current.push(line.trim_start().to_string());
                i += 1;
                continue;
            }

            break;
        }
        items.push(current);

        let items = items
            .into_iter()
            .map(|mut item_lines| {
                while item_lines.last().is_some_and(|l| is_blank(l)) {
                    item_lines.pop();
                }
                ListItem {
                    task: None,
                    children: self.parse(&item_lines, depth + 1),
                }
            })
            .collect();

        out.push(Block::List {
            kind: first.kind,
            tight,
            items,
        });
        i
    }

    fn html_block(&self, lines: &[String], start: usize, out: &mut Vec<Block>) -> usize {
        let first = lines[start].trim_start().to_ascii_lowercase();
        let terminator = ["script", "pre", "style", "textarea"]
            .iter()
            .find(|tag| {
                first.starts_with(&format!("<{}", tag))
                    && first[tag.len() + 1..]
                        .chars()
                        .next()
                        .is_none_or(|c| c.is_whitespace() || c == '>')
            })
            .map(|tag| format!("</{}>", tag))
            .or_else(|| first.starts_with("<!--").then(|| "-->".to_string()));

        let mut raw: Vec<&str> = Vec::new();
        let mut i = start;

        while i < lines.len() {
            let line = lines[i].as_str();
            match &terminator {
                Some(end) => {
                    raw.push(line);
                    i += 1;
                    if line.to_ascii_lowercase().contains(end.as_str()) {
                        break;
                    }
                }
                None => {
                    if is_blank(line) {
                        break;
                    }
                    raw.push(line);
                    i += 1;
                }
            }
        }

        out.push(Block::Html { raw: raw.join("\n") });
        i
    }

    fn paragraph(&self, lines: &[String], start: usize, out: &mut Vec<Block>) -> usize {
        let mut i = start + 1;

        while i < lines.len() {
            let line = lines[i].as_str();
            if is_blank(line) || interrupts_paragraph(line, self.options) {
                break;
            }
            if self.options.tables && table_start(lines, i).is_some() {
                break;
            }
            i += 1;
        }

        let text = paragraph_text(lines[start..i].iter().map(String::as_str));
        out.push(Block::Paragraph { text });
        i
    }
}

/// Opening code fence.
struct Fence {
    marker: char,
    len: usize,
    indent: usize,
    language: Option<String>,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let indent = indent_width(line);
        if indent > 3 {
            return None;
        }
        let rest = &line[indent..];
        let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = rest.chars().take_while(|c| *c == marker).count();
        if len < 3 {
            return None;
        }
        let info = rest[len..].trim();
        if marker == '`' && info.contains('`') {
            return None;
        }
        let language = info
            .split_whitespace()
            .next()
            .map(|lang| lang.trim_matches(|c| c == '{' || c == '}').to_string())
            .filter(|lang| !lang.is_empty());

        Some(Self {
            marker,
            len,
            indent,
            language,
        })
    }

    fn closes(&self, line: &str) -> bool {
        let indent = indent_width(line);
        if indent > 3 {
            return false;
        }
        let rest = &line[indent..];
        let run = rest.chars().take_while(|c| *c == self.marker).count();
        run >= self.len && rest[run..].trim().is_empty()
    }
}

/// List item marker and the first line of its content.
#[derive(Debug, Clone)]
struct ListMarker {
    kind: ListKind,
    /// `-`, `*`, `+` for bullets; `.` or `)` for ordered items.
    delimiter: char,
    content_col: usize,
    rest: String,
}

impl ListMarker {
    fn parse(line: &str) -> Option<Self> {
        let indent = indent_width(line);
        let rest = &line[indent..];
        let bytes = rest.as_bytes();

        let (kind, delimiter, marker_len) = match bytes.first()? {
            b'-' | b'*' | b'+' => (ListKind::Unordered, bytes[0] as char, 1),
            b'0'..=b'9' => {
                let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
                if digits > 9 {
                    return None;
                }
                let delimiter = *bytes.get(digits)?;
                if delimiter != b'.' && delimiter != b')' {
                    return None;
                }
                let start = rest[..digits].parse::<u64>().ok()?;
                (ListKind::Ordered { start }, delimiter as char, digits + 1)
            }
            _ => return None,
        };

        let after = &rest[marker_len..];
        if !after.is_empty() && !after.starts_with([' ', '\t']) {
            return None;
        }

        let spaces = after.chars().take_while(|c| *c == ' ' || *c == '\t').count();
        let marker_end = indent + marker_len;
        let content_col = if after.trim().is_empty() || spaces > 4 {
            marker_end + 1
        } else {
            marker_end + spaces
        };
        let rest = line.get(content_col..).unwrap_or("").to_string();

        Some(Self {
            kind,
            delimiter,
            content_col,
            rest,
        })
    }

    fn same_list(&self, other: &ListMarker) -> bool {
        let same_kind = matches!(
            (self.kind, other.kind),
            (ListKind::Unordered, ListKind::Unordered)
                | (ListKind::Ordered { .. }, ListKind::Ordered { .. })
        );
        same_kind && self.delimiter == other.delimiter
    }

    /// Lists may interrupt a paragraph unless they are ordered and start above 1.
    fn can_interrupt_paragraph(&self) -> bool {
        match self.kind {
            ListKind::Unordered => true,
            ListKind::Ordered { start } => start == 1,
        }
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Number of leading spaces (tabs are already expanded).
fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Removes up to `width` leading spaces.
fn strip_indent(line: &str, width: usize) -> &str {
    let strip = indent_width(line).min(width);
    &line[strip..]
}

fn expand_leading_tabs(line: &str) -> String {
    let body = line.trim_start_matches([' ', '\t']);
    let lead = &line[..line.len() - body.len()];
    if !lead.contains('\t') {
        return line.to_string();
    }

    let mut column = 0;
    for c in lead.chars() {
        if c == '\t' {
            column += TAB_WIDTH - column % TAB_WIDTH;
        } else {
            column += 1;
        }
    }
    format!("{}{}", " ".repeat(column), body)
}

/// Three or more `-`, `*` or `_` (one kind, spaces allowed) alone on a line.
fn is_thematic_break(line: &str) -> bool {
    if indent_width(line) > 3 {
        return false;
    }
    let mut marks = line.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for c in marks {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

/// Parses an ATX heading into its level and trimmed text.
fn parse_heading(line: &str) -> Option<(u8, String)> {
    let indent = indent_width(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let level = rest.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let after = &rest[level..];
    if !after.is_empty() && !after.starts_with([' ', '\t']) {
        return None;
    }

    let mut text = after.trim();
    let without_closing = text.trim_end_matches('#');
    if without_closing.is_empty() {
        text = "";
    } else if without_closing.ends_with([' ', '\t']) {
        text = without_closing.trim_end();
    }

    Some((level as u8, text.to_string()))
}

/// Returns the content of a quoted line with its `>` marker removed.
fn quote_content(line: &str) -> Option<&str> {
    let indent = indent_width(line);
    if indent > 3 {
        return None;
    }
    let rest = line[indent..].strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn is_html_block_start(line: &str) -> bool {
    indent_width(line) <= 3 && HTML_BLOCK_RE.is_match(line.trim_start())
}

/// Lines that open a block other than a paragraph or table.
fn starts_block(line: &str, options: BlockOptions) -> bool {
    is_thematic_break(line)
        || Fence::open(line).is_some()
        || parse_heading(line).is_some()
        || quote_content(line).is_some()
        || ListMarker::parse(line).is_some()
        || (options.raw_html && is_html_block_start(line))
}

fn interrupts_paragraph(line: &str, options: BlockOptions) -> bool {
    if let Some(marker) = ListMarker::parse(line) {
        return marker.can_interrupt_paragraph() && !marker.rest.trim().is_empty();
    }
    starts_block(line, options)
}

/// Joins paragraph lines, keeping interior trailing spaces for hard breaks.
fn paragraph_text<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let joined = lines.map(str::trim_start).collect::<Vec<_>>().join("\n");
    joined.trim_end().to_string()
}

/// Header row and alignments if `lines[start]` opens a table.
fn table_start(lines: &[String], start: usize) -> Option<(Vec<String>, Vec<Alignment>)> {
    let header_line = lines.get(start)?;
    let separator_line = lines.get(start + 1)?;
    if indent_width(header_line) > 3 || !header_line.contains('|') || !separator_line.contains('|') {
        return None;
    }

    let alignments = split_row(separator_line)
        .iter()
        .map(|cell| parse_alignment(cell))
        .collect::<Option<Vec<_>>>()?;
    let header = split_row(header_line);

    if header.len() != alignments.len() {
        tracing::trace!(
            header = header.len(),
            separator = alignments.len(),
            "Table separator column count mismatch, treating as paragraph"
        );
        return None;
    }

    Some((header, alignments))
}

fn parse_alignment(cell: &str) -> Option<Alignment> {
    let cell = cell.trim();
    let left = cell.starts_with(':');
    let right = cell.ends_with(':');
    let dashes = cell.trim_matches(':');
    if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
        return None;
    }
    Some(match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    })
}

/// Splits a pipe-delimited row into trimmed cells.
///
/// Escaped pipes (`\|`) and pipes inside code spans do not split cells.
fn split_row(line: &str) -> Vec<String> {
    let mut row = line.trim();
    row = row.strip_prefix('|').unwrap_or(row);
    if row.ends_with('|') && !row.ends_with("\\|") {
        row = &row[..row.len() - 1];
    }

    let mut cells = Vec::new();
    let mut cell_start = 0;
    let mut code_ticks = 0usize;
    let bytes = row.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'`' => {
                let run = bytes[i..].iter().take_while(|b| **b == b'`').count();
                if code_ticks == 0 {
                    code_ticks = run;
                } else if code_ticks == run {
                    code_ticks = 0;
                }
                i += run - 1;
            }
            b'|' if code_ticks == 0 => {
                cells.push(row[cell_start..i].trim().to_string());
                cell_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    cells.push(row[cell_start.min(row.len())..].trim().to_string());
    cells
}
