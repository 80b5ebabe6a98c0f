//! Inline span parsing.
//!
//! Scans a block's text left to right. At each position the constructs are
//! tried in precedence order (code span, image, link, autolink, raw HTML,
//! strikethrough, emphasis) and the first that matches consumes its input.
//! Delimiters without a partner are literal text, so parsing never fails.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::escape::has_control_chars;
use super::nodes::{Emphasis, ImageSize, Inline, plain_text};

/// Nesting limit for emphasis, links and strikethrough.
pub const MAX_INLINE_DEPTH: usize = 16;

/// Parenthesis nesting allowed inside an unbracketed link destination.
const MAX_DESTINATION_PARENS: usize = 32;

/// Trailing characters given back to the surrounding text after a bare URL.
const AUTOLINK_TRAILING: &[u8] = b".,)!";

static AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?i:https?|ftp)://|(?i:www)\.)(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)*[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?::[0-9]{1,5})?(?:[/?#][^\s<>\x22`*]*)?",
    )
    .expect("autolink pattern is valid")
});

static ANGLE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<([A-Za-z][A-Za-z0-9+.-]{1,31}:[^\s<>]*)>").expect("angle url pattern is valid")
});

static ANGLE_EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^<([A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*)>",
    )
    .expect("angle email pattern is valid")
});

static RAW_HTML_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:<[A-Za-z][A-Za-z0-9-]*(?:\s+[A-Za-z_:][A-Za-z0-9_.:-]*(?:\s*=\s*(?:[^\s"'=<>`]+|'[^']*'|"[^"]*"))?)*\s*/?>|</[A-Za-z][A-Za-z0-9-]*\s*>|<!--[\s\S]*?-->)"#,
    )
    .expect("raw html pattern is valid")
});

static IMAGE_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^=(?:([0-9]+)%|([0-9]*)x([0-9]*))").expect("image size pattern is valid")
});

/// Syntax switches for inline parsing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InlineOptions {
    pub strikethrough: bool,
    pub image_sizing: bool,
    pub autolinks: bool,
    pub raw_html: bool,
    pub hard_breaks: bool,
}

/// Inline parser for one block's text.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InlineParser {
    options: InlineOptions,
}

#[derive(Debug, Clone, Copy, Default)]
struct Context {
    depth: usize,
    in_link: bool,
}

impl Context {
    fn deeper(self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self
        }
    }

    fn link_text(self) -> Self {
        Self {
            depth: self.depth + 1,
            in_link: true,
        }
    }
}

/// Spans produced by one construct and the byte offset just past it.
struct Matched {
    spans: Vec<Inline>,
    end: usize,
}

impl Matched {
    fn single(span: Inline, end: usize) -> Option<Self> {
        Some(Self {
            spans: vec![span],
            end,
        })
    }
}

/// Link destination, optional title and image size.
struct Destination {
    url: String,
    title: Option<String>,
    size: Option<ImageSize>,
    end: usize,
}

/// Output buffer that merges adjacent text spans.
#[derive(Default)]
struct Spans(Vec<Inline>);

impl Spans {
    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Inline::Text(last)) = self.0.last_mut() {
            last.push_str(text);
        } else {
            self.0.push(Inline::Text(text.to_string()));
        }
    }

    fn push(&mut self, span: Inline) {
        match span {
            Inline::Text(text) => self.push_text(&text),
            other => self.0.push(other),
        }
    }
}

/// Delimiter kinds known to have no closer past a given position.
#[derive(Default)]
struct MissingClosers(Vec<(u8, usize)>);

/// Bracket and destination scans shared by every link opener in one text.
///
/// Scans that run to the end of the text are remembered, so a paragraph of
/// unmatched `[`, `![` or `[a](` openers is not rescanned once per opener.
#[derive(Default)]
struct LinkScan {
    /// Matching `]`, if any, for every `[` on an already scanned path.
    labels: HashMap<usize, Option<usize>>,
    /// Title closers with no occurrence from the given position on.
    open_titles: Vec<(u8, usize)>,
    /// Position from which no `>` or newline follows.
    open_angle: Option<usize>,
}

impl InlineParser {
    pub(crate) fn new(options: InlineOptions) -> Self {
        Self { options }
    }

    /// Parses text into inline spans.
    pub(crate) fn parse(&self, text: &str) -> Vec<Inline> {
        self.parse_in(text, Context::default())
    }

    fn parse_in(&self, text: &str, ctx: Context) -> Vec<Inline> {
        let mut spans = Spans::default();
        if ctx.depth > MAX_INLINE_DEPTH {
            tracing::debug!(depth = ctx.depth, "Inline nesting limit reached, keeping text literal");
            spans.push_text(text);
            return spans.0;
        }

        let bytes = text.as_bytes();
        let mut missing = MissingClosers::default();
        let mut links = LinkScan::default();
        let mut pos = 0;
        let mut literal = 0;

        while pos < bytes.len() {
            let byte = bytes[pos];

            match byte {
                b'\\' => match bytes.get(pos + 1) {
                    Some(b'\n') => {
                        spans.push_text(&text[literal..pos]);
                        spans.push(Inline::HardBreak);
                        pos = skip_spaces(bytes, pos + 2);
                        literal = pos;
                        continue;
                    }
                    Some(next) if next.is_ascii_punctuation() => {
                        spans.push_text(&text[literal..pos]);
                        spans.push_text(&text[pos + 1..pos + 2]);
                        pos += 2;
                        literal = pos;
                        continue;
                    }
                    _ => {}
                },
                b'\n' => {
                    let before = &text[literal..pos];
                    let trimmed = before.trim_end_matches(' ');
                    let hard = self.options.hard_breaks || before.len() - trimmed.len() >= 2;
                    spans.push_text(trimmed);
                    spans.push(if hard {
                        Inline::HardBreak
                    } else {
                        Inline::SoftBreak
                    });
                    pos = skip_spaces(bytes, pos + 1);
                    literal = pos;
                    continue;
                }
                _ => {}
            }

            let matched = match byte {
                b'`' => self.code_span(text, pos),
                b'!' => self.image(text, pos, ctx, &mut links),
                b'[' if !ctx.in_link => self.link(text, pos, ctx, &mut links),
                b'<' => self.angle(text, pos, ctx),
                b'h' | b'H' | b'f' | b'F' | b'w' | b'W' if self.options.autolinks && !ctx.in_link => {
                    self.autolink(text, pos)
                }
                b'~' if self.options.strikethrough => self.strikethrough(text, pos, ctx, &mut missing),
                b'*' | b'_' => self.emphasis(text, pos, ctx, &mut missing),
                _ => None,
            };

            match matched {
                Some(found) => {
                    spans.push_text(&text[literal..pos]);
                    for span in found.spans {
                        spans.push(span);
                    }
                    pos = found.end;
                    literal = pos;
                }
                None if matches!(byte, b'`' | b'*' | b'_' | b'~') => {
                    pos += run_len(bytes, pos, byte);
                }
                None => pos += 1,
            }
        }

        spans.push_text(&text[literal..]);
        spans.0
    }

    /// Backtick code span; content is never parsed further.
    fn code_span(&self, text: &str, pos: usize) -> Option<Matched> {
        let bytes = text.as_bytes();
        let open = run_len(bytes, pos, b'`');
        let close = find_code_close(bytes, pos + open, open)?;

        let raw = text[pos + open..close].replace('\n', " ");
        let content = if raw.len() >= 2
            && raw.starts_with(' ')
            && raw.ends_with(' ')
            && !raw.trim().is_empty()
        {
            raw[1..raw.len() - 1].to_string()
        } else {
            raw
        };

        Matched::single(Inline::Code(content), close + open)
    }

    fn image(&self, text: &str, pos: usize, ctx: Context, links: &mut LinkScan) -> Option<Matched> {
        if text.as_bytes().get(pos + 1) != Some(&b'[') {
            return None;
        }
        let (label_end, dest) = bracket_destination(text, pos + 1, self.options.image_sizing, links)?;
        let alt = plain_text(&self.parse_in(&text[pos + 2..label_end], ctx.link_text()));

        Matched::single(
            Inline::Image {
                src: dest.url,
                alt,
                title: dest.title,
                size: dest.size,
            },
            dest.end,
        )
    }

    fn link(&self, text: &str, pos: usize, ctx: Context, links: &mut LinkScan) -> Option<Matched> {
        let (label_end, dest) = bracket_destination(text, pos, false, links)?;
        let children = self.parse_in(&text[pos + 1..label_end], ctx.link_text());

        Matched::single(
            Inline::Link {
                href: dest.url,
                title: dest.title,
                children,
            },
            dest.end,
        )
    }

    /// Angle bracket autolinks and raw inline HTML.
    fn angle(&self, text: &str, pos: usize, ctx: Context) -> Option<Matched> {
        let rest = &text[pos..];

        if !ctx.in_link {
            if let Some(caps) = ANGLE_URL_RE.captures(rest) {
                let url = &caps[1];
                if !has_control_chars(url) {
                    return Matched::single(
                        Inline::Autolink {
                            href: url.to_string(),
                            text: url.to_string(),
                        },
                        pos + caps[0].len(),
                    );
                }
            }
            if let Some(caps) = ANGLE_EMAIL_RE.captures(rest) {
                let email = &caps[1];
                return Matched::single(
                    Inline::Autolink {
                        href: format!("mailto:{}", email),
                        text: email.to_string(),
                    },
                    pos + caps[0].len(),
                );
            }
        }

        if self.options.raw_html
            && let Some(found) = RAW_HTML_RE.find(rest)
        {
            return Matched::single(Inline::Html(found.as_str().to_string()), pos + found.end());
        }

        None
    }

    /// Bare URL. One trailing `.`, `,`, `)` or `!` is left to the text.
    fn autolink(&self, text: &str, pos: usize) -> Option<Matched> {
        if pos > 0 {
            let prev = text.as_bytes()[pos - 1];
            if !prev.is_ascii() || prev.is_ascii_alphanumeric() {
                return None;
            }
        }

        let found = AUTOLINK_RE.find(&text[pos..])?;
        let mut url = found.as_str();
        if url.as_bytes().last().is_some_and(|b| AUTOLINK_TRAILING.contains(b)) {
            url = &url[..url.len() - 1];
        }

        let href = if url.len() >= 4 && url[..4].eq_ignore_ascii_case("www.") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };

        Matched::single(
            Inline::Autolink {
                href,
                text: url.to_string(),
            },
            pos + url.len(),
        )
    }

    fn strikethrough(
        &self,
        text: &str,
        pos: usize,
        ctx: Context,
        missing: &mut MissingClosers,
    ) -> Option<Matched> {
        let bytes = text.as_bytes();
        if run_len(bytes, pos, b'~') != 2 || !opens(text, pos + 2) {
            return None;
        }
        let close = missing.find(text, pos + 2, b'~', 2, false)?;
        let children = self.parse_in(&text[pos + 2..close], ctx.deeper());

        Matched::single(Inline::Strikethrough(children), close + 2)
    }

    /// `*`/`_` emphasis. When a run is longer than the matched closer, the
    /// extra delimiters pair with another closer if one fits, nesting the two
    /// spans (`***a** b*`, `***a* b**`); otherwise they stay literal text in
    /// front of the span.
    fn emphasis(
        &self,
        text: &str,
        pos: usize,
        ctx: Context,
        missing: &mut MissingClosers,
    ) -> Option<Matched> {
        let bytes = text.as_bytes();
        let delimiter = bytes[pos];
        let run = run_len(bytes, pos, delimiter);
        let content_start = pos + run;

        if !opens(text, content_start) {
            return None;
        }
        if delimiter == b'_' && text[..pos].chars().next_back().is_some_and(char::is_alphanumeric) {
            return None;
        }

        for width in (1..=run.min(3)).rev() {
            let Some(close) = missing.find(text, content_start, delimiter, width, true) else {
                continue;
            };
            let leftover = run - width;

            if (1..=3).contains(&leftover) && ctx.depth < MAX_INLINE_DEPTH {
                // The leftover closes first and becomes the inner span.
                if let Some(early) = missing.find(text, content_start, delimiter, leftover, true)
                    && early + leftover <= close
                {
                    return Some(self.nested(text, ctx, (content_start, early, leftover), (close, width)));
                }
                // The matched closer comes first; the leftover wraps it.
                if let Some(late) = missing.find(text, close + width, delimiter, leftover, true) {
                    return Some(self.nested(text, ctx, (content_start, close, width), (late, leftover)));
                }
            }

            let mut spans = Vec::with_capacity(2);
            if leftover > 0 {
                spans.push(Inline::Text(text[pos..pos + leftover].to_string()));
            }
            spans.push(Inline::Emphasis {
                style: emphasis_style(width),
                children: self.parse_in(&text[content_start..close], ctx.deeper()),
            });
            return Some(Matched {
                spans,
                end: close + width,
            });
        }

        None
    }

    /// Builds an outer span whose content begins with an inner span sharing
    /// its opening run. The inner span is given as content start, closer
    /// and width; the outer one as closer and width.
    fn nested(
        &self,
        text: &str,
        ctx: Context,
        (content_start, inner_close, inner_width): (usize, usize, usize),
        (outer_close, outer_width): (usize, usize),
    ) -> Matched {
        let inner_end = inner_close + inner_width;
        let mut children = vec![Inline::Emphasis {
            style: emphasis_style(inner_width),
            children: self.parse_in(&text[content_start..inner_close], ctx.deeper().deeper()),
        }];
        children.extend(self.parse_in(&text[inner_end..outer_close], ctx.deeper()));

        Matched {
            spans: vec![Inline::Emphasis {
                style: emphasis_style(outer_width),
                children,
            }],
            end: outer_close + outer_width,
        }
    }
}

impl MissingClosers {
    /// Finds a closing run, remembering misses.
    ///
    /// A run of exactly `width` is preferred. With `allow_longer`, the last
    /// `width` delimiters of a longer run close the span when no exact run
    /// exists, so `**a *b***` nests. A miss from one position is a miss from
    /// every later position, so a line full of unmatched openers is scanned
    /// once per delimiter width.
    fn find(
        &mut self,
        text: &str,
        from: usize,
        delimiter: u8,
        width: usize,
        allow_longer: bool,
    ) -> Option<usize> {
        if self.0.contains(&(delimiter, width)) {
            return None;
        }
        let found = find_closer(text, from, delimiter, width, true)
            .or_else(|| allow_longer.then(|| find_closer(text, from, delimiter, width, false)).flatten());
        if found.is_none() {
            self.0.push((delimiter, width));
        }
        found
    }
}

fn emphasis_style(width: usize) -> Emphasis {
    match width {
        3 => Emphasis::BoldItalic,
        2 => Emphasis::Bold,
        _ => Emphasis::Italic,
    }
}

/// Length of the run of `byte` starting at `pos`.
fn run_len(bytes: &[u8], pos: usize, byte: u8) -> usize {
    bytes[pos..].iter().take_while(|b| **b == byte).count()
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos) == Some(&b' ') {
        pos += 1;
    }
    pos
}

/// True when the text after an opening delimiter starts with non-whitespace.
fn opens(text: &str, content_start: usize) -> bool {
    text[content_start..]
        .chars()
        .next()
        .is_some_and(|c| !c.is_whitespace())
}

/// Start of a backtick run of exactly `width` at or after `from`.
fn find_code_close(bytes: &[u8], from: usize, width: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let run = run_len(bytes, i, b'`');
            if run == width {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

/// Finds a closing delimiter run, returning where its last `width`
/// delimiters start.
///
/// With `exact`, only runs of exactly `width` count; otherwise only longer
/// runs do. Code spans and escaped characters are skipped. The closer must
/// follow non-whitespace, and an `_` closer must not be followed by an
/// alphanumeric character.
fn find_closer(text: &str, from: usize, delimiter: u8, width: usize, exact: bool) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = from;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => {
                let run = run_len(bytes, i, b'`');
                i = match find_code_close(bytes, i + run, run) {
                    Some(close) => close + run,
                    None => i + run,
                };
            }
            b if b == delimiter => {
                let run = run_len(bytes, i, delimiter);
                let fits = if exact { run == width } else { run > width };
                if fits && i > from {
                    let after_whitespace = text[..i].chars().next_back().is_none_or(char::is_whitespace);
                    let before_word = delimiter == b'_'
                        && text[i + run..].chars().next().is_some_and(char::is_alphanumeric);
                    if !after_whitespace && !before_word {
                        return Some(i + run - width);
                    }
                }
                i += run;
            }
            _ => i += 1,
        }
    }

    None
}

impl LinkScan {
    /// Index of the `]` matching the `[` at `open`.
    fn label_end(&mut self, bytes: &[u8], open: usize) -> Option<usize> {
        if !self.labels.contains_key(&open) {
            self.pair_brackets(bytes, open);
        }
        self.labels.get(&open).copied().flatten()
    }

    /// Pairs every bracket from `open` to the end of the text, skipping
    /// escapes and code spans. A `[` reached from two starting points sees
    /// the same text after it, so earlier pairings stay valid.
    fn pair_brackets(&mut self, bytes: &[u8], open: usize) {
        let mut pending = vec![open];
        let mut i = open + 1;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'`' => {
                    let run = run_len(bytes, i, b'`');
                    i = match find_code_close(bytes, i + run, run) {
                        Some(close) => close + run,
                        None => i + run,
                    };
                    continue;
                }
                b'[' => pending.push(i),
                b']' => {
                    if let Some(opener) = pending.pop() {
                        self.labels.entry(opener).or_insert(Some(i));
                    }
                }
                _ => {}
            }
            i += 1;
        }

        for opener in pending {
            self.labels.entry(opener).or_insert(None);
        }
    }

    /// Index of the first unescaped `closing` at or after `from`.
    fn title_end(&mut self, bytes: &[u8], from: usize, closing: u8) -> Option<usize> {
        if self
            .open_titles
            .iter()
            .any(|&(byte, start)| byte == closing && start <= from)
        {
            return None;
        }

        let mut j = from;
        while j < bytes.len() && bytes[j] != closing {
            if bytes[j] == b'\\' {
                j += 1;
            }
            j += 1;
        }
        if j < bytes.len() {
            return Some(j);
        }

        self.open_titles.retain(|&(byte, _)| byte != closing);
        self.open_titles.push((closing, from));
        None
    }

    /// Index of the first `>` or newline at or after `from`.
    fn angle_end(&mut self, bytes: &[u8], from: usize) -> Option<usize> {
        if self.open_angle.is_some_and(|start| start <= from) {
            return None;
        }
        let found = bytes[from..]
            .iter()
            .position(|b| *b == b'>' || *b == b'\n')
            .map(|offset| from + offset);
        if found.is_none() {
            self.open_angle = Some(from);
        }
        found
    }
}

/// Parses `[label](destination)` starting at the `[`.
fn bracket_destination(
    text: &str,
    open: usize,
    allow_size: bool,
    links: &mut LinkScan,
) -> Option<(usize, Destination)> {
    let bytes = text.as_bytes();
    let label_end = links.label_end(bytes, open)?;
    if bytes.get(label_end + 1) != Some(&b'(') {
        return None;
    }
    let dest = parse_destination(text, label_end + 2, allow_size, links)?;
    Some((label_end, dest))
}

/// Parses `url "title" =WxH)` starting just after the `(`.
///
/// An unbracketed URL may nest parentheses [`MAX_DESTINATION_PARENS`] deep.
fn parse_destination(text: &str, start: usize, allow_size: bool, links: &mut LinkScan) -> Option<Destination> {
    let bytes = text.as_bytes();
    let mut i = skip_whitespace(bytes, start);

    let url = if bytes.get(i) == Some(&b'<') {
        let close = links.angle_end(bytes, i + 1)?;
        if bytes[close] != b'>' {
            return None;
        }
        let url = &text[i + 1..close];
        i = close + 1;
        url
    } else {
        let url_start = i;
        let mut parens = 0usize;
        while i < bytes.len() {
            match bytes[i] {
                b' ' | b'\t' | b'\n' => break,
                b'\\' if i + 1 < bytes.len() => {
                    i += 2;
                    continue;
                }
                b'(' if parens == MAX_DESTINATION_PARENS => return None,
                b'(' => parens += 1,
                b')' if parens == 0 => break,
                b')' => parens -= 1,
                _ => {}
            }
            i += 1;
        }
        &text[url_start..i]
    };

    if has_control_chars(url) {
        return None;
    }

    let mut title = None;
    let mut size = None;
    loop {
        let after = skip_whitespace(bytes, i);
        if after == i {
            break;
        }
        i = after;
        match bytes.get(i) {
            Some(b'=') if allow_size && size.is_none() => {
                let caps = IMAGE_SIZE_RE.captures(&text[i..])?;
                size = Some(parse_size(&caps)?);
                i += caps[0].len();
            }
            Some(&(quote @ (b'"' | b'\'' | b'('))) if title.is_none() => {
                let closing = if quote == b'(' { b')' } else { quote };
                let j = links.title_end(bytes, i + 1, closing)?;
                title = Some(unescape(&text[i + 1..j]));
                i = j + 1;
            }
            _ => break,
        }
    }

    i = skip_whitespace(bytes, i);
    if bytes.get(i) != Some(&b')') {
        return None;
    }

    Some(Destination {
        url: unescape(url),
        title,
        size,
        end: i + 1,
    })
}

fn parse_size(caps: &regex::Captures<'_>) -> Option<ImageSize> {
    if let Some(percent) = caps.get(1) {
        return percent.as_str().parse().ok().map(ImageSize::Percent);
    }

    let dimension = |idx: usize| -> Option<Option<u32>> {
        match caps.get(idx).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
            Some(digits) => digits.parse().ok().map(Some),
            None => Some(None),
        }
    };
    let width = dimension(2)?;
    let height = dimension(3)?;
    if width.is_none() && height.is_none() {
        return None;
    }
    Some(ImageSize::Pixels { width, height })
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while matches!(bytes.get(pos), Some(b' ' | b'\t' | b'\n')) {
        pos += 1;
    }
    pos
}

/// Removes backslashes in front of ASCII punctuation.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && next.is_ascii_punctuation()
        {
            out.push(next);
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ALL: InlineOptions = InlineOptions {
        strikethrough: true,
        image_sizing: true,
        autolinks: true,
        raw_html: true,
        hard_breaks: false,
    };

    fn parse(text: &str) -> Vec<Inline> {
        InlineParser::new(ALL).parse(text)
    }

    fn text(value: &str) -> Inline {
        Inline::Text(value.to_string())
    }

    fn emphasis(style: Emphasis, children: Vec<Inline>) -> Inline {
        Inline::Emphasis { style, children }
    }

    #[test]
    fn test_plain_text_is_one_span() {
        assert_eq!(parse("just words"), vec![text("just words")]);
    }

    #[test]
    fn test_bold_italic_and_both() {
        assert_eq!(
            parse("**b** *i* ***bi*** __u__ _v_"),
            vec![
                emphasis(Emphasis::Bold, vec![text("b")]),
                text(" "),
                emphasis(Emphasis::Italic, vec![text("i")]),
                text(" "),
                emphasis(Emphasis::BoldItalic, vec![text("bi")]),
                text(" "),
                emphasis(Emphasis::Bold, vec![text("u")]),
                text(" "),
                emphasis(Emphasis::Italic, vec![text("v")]),
            ]
        );
    }

    #[test]
    fn test_unbalanced_emphasis_is_literal() {
        assert_eq!(parse("*unterminated"), vec![text("*unterminated")]);
        assert_eq!(parse("**open *and"), vec![text("**open *and")]);
        assert_eq!(parse("a * b * c"), vec![text("a * b * c")]);
    }

    #[test]
    fn test_longer_run_keeps_literal_prefix() {
        assert_eq!(
            parse("**a*"),
            vec![text("*"), emphasis(Emphasis::Italic, vec![text("a")])]
        );
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            parse("**bold *and italic***"),
            vec![emphasis(
                Emphasis::Bold,
                vec![
                    text("bold "),
                    emphasis(Emphasis::Italic, vec![text("and italic")])
                ]
            )]
        );
        assert_eq!(
            parse("*a **b** c*"),
            vec![emphasis(
                Emphasis::Italic,
                vec![
                    text("a "),
                    emphasis(Emphasis::Bold, vec![text("b")]),
                    text(" c")
                ]
            )]
        );
    }

    #[test]
    fn test_intraword_underscore_is_literal() {
        assert_eq!(parse("snake_case_name"), vec![text("snake_case_name")]);
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(
            parse("~~gone~~ ~single~"),
            vec![Inline::Strikethrough(vec![text("gone")]), text(" ~single~")]
        );
    }

    #[test]
    fn test_strikethrough_disabled() {
        let parser = InlineParser::new(InlineOptions {
            strikethrough: false,
            ..ALL
        });
        assert_eq!(parser.parse("~~gone~~"), vec![text("~~gone~~")]);
    }

    #[test]
    fn test_code_span_content_is_not_parsed() {
        assert_eq!(
            parse("use `**raw**` and `` a ` b ``"),
            vec![
                text("use "),
                Inline::Code("**raw**".to_string()),
                text(" and "),
                Inline::Code("a ` b".to_string()),
            ]
        );
    }

    #[test]
    fn test_unclosed_code_span_is_literal() {
        assert_eq!(parse("a `b"), vec![text("a `b")]);
    }

    #[test]
    fn test_code_span_wins_over_emphasis() {
        assert_eq!(
            parse("*a `*` b*"),
            vec![emphasis(
                Emphasis::Italic,
                vec![text("a "), Inline::Code("*".to_string()), text(" b")]
            )]
        );
    }

    #[test]
    fn test_link_with_title_and_nested_emphasis() {
        assert_eq!(
            parse(r#"[**docs**](https://example.com/a_(b) "The Docs")"#),
            vec![Inline::Link {
                href: "https://example.com/a_(b)".to_string(),
                title: Some("The Docs".to_string()),
                children: vec![emphasis(Emphasis::Bold, vec![text("docs")])],
            }]
        );
    }

    #[test]
    fn test_link_without_destination_is_literal() {
        assert_eq!(parse("[not a link] (x)"), vec![text("[not a link] (x)")]);
    }

    #[test]
    fn test_link_with_control_character_is_literal() {
        assert_eq!(
            parse("[a](java\u{1}script:x)"),
            vec![text("[a](java\u{1}script:x)")]
        );
    }

    #[test]
    fn test_links_do_not_nest() {
        let spans = parse("[a [b](c) d](e)");
        let Inline::Link { children, href, .. } = &spans[0] else {
            panic!("expected link, got {:?}", spans);
        };
        assert_eq!(href, "e");
        assert_eq!(children, &vec![text("a [b](c) d")]);
    }

    #[test]
    fn test_image_with_pixel_size() {
        assert_eq!(
            parse("![alt](x.png =100x50)"),
            vec![Inline::Image {
                src: "x.png".to_string(),
                alt: "alt".to_string(),
                title: None,
                size: Some(ImageSize::Pixels {
                    width: Some(100),
                    height: Some(50)
                }),
            }]
        );
    }

    #[test]
    fn test_image_with_percent_and_title() {
        assert_eq!(
            parse(r#"![*cat*](cat.jpg "Cat" =50%)"#),
            vec![Inline::Image {
                src: "cat.jpg".to_string(),
                alt: "cat".to_string(),
                title: Some("Cat".to_string()),
                size: Some(ImageSize::Percent(50)),
            }]
        );
    }

    #[test]
    fn test_image_with_one_side() {
        let spans = parse("![a](b.png =x20)");
        assert!(matches!(
            spans[0],
            Inline::Image {
                size: Some(ImageSize::Pixels {
                    width: None,
                    height: Some(20)
                }),
                ..
            }
        ));
    }

    #[test]
    fn test_image_size_ignored_when_disabled() {
        let parser = InlineParser::new(InlineOptions {
            image_sizing: false,
            ..ALL
        });
        assert_eq!(
            parser.parse("![a](b.png =1x2)"),
            vec![text("![a](b.png =1x2)")]
        );
    }

    #[test]
    fn test_autolink_trims_one_trailing_punctuation() {
        assert_eq!(
            parse("See https://example.com/path. Done"),
            vec![
                text("See "),
                Inline::Autolink {
                    href: "https://example.com/path".to_string(),
                    text: "https://example.com/path".to_string(),
                },
                text(". Done"),
            ]
        );
    }

    #[test]
    fn test_autolink_www_gains_scheme() {
        let spans = parse("(www.example.com)");
        assert_eq!(
            spans,
            vec![
                text("("),
                Inline::Autolink {
                    href: "http://www.example.com".to_string(),
                    text: "www.example.com".to_string(),
                },
                text(")"),
            ]
        );
    }

    #[test]
    fn test_autolink_needs_word_boundary() {
        assert_eq!(parse("xhttps://example.com"), vec![text("xhttps://example.com")]);
    }

    #[test]
    fn test_angle_autolinks() {
        assert_eq!(
            parse("<https://a.io> <me@b.io>"),
            vec![
                Inline::Autolink {
                    href: "https://a.io".to_string(),
                    text: "https://a.io".to_string(),
                },
                text(" "),
                Inline::Autolink {
                    href: "mailto:me@b.io".to_string(),
                    text: "me@b.io".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_raw_html_passthrough() {
        assert_eq!(
            parse(r#"press <kbd class="k">Ctrl</kbd> <!-- note -->"#),
            vec![
                text("press "),
                Inline::Html(r#"<kbd class="k">"#.to_string()),
                text("Ctrl"),
                Inline::Html("</kbd>".to_string()),
                text(" "),
                Inline::Html("<!-- note -->".to_string()),
            ]
        );
    }

    #[test]
    fn test_raw_html_disabled_is_text() {
        let parser = InlineParser::new(InlineOptions {
            raw_html: false,
            ..ALL
        });
        assert_eq!(parser.parse("<b>x</b>"), vec![text("<b>x</b>")]);
    }

    #[test]
    fn test_backslash_escapes() {
        assert_eq!(parse(r"\*not emphasis\* \a"), vec![text(r"*not emphasis* \a")]);
    }

    #[test]
    fn test_line_breaks() {
        assert_eq!(
            parse("soft\nhard  \nslash\\\nend"),
            vec![
                text("soft"),
                Inline::SoftBreak,
                text("hard"),
                Inline::HardBreak,
                text("slash"),
                Inline::HardBreak,
                text("end"),
            ]
        );
    }

    #[test]
    fn test_hard_breaks_option() {
        let parser = InlineParser::new(InlineOptions {
            hard_breaks: true,
            ..ALL
        });
        assert_eq!(
            parser.parse("a\nb"),
            vec![text("a"), Inline::HardBreak, text("b")]
        );
    }

    #[test]
    fn test_nesting_limit_keeps_inner_text_literal() {
        // Arrange
        let parser = InlineParser::new(ALL);
        let at_limit = Context {
            depth: MAX_INLINE_DEPTH,
            in_link: false,
        };
        let past_limit = Context {
            depth: MAX_INLINE_DEPTH + 1,
            in_link: false,
        };

        // Act
        let last_level = parser.parse_in("**a *b***", at_limit);
        let beyond = parser.parse_in("**a *b***", past_limit);

        // Assert
        assert_eq!(
            last_level,
            vec![emphasis(Emphasis::Bold, vec![text("a *b*")])]
        );
        assert_eq!(beyond, vec![text("**a *b***")]);
    }

    #[test]
    fn test_many_unmatched_openers() {
        let source = "*a ".repeat(5_000);
        let spans = parse(&source);
        assert_eq!(spans, vec![text(&source)]);
    }

    #[test]
    fn test_leftover_delimiters_open_outer_span() {
        assert_eq!(
            parse("***a** b*"),
            vec![emphasis(
                Emphasis::Italic,
                vec![emphasis(Emphasis::Bold, vec![text("a")]), text(" b")]
            )]
        );
        assert_eq!(
            parse("***a* b**"),
            vec![emphasis(
                Emphasis::Bold,
                vec![emphasis(Emphasis::Italic, vec![text("a")]), text(" b")]
            )]
        );
        assert_eq!(parse("***a** b"), vec![text("*"), emphasis(Emphasis::Bold, vec![text("a")]), text(" b")]);
    }

    #[test]
    fn test_unmatched_brackets_stay_literal() {
        // Arrange
        let brackets = "[".repeat(40_000);
        let images = "![".repeat(20_000);
        let open_destinations = "[a](".repeat(10_000);
        let open_titles = "[a](b (".repeat(10_000);
        let open_angles = "[a](<".repeat(10_000);

        // Act & Assert
        assert_eq!(parse(&brackets), vec![text(&brackets)]);
        assert_eq!(parse(&images), vec![text(&images)]);
        assert_eq!(parse(&open_destinations), vec![text(&open_destinations)]);
        assert_eq!(parse(&open_titles), vec![text(&open_titles)]);
        assert_eq!(parse(&open_angles), vec![text(&open_angles)]);
    }

    #[test]
    fn test_bracket_pairing_after_unmatched_opener() {
        assert_eq!(
            parse("[[a](x) [b]"),
            vec![
                text("["),
                Inline::Link {
                    href: "x".to_string(),
                    title: None,
                    children: vec![text("a")],
                },
                text(" [b]"),
            ]
        );
    }

    #[test]
    fn test_destination_paren_nesting_limit() {
        // Arrange
        let nested = format!("[a]({}x{})", "(".repeat(32), ")".repeat(32));
        let too_deep = format!("[a]({}x{})", "(".repeat(33), ")".repeat(33));

        // Act
        let nested_spans = parse(&nested);
        let too_deep_spans = parse(&too_deep);

        // Assert
        assert!(matches!(nested_spans.as_slice(), [Inline::Link { .. }]));
        assert_eq!(too_deep_spans, vec![text(&too_deep)]);
    }
}
