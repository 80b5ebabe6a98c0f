//! HTML escaping.

use regex::Regex;
use std::sync::LazyLock;

/// Decimal, hex or named character reference shape at the start of the input.
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("entity pattern is valid")
});

/// Escapes HTML special characters for attribute values and code.
///
/// Every `&` is escaped, so the output never contains markup or entity
/// references from the input.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes literal text content.
///
/// Character references already present in the source (`&amp;`, `&#169;`)
/// are kept as written so they are not escaped a second time. Named
/// references must be defined by HTML; `&Tx;` and any other `&` become
/// `&amp;`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for (idx, c) in text.char_indices() {
        match c {
            '&' if starts_with_reference(&text[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// True when `text` opens with a numeric reference or a named one HTML defines.
fn starts_with_reference(text: &str) -> bool {
    let Some(found) = ENTITY_RE.find(text) else {
        return false;
    };
    let reference = found.as_str();
    if reference.as_bytes().get(1) == Some(&b'#') {
        return true;
    }

    // Named references decode to one or two code points; unknown names and
    // legacy prefixes such as `&ltx;` decode to something longer or not at all.
    let decoded = html_escape::decode_html_entities(reference);
    decoded != reference && decoded.chars().count() <= 2
}

/// Returns true when a URL carries ASCII control characters.
pub(crate) fn has_control_chars(url: &str) -> bool {
    url.chars().any(|c| c.is_ascii_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_all_characters() {
        // Arrange
        let input = r#"<>&"'"#;

        // Act
        let output = escape_html(input);

        // Assert
        assert_eq!(output, "&lt;&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_escape_html_escapes_existing_entities() {
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }

    #[test]
    fn test_escape_text_special_characters() {
        assert_eq!(escape_text("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn test_escape_text_keeps_entity_references() {
        assert_eq!(escape_text("&amp; &#169; &#x1F600; &copy;"), "&amp; &#169; &#x1F600; &copy;");
    }

    #[test]
    fn test_escape_text_rejects_incomplete_entities() {
        assert_eq!(escape_text("AT&T; & ;"), "AT&amp;T; &amp; ;");
        assert_eq!(escape_text("&#;"), "&amp;#;");
        assert_eq!(escape_text("&copy"), "&amp;copy");
    }

    #[test]
    fn test_escape_text_escapes_unknown_entity_names() {
        assert_eq!(escape_text("&Tx; &ltx; &foo;"), "&amp;Tx; &amp;ltx; &amp;foo;");
        assert_eq!(escape_text("&hellip; &NotEqualTilde;"), "&hellip; &NotEqualTilde;");
    }

    #[test]
    fn test_escape_text_leaves_apostrophes() {
        assert_eq!(escape_text("it's"), "it's");
    }

    #[test]
    fn test_control_chars() {
        assert!(has_control_chars("java\nscript:"));
        assert!(!has_control_chars("https://example.com/a b"));
    }
}
