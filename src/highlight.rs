//! Syntax highlighting for fenced code with syntect.

use std::collections::BTreeSet;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::RenderError;
use crate::markdown::escape_html;

/// Highlights code for a fixed set of registered languages.
///
/// Grammars come from syntect's bundled syntax set, loaded once. A language
/// is highlighted only when it is registered and syntect knows a grammar for
/// it, looked up by token (`rust`, `python`) or file extension (`rs`, `js`).
/// Output wraps tokens in `<span class="hljs-...">` elements so existing
/// highlight.js themes apply.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    languages: BTreeSet<String>,
}

impl Highlighter {
    /// Creates a highlighter for the given language names.
    ///
    /// Names are matched case-insensitively.
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let languages = languages
            .into_iter()
            .map(|name| name.as_ref().trim().to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            languages,
        }
    }

    /// Returns true when `language` is registered and has a grammar.
    pub fn supports(&self, language: &str) -> bool {
        self.syntax(language).is_some()
    }

    /// Registered language names in sorted order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(String::as_str)
    }

    /// Highlights code, returning HTML with classed token spans.
    ///
    /// Code is escaped by the generator before markup is added. Languages
    /// without a registered grammar produce plain escaped text.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Highlight`] when syntect fails on a line.
    pub fn highlight(&self, code: &str, language: &str) -> Result<String, RenderError> {
        if code.is_empty() {
            return Ok(String::new());
        }

        let Some(syntax) = self.syntax(language) else {
            return Ok(escape_html(code));
        };

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            ClassStyle::SpacedPrefixed { prefix: "hljs-" },
        );

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| RenderError::Highlight {
                    language: language.to_string(),
                    message: err.to_string(),
                })?;
        }

        Ok(generator.finalize())
    }

    fn syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let language = language.trim().to_ascii_lowercase();
        if !self.languages.contains(&language) {
            return None;
        }
        self.syntax_set
            .find_syntax_by_token(&language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(&language))
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("languages", &self.languages)
            .finish_non_exhaustive()
    }
}
