//! Process-wide rendering configuration.

use std::collections::BTreeSet;

/// Fence languages highlighted by the default configuration.
///
/// Every entry resolves against syntect's bundled syntax definitions.
pub const DEFAULT_HIGHLIGHT_LANGUAGES: &[&str] = &[
    "bash",
    "c",
    "cpp",
    "css",
    "diff",
    "go",
    "html",
    "java",
    "javascript",
    "js",
    "json",
    "python",
    "ruby",
    "rust",
    "sh",
    "sql",
    "xml",
    "yaml",
];

/// Extension switches and highlight grammars for a renderer.
///
/// Fixed when the renderer is built and never mutated afterwards. The
/// default enables every extension, matching the production deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pipe tables with an alignment separator row.
    pub tables: bool,
    /// `- [ ]` and `- [x]` list items.
    pub task_lists: bool,
    /// `~~text~~` spans.
    pub strikethrough: bool,
    /// Collision-free `id` attributes on headings.
    pub heading_anchors: bool,
    /// Link icon after each anchored heading. Has no effect on ids.
    pub heading_link_icons: bool,
    /// `![alt](src =WxH)` and `![alt](src =W%)` suffixes.
    pub image_sizing: bool,
    /// `> [!NOTE]` style alert blockquotes.
    pub alert_blocks: bool,
    /// Raw HTML blocks and inline tags pass through verbatim.
    pub raw_html: bool,
    /// Bare URL detection in text.
    pub autolinks: bool,
    /// Newlines inside paragraphs become `<br>`.
    pub hard_breaks: bool,
    /// Smart quotes and dash/ellipsis replacements.
    pub typographer: bool,
    /// Fence languages that receive highlighting markup.
    pub highlight_languages: BTreeSet<String>,
}

impl RenderOptions {
    /// Returns options with every extension disabled and no highlight grammars.
    pub fn minimal() -> Self {
        Self {
            tables: false,
            task_lists: false,
            strikethrough: false,
            heading_anchors: false,
            heading_link_icons: false,
            image_sizing: false,
            alert_blocks: false,
            raw_html: false,
            autolinks: false,
            hard_breaks: false,
            typographer: false,
            highlight_languages: BTreeSet::new(),
        }
    }

    /// Replaces the registered highlight languages.
    ///
    /// Names are lowercased so fence tags match case-insensitively.
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.highlight_languages = languages
            .into_iter()
            .map(|lang| lang.as_ref().trim().to_ascii_lowercase())
            .filter(|lang| !lang.is_empty())
            .collect();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tables: true,
            task_lists: true,
            strikethrough: true,
            heading_anchors: true,
            heading_link_icons: true,
            image_sizing: true,
            alert_blocks: true,
            raw_html: true,
            autolinks: true,
            hard_breaks: true,
            typographer: true,
            highlight_languages: BTreeSet::new(),
        }
        .with_languages(DEFAULT_HIGHLIGHT_LANGUAGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_everything() {
        // Arrange & Act
        let options = RenderOptions::default();

        // Assert
        assert!(options.tables);
        assert!(options.task_lists);
        assert!(options.strikethrough);
        assert!(options.heading_anchors);
        assert!(options.image_sizing);
        assert!(options.alert_blocks);
        assert!(options.highlight_languages.contains("rust"));
        assert_eq!(
            options.highlight_languages.len(),
            DEFAULT_HIGHLIGHT_LANGUAGES.len()
        );
    }

    #[test]
    fn test_minimal_disables_everything() {
        // Arrange & Act
        let options = RenderOptions::minimal();

        // Assert
        assert!(!options.tables);
        assert!(!options.typographer);
        assert!(options.highlight_languages.is_empty());
    }

    #[test]
    fn test_with_languages_normalizes_names() {
        // Arrange
        let options = RenderOptions::minimal();

        // Act
        let options = options.with_languages([" Rust ", "PYTHON", ""]);

        // Assert
        let languages: Vec<&str> = options
            .highlight_languages
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(languages, vec!["python", "rust"]);
    }
}
