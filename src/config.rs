//! Command line configuration.

use anyhow::{Result, bail};
use clap::Parser;
use std::path::PathBuf;

use crate::options::RenderOptions;

/// Command line configuration for blogmark.
#[derive(Debug, Clone, Parser)]
#[command(name = "blogmark", version, about, long_about = None)]
pub struct Config {
    /// Markdown file to render (reads stdin when omitted)
    pub input: Option<PathBuf>,

    /// Output file (writes stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Wrap the fragment in a complete HTML page
    #[arg(long)]
    pub standalone: bool,

    /// Page title for standalone output
    #[arg(long)]
    pub title: Option<String>,

    /// Open the written file in the browser
    #[arg(long)]
    pub open: bool,

    /// Log parser fallbacks and stage activity
    #[arg(short, long)]
    pub verbose: bool,

    /// Comma separated languages to highlight
    #[arg(long, value_delimiter = ',')]
    pub languages: Option<Vec<String>>,

    /// Disable pipe tables
    #[arg(long)]
    pub no_tables: bool,

    /// Disable task list checkboxes
    #[arg(long)]
    pub no_task_lists: bool,

    /// Disable ~~strikethrough~~
    #[arg(long)]
    pub no_strikethrough: bool,

    /// Disable heading ids
    #[arg(long)]
    pub no_anchors: bool,

    /// Disable heading link icons
    #[arg(long)]
    pub no_link_icons: bool,

    /// Disable image size suffixes
    #[arg(long)]
    pub no_image_sizing: bool,

    /// Disable alert blockquotes
    #[arg(long)]
    pub no_alerts: bool,

    /// Escape raw HTML instead of passing it through
    #[arg(long)]
    pub no_raw_html: bool,

    /// Disable bare URL links
    #[arg(long)]
    pub no_autolinks: bool,

    /// Keep single newlines as soft breaks
    #[arg(long)]
    pub no_breaks: bool,

    /// Disable smart quotes and dash replacements
    #[arg(long)]
    pub no_typographer: bool,
}

impl Config {
    /// Parses configuration from command line arguments.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Validates configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the input file does not exist or `--open` is given
    /// without an output file.
    pub fn validate(&self) -> Result<()> {
        if let Some(input) = &self.input
            && !input.is_file()
        {
            bail!("Input file does not exist: {}", input.display());
        }

        if self.open && self.output.is_none() {
            bail!("--open requires --output");
        }

        Ok(())
    }

    /// Maps the flags onto renderer options.
    pub fn render_options(&self) -> RenderOptions {
        let options = RenderOptions {
            tables: !self.no_tables,
            task_lists: !self.no_task_lists,
            strikethrough: !self.no_strikethrough,
            heading_anchors: !self.no_anchors,
            heading_link_icons: !self.no_anchors && !self.no_link_icons,
            image_sizing: !self.no_image_sizing,
            alert_blocks: !self.no_alerts,
            raw_html: !self.no_raw_html,
            autolinks: !self.no_autolinks,
            hard_breaks: !self.no_breaks,
            typographer: !self.no_typographer,
            ..RenderOptions::default()
        };

        match &self.languages {
            Some(languages) => options.with_languages(languages),
            None => options,
        }
    }

    /// Title for standalone output: `--title`, else the input file stem.
    pub fn page_title(&self) -> String {
        self.title
            .clone()
            .or_else(|| {
                self.input
                    .as_ref()
                    .and_then(|path| path.file_stem())
                    .and_then(|stem| stem.to_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| "Preview".to_string())
    }
}
