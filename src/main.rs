use anyhow::{Context, Result};
use blogmark::{Config, MarkdownRenderer, preview};
use std::fs;
use std::io::{self, Read, Write};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::parse();

    // --verbose shows renderer debug logs, otherwise RUST_LOG or warnings only
    let filter = if config.verbose {
        EnvFilter::new("blogmark=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    config.validate().context("Invalid configuration")?;

    let markdown = match &config.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read markdown file: {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read markdown from stdin")?;
            buffer
        }
    };

    let renderer = MarkdownRenderer::with_options(config.render_options());
    let fragment = renderer
        .render(&markdown)
        .context("Failed to render markdown")?;

    let html = if config.standalone {
        preview::page(&config.page_title(), &fragment).into_string()
    } else {
        fragment
    };

    match &config.output {
        Some(path) => {
            fs::write(path, &html).with_context(|| format!("Failed to write output: {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = html.len(), "Wrote HTML");

            if config.open {
                open::that(path).with_context(|| format!("Failed to open {}", path.display()))?;
            }
        }
        None => io::stdout()
            .write_all(html.as_bytes())
            .context("Failed to write HTML to stdout")?,
    }

    Ok(())
}
