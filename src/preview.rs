//! Standalone HTML page around a rendered fragment.

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Stylesheet for alerts, task lists, heading anchors and token classes.
const STYLESHEET: &str = include_str!("../assets/preview.css");

/// Wraps rendered markdown in a complete HTML document.
///
/// The title is escaped; `body_html` is trusted renderer output and is
/// embedded as is.
///
/// # Arguments
///
/// * `title`: Page title text
/// * `body_html`: HTML fragment from the renderer
pub fn page(title: &str, body_html: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                article class="markdown-body" {
                    (PreEscaped(body_html))
                }
            }
        }
    }
}
