//! Visible-text extraction from crawled HTML.

use scraper::{Html, Node};

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "meta", "noscript"];

/// Collect the text a reader would see, skipping scripts, styles and comments.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut chunks = Vec::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(el) if HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden && !text.trim().is_empty() {
            chunks.push(text.trim().to_string());
        }
    }
    clear_text(&chunks.join("\n"))
}

/// Turn tabs into sentence breaks, newlines into spaces and collapse whitespace.
pub fn clear_text(text: &str) -> String {
    text.replace('\t', ". ")
        .replace('\n', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
