//! HTML text extraction: strip every tag, keep the rendered text.
//!
//! Text nodes are concatenated in document order with no whitespace
//! normalisation, so `<p>Olá mundo</p>` yields exactly `Olá mundo`.
//! Contents of `script`, `style`, `noscript` and `template` are not rendered
//! text and are skipped.

use crate::error::ExtractionError;
use scraper::{Html, Node};
use tracing::debug;

const NON_RENDERED: [&str; 4] = ["script", "style", "noscript", "template"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Extract the text content of an HTML document.
///
/// The bytes must be valid UTF-8; anything else is reported as malformed.
pub async fn extract_html(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_html_blocking(&bytes))
        .await
        .map_err(|e| ExtractionError::malformed(format!("HTML task panicked: {e}")))?
}

fn extract_html_blocking(bytes: &[u8]) -> Result<String, ExtractionError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let source = std::str::from_utf8(bytes)
        .map_err(|e| ExtractionError::malformed(format!("invalid UTF-8 in HTML: {e}")))?;

    let text = strip_tags(source);
    debug!("HTML: {} bytes → {} chars", bytes.len(), text.chars().count());
    Ok(text)
}

/// Concatenate every rendered text node of `source`.
pub fn strip_tags(source: &str) -> String {
    let document = Html::parse_document(source);
    let mut text = String::new();

    for node in document.tree.root().descendants() {
        let Node::Text(t) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| match a.value() {
            Node::Element(e) => NON_RENDERED.contains(&e.name()),
            _ => false,
        });
        if !hidden {
            text.push_str(t);
        }
    }

    text
}
