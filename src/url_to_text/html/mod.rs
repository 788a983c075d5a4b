//! Markup-to-text flattening for generic pages.

use scraper::{ElementRef, Html, Node};

enum Chunk {
    Text(String),
    Break,
}

/// Flatten an HTML document into plain text.
///
/// Scripts, styles and hidden elements are dropped. Visible text is kept in
/// document order, one line per block element.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut chunks = Vec::new();
    collect_text(&document.root_element(), &mut chunks);

    let mut lines = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for chunk in chunks {
        match chunk {
            Chunk::Text(text) => current.push(text),
            Chunk::Break => flush_line(&mut current, &mut lines),
        }
    }
    flush_line(&mut current, &mut lines);

    lines.join("\n")
}

fn flush_line(current: &mut Vec<String>, lines: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    let merged = current.join(" ").trim().to_string();
    if !merged.is_empty() {
        lines.push(merged);
    }
    current.clear();
}

fn collect_text(element: &ElementRef, chunks: &mut Vec<Chunk>) {
    if is_hidden(element) || should_skip_element(element) {
        return;
    }

    let tag_name = element.value().name().to_lowercase();

    if tag_name == "br" {
        chunks.push(Chunk::Break);
        return;
    }

    let block = is_block_element(&tag_name);
    if block {
        chunks.push(Chunk::Break);
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                // html5ever has already decoded character references
                let normalized = normalize_whitespace(text);
                if !normalized.is_empty() {
                    chunks.push(Chunk::Text(normalized));
                }
            }
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, chunks);
                }
            }
            _ => {}
        }
    }

    if block {
        chunks.push(Chunk::Break);
    }
}

fn should_skip_element(element: &ElementRef) -> bool {
    matches!(
        element.value().name(),
        "script"
            | "style"
            | "noscript"
            | "template"
            | "svg"
            | "iframe"
            | "canvas"
            | "meta"
            | "link"
            | "button"
            | "input"
            | "select"
    )
}

fn is_hidden(element: &ElementRef) -> bool {
    element.value().attr("hidden").is_some()
        || element.value().attr("aria-hidden") == Some("true")
        || element
            .value()
            .attr("style")
            .map(|s| {
                let compact = s.replace(' ', "");
                compact.contains("display:none") || compact.contains("visibility:hidden")
            })
            .unwrap_or(false)
}

fn is_block_element(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "td"
            | "th"
            | "title"
            | "tfoot"
            | "tr"
            | "ul"
    )
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
