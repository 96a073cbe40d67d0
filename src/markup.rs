//! Reduces upstream HTML fragments to terminal-safe plain text.
//!
//! Job descriptions and excerpts arrive as rich text. Nothing here ever passes
//! markup through: every fragment is parsed with `scraper` and only its text
//! nodes survive, so injected tags or scripts cannot reach the screen.

use regex::Regex;
use scraper::{Html, Node};
use std::sync::LazyLock;

static INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid inline whitespace pattern"));
static ANY_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

const BLOCK_ELEMENTS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "tr", "blockquote", "section",
];
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Converts an HTML fragment to plain text, keeping paragraph and list breaks.
pub fn to_plain_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(html);
    let mut raw = String::new();

    for node in fragment.root_element().descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
                });
                if !hidden {
                    raw.push_str(text);
                }
            }
            Node::Element(el) if el.name() == "li" => raw.push_str("\n- "),
            Node::Element(el) if BLOCK_ELEMENTS.contains(&el.name()) => raw.push('\n'),
            _ => {}
        }
    }

    let mut out: Vec<String> = Vec::new();
    for line in raw.lines() {
        let line = INLINE_SPACE.replace_all(line, " ").trim().to_string();
        // Collapse runs of blank lines to a single separator.
        if line.is_empty() && out.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Plain text with all whitespace, newlines included, collapsed to single spaces.
pub fn to_single_line(html: &str) -> String {
    ANY_SPACE
        .replace_all(&to_plain_text(html), " ")
        .trim()
        .to_string()
}

/// Truncates to at most `budget` characters (not bytes).
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => text[..idx].trim_end(),
        None => text,
    }
}
