//! Web page text extraction

use crate::error::ExtractError;
use scraper::{ElementRef, Html, Selector};

/// Turns raw page bytes into readable text
pub trait MarkupExtractor: Send + Sync {
    fn extract_text(&self, raw: &[u8]) -> Result<String, ExtractError>;
}

const CONTENT_SELECTORS: [&str; 8] = [
    "article",
    "main",
    "[role='main']",
    ".content",
    ".post-content",
    ".article-content",
    "#content",
    "#main",
];

const SKIP_TAGS: [&str; 11] = [
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "svg", "iframe",
    "template",
];

const BLOCK_TAGS: [&str; 18] = [
    "p", "div", "section", "article", "main", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li",
    "ul", "ol", "pre", "blockquote", "tr",
];

/// [`MarkupExtractor`] built on `scraper`
///
/// Prefers main-content containers and falls back to `<body>`. With
/// formatting enabled, headings become `#`-prefixed lines, list items become
/// `- ` lines and paragraphs stay separated by a blank line.
#[derive(Debug, Clone)]
pub struct ScraperExtractor {
    include_formatting: bool,
}

impl Default for ScraperExtractor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ScraperExtractor {
    pub fn new(include_formatting: bool) -> Self {
        Self { include_formatting }
    }

    fn extract_document(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut raw = String::new();

        for selector_str in CONTENT_SELECTORS {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };
            for element in document.select(&selector) {
                self.walk(element, &mut raw);
            }
            if !raw.trim().is_empty() {
                break;
            }
            raw.clear();
        }

        if raw.trim().is_empty() {
            if let Ok(body) = Selector::parse("body") {
                for element in document.select(&body) {
                    self.walk(element, &mut raw);
                }
            }
        }

        clean_text(&raw, self.include_formatting)
    }

    #[allow(clippy::only_used_in_recursion)]
    fn walk(&self, element: ElementRef<'_>, out: &mut String) {
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                let tag = child_element.value().name();
                if SKIP_TAGS.contains(&tag) {
                    continue;
                }

                let heading = heading_level(tag);
                let block = BLOCK_TAGS.contains(&tag);
                let paragraph = self.include_formatting && (tag == "p" || heading.is_some());

                if paragraph {
                    push_break(out);
                } else if block {
                    push_newline(out);
                }
                if self.include_formatting {
                    if let Some(level) = heading {
                        out.push_str(&"#".repeat(level));
                        out.push(' ');
                    } else if tag == "li" {
                        out.push_str("- ");
                    }
                }

                self.walk(child_element, out);

                if paragraph {
                    push_break(out);
                } else if block {
                    push_newline(out);
                }
            } else if let Some(text) = child.value().as_text() {
                push_text(out, text);
            }
        }
    }
}

impl MarkupExtractor for ScraperExtractor {
    fn extract_text(&self, raw: &[u8]) -> Result<String, ExtractError> {
        let html = String::from_utf8_lossy(raw);
        let text = self.extract_document(&html);
        if text.is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(text)
    }
}

fn ends_in_space(out: &str) -> bool {
    out.is_empty() || out.ends_with(|c: char| c == '\n' || c == ' ')
}

/// Append a text node; source line breaks are layout, not structure
fn push_text(out: &mut String, text: &str) {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let leading = text.starts_with(char::is_whitespace);
    let trailing = text.ends_with(char::is_whitespace);

    if collapsed.is_empty() {
        if leading && !ends_in_space(out) {
            out.push(' ');
        }
        return;
    }
    if leading && !ends_in_space(out) {
        out.push(' ');
    }
    out.push_str(&collapsed);
    if trailing {
        out.push(' ');
    }
}

fn push_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn push_break(out: &mut String) {
    if out.is_empty() {
        return;
    }
    while out.ends_with(' ') {
        out.pop();
    }
    push_newline(out);
    if !out.ends_with("\n\n") {
        out.push('\n');
    }
}

fn heading_level(tag: &str) -> Option<usize> {
    let level = tag.strip_prefix('h')?.parse::<usize>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Collapse whitespace within lines and drop blank lines; blank-line runs
/// become a single paragraph break when `keep_breaks` is set
fn clean_text(text: &str, keep_breaks: bool) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_break = false;

    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            pending_break = !result.is_empty();
            continue;
        }
        if !result.is_empty() {
            result.push_str(if keep_breaks && pending_break { "\n\n" } else { "\n" });
        }
        result.push_str(&line);
        pending_break = false;
    }

    result
}
