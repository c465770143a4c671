//! Markdown conversion: HTML rendering, heading anchors, and TOC.

pub mod highlight;

use crate::identity::short_hash;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone)]
struct TocItem {
    level: u32,
    title: String,
    anchor: String,
}

/// Converts article bodies to HTML and to a table of contents.
///
/// Both conversions share the heading-anchor rule, so in-page TOC links and
/// heading ids always agree.
pub struct MarkdownConverter {
    options: Options,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self { options }
    }

    /// Render a markdown body to HTML with heading anchors and highlighted
    /// code blocks
    pub fn to_html(&self, body: &str) -> String {
        let events: Vec<Event> = Parser::new_ext(body, self.options).collect();
        let headings = collect_headings(&events);
        let events = transform_events(events, &headings);

        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }

    /// Render a markdown body to a table-of-contents fragment
    pub fn to_toc(&self, body: &str) -> String {
        let events: Vec<Event> = Parser::new_ext(body, self.options).collect();
        let headings = collect_headings(&events);
        render_toc(&headings)
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Anchor id for a heading, derived from its rendered text.
///
/// The text is alphanumeric-normalized; when the result is not a plain
/// identifier (empty, or not starting with a letter) the heading gets a
/// hashed fallback anchor of fixed short length instead.
fn heading_anchor(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            normalized.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            normalized.push('-');
        }
    }

    let collapsed = normalized
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let plain_identifier = collapsed
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false);

    if plain_identifier {
        collapsed
    } else {
        format!("h{}", short_hash(text))
    }
}

fn collect_headings(events: &[Event]) -> Vec<TocItem> {
    let mut toc = Vec::new();
    let mut current: Option<(u32, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some((*level as u32, String::new()));
            }
            Event::Text(text) => {
                if let Some((_, title)) = current.as_mut() {
                    title.push_str(text.as_ref());
                }
            }
            Event::Code(code) => {
                if let Some((_, title)) = current.as_mut() {
                    title.push_str(code.as_ref());
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, title)) = current.take() {
                    let anchor = heading_anchor(&title);
                    toc.push(TocItem {
                        level,
                        title,
                        anchor,
                    });
                }
            }
            _ => {}
        }
    }

    toc
}

/// Inject heading ids and inline anchor links, and highlight fenced code
/// blocks. Replacement content is owned, so the event lifetime is preserved.
fn transform_events<'a>(events: Vec<Event<'a>>, headings: &[TocItem]) -> Vec<Event<'a>> {
    let mut result = Vec::with_capacity(events.len());
    let mut anchors = headings.iter();
    let mut code: Option<(String, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) if !lang.is_empty() => {
                code = Some((lang.to_string(), String::new()));
            }
            Event::Text(text) if code.is_some() => {
                if let Some((_, content)) = code.as_mut() {
                    content.push_str(text.as_ref());
                }
            }
            Event::End(TagEnd::CodeBlock) if code.is_some() => {
                if let Some((lang, content)) = code.take() {
                    let highlighted = highlight::highlight_code(&content, &lang);
                    result.push(Event::Html(CowStr::Boxed(highlighted.into_boxed_str())));
                }
            }
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let anchor = anchors
                    .next()
                    .map(|item| CowStr::Boxed(item.anchor.clone().into_boxed_str()));
                let id = id.or(anchor);
                result.push(Event::Start(Tag::Heading {
                    level,
                    id: id.clone(),
                    classes,
                    attrs,
                }));
                // Non-top-level headings get an inline anchor link prepended
                if level != HeadingLevel::H1 {
                    if let Some(id) = id {
                        let link = format!(
                            "<a class=\"anchor\" href=\"#{}\" aria-hidden=\"true\">#</a>",
                            id
                        );
                        result.push(Event::Html(CowStr::Boxed(link.into_boxed_str())));
                    }
                }
            }
            other => result.push(other),
        }
    }

    result
}

fn render_toc(headings: &[TocItem]) -> String {
    if headings.is_empty() {
        return String::new();
    }

    let mut out = String::from("<ol class=\"toc\">");
    for heading in headings {
        out.push_str(&format!(
            "<li class=\"toc-item toc-level-{}\"><a class=\"toc-link\" href=\"#{}\"><span class=\"toc-text\">{}</span></a></li>",
            heading.level,
            heading.anchor,
            html_escape(&heading.title)
        ));
    }
    out.push_str("</ol>");
    out
}

pub(crate) fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let converter = MarkdownConverter::new();
        let html = converter.to_html("# Hello World\n\nThis is a **test**.");
        assert!(html.contains("<h1 id=\"hello-world\">"));
        assert!(html.contains("<strong>test</strong>"));
    }

    #[test]
    fn test_top_level_heading_has_no_anchor_link() {
        let converter = MarkdownConverter::new();
        let html = converter.to_html("# Title\n\n## Section\n");
        assert!(!html.contains("href=\"#title\""));
        assert!(html.contains("<a class=\"anchor\" href=\"#section\""));
    }

    #[test]
    fn test_hashed_fallback_anchor() {
        let converter = MarkdownConverter::new();
        let html = converter.to_html("## 2024 Review\n");
        // Normalized text starts with a digit, so the anchor is hashed
        let expected = format!("h{}", crate::identity::short_hash("2024 Review"));
        assert!(html.contains(&format!("id=\"{expected}\"")));
        assert!(html.contains(&format!("href=\"#{expected}\"")));
    }

    #[test]
    fn test_non_latin_heading_gets_hashed_anchor() {
        let converter = MarkdownConverter::new();
        let html = converter.to_html("## 你好\n");
        let expected = format!("h{}", crate::identity::short_hash("你好"));
        assert!(html.contains(&format!("id=\"{expected}\"")));
    }

    #[test]
    fn test_toc_matches_heading_ids() {
        let converter = MarkdownConverter::new();
        let body = "# Intro\n\n## Getting Started\n\n### Details\n";
        let html = converter.to_html(body);
        let toc = converter.to_toc(body);

        for anchor in ["intro", "getting-started", "details"] {
            assert!(html.contains(&format!("id=\"{anchor}\"")));
            assert!(toc.contains(&format!("href=\"#{anchor}\"")));
        }
        assert!(toc.contains("toc-level-1"));
        assert!(toc.contains("toc-level-3"));
    }

    #[test]
    fn test_toc_empty_without_headings() {
        let converter = MarkdownConverter::new();
        assert_eq!(converter.to_toc("just a paragraph"), "");
    }

    #[test]
    fn test_fenced_code_is_highlighted() {
        let converter = MarkdownConverter::new();
        let html = converter.to_html("```rust\nfn main() {}\n```");
        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unfenced_language_passes_through() {
        let converter = MarkdownConverter::new();
        let html = converter.to_html("```\nplain block\n```");
        assert!(html.contains("<pre><code>"));
        assert!(html.contains("plain block"));
    }

    #[test]
    fn test_tables() {
        let converter = MarkdownConverter::new();
        let html = converter.to_html("| A | B |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let converter = MarkdownConverter::new();
        let html = converter.to_html("## Using `serde`\n");
        assert!(html.contains("id=\"using-serde\""));
    }
}
