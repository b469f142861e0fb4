//! Heading outline of a markdown document

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// One heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// 1 for `#`, 6 for `######`
    pub level: u8,
    /// Heading text with inline markup stripped
    pub title: String,
}

/// Parse markdown and return its headings in document order
#[must_use]
pub fn outline(markdown: &str) -> Vec<Heading> {
    let mut headings = Vec::new();
    let mut current: Option<Heading> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some(Heading {
                    level: level as u8,
                    title: String::new(),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = current.as_mut() {
                    heading.title.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = current.take() {
                    headings.push(heading);
                }
            }
            _ => {}
        }
    }
    headings
}

/// Titles of the headings at one level
#[must_use]
pub fn titles_at(headings: &[Heading], level: u8) -> Vec<&str> {
    headings
        .iter()
        .filter(|h| h.level == level)
        .map(|h| h.title.as_str())
        .collect()
}
