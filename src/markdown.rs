//! Assistant-text markdown parsing
//!
//! A pure parse step that turns response text into an ordered list of
//! typed inline nodes. Rendering belongs to the view layer; keeping the
//! parse separate makes it testable without one.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Typed inline node of an assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    Text(String),
    Bold(String),
    Link { label: String, url: String },
    Image { alt: String, url: String },
}

/// Parse message text into inline nodes.
///
/// Block structure is flattened: paragraphs and line breaks become newline
/// text, everything the view does not style (headings, lists, code) comes
/// through as plain text.
pub fn parse_inline(text: &str) -> Vec<InlineNode> {
    let mut nodes: Vec<InlineNode> = Vec::new();
    let mut bold_depth = 0usize;
    // (url, accumulated label/alt) while inside a link or image span.
    let mut link: Option<(String, String)> = None;
    let mut image: Option<(String, String)> = None;
    let mut emitted_block = false;

    for event in Parser::new(text) {
        match event {
            Event::Start(Tag::Paragraph) => {
                if emitted_block {
                    push_text(&mut nodes, "\n");
                }
                emitted_block = true;
            }
            Event::Start(Tag::Strong) => bold_depth += 1,
            Event::End(TagEnd::Strong) => bold_depth = bold_depth.saturating_sub(1),
            Event::Start(Tag::Link { dest_url, .. }) => {
                link = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Link) => {
                if let Some((url, label)) = link.take() {
                    nodes.push(InlineNode::Link { label, url });
                }
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                image = Some((dest_url.to_string(), String::new()));
            }
            Event::End(TagEnd::Image) => {
                if let Some((url, alt)) = image.take() {
                    nodes.push(InlineNode::Image { alt, url });
                }
            }
            Event::Text(t) | Event::Code(t) => {
                if let Some((_, alt)) = image.as_mut() {
                    alt.push_str(&t);
                } else if let Some((_, label)) = link.as_mut() {
                    label.push_str(&t);
                } else if bold_depth > 0 {
                    push_bold(&mut nodes, &t);
                } else {
                    push_text(&mut nodes, &t);
                }
            }
            Event::SoftBreak | Event::HardBreak => push_text(&mut nodes, "\n"),
            _ => {}
        }
    }
    nodes
}

fn push_text(nodes: &mut Vec<InlineNode>, text: &str) {
    if let Some(InlineNode::Text(existing)) = nodes.last_mut() {
        existing.push_str(text);
    } else {
        nodes.push(InlineNode::Text(text.to_string()));
    }
}

fn push_bold(nodes: &mut Vec<InlineNode>, text: &str) {
    if let Some(InlineNode::Bold(existing)) = nodes.last_mut() {
        existing.push_str(text);
    } else {
        nodes.push(InlineNode::Bold(text.to_string()));
    }
}
