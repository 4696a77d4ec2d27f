//! Markdown to page-copy conversion.
//!
//! Uses pulldown-cmark for proper CommonMark parsing. Headings stay in the
//! output because they are part of the copy a reader (and a crawler) sees;
//! code, front matter, raw HTML and URLs do not.

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Options for parsing raw files in place, front matter included.
fn source_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

/// Convert markdown into the visible copy, one block per paragraph.
///
/// Removes:
/// - YAML front matter
/// - Code blocks and inline code
/// - Raw HTML
/// - Link and image destinations
///
/// Preserves:
/// - Heading text
/// - Paragraph, list item, blockquote and table cell text
/// - Link text and image alt text
///
/// Block boundaries become blank lines, so paragraph starts in the output
/// line up with paragraphs in the source.
#[tracing::instrument(skip_all, fields(input_len = text.len()))]
pub fn to_copy_text(text: &str) -> String {
    let body = strip_frontmatter(text);

    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(body, options);

    let mut blocks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_code_block = false;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,

            Event::Text(t) if !in_code_block => current.push_str(&t),
            Event::SoftBreak | Event::HardBreak => current.push(' '),
            Event::End(TagEnd::TableCell) => current.push(' '),

            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::TableRow,
            ) => flush(&mut current, &mut blocks),

            _ => {}
        }
    }
    flush(&mut current, &mut blocks);

    blocks.join("\n\n")
}

/// Byte offsets in `text` where a paragraph's text begins.
///
/// Only CommonMark paragraphs count, so front matter, headings, code
/// blocks, thematic breaks and tight list items never receive an insertion.
pub fn paragraph_starts(text: &str) -> Vec<usize> {
    Parser::new_ext(text, source_options())
        .into_offset_iter()
        .filter_map(|(event, range)| {
            matches!(event, Event::Start(Tag::Paragraph)).then_some(range.start)
        })
        .collect()
}

/// Byte ranges in `text` holding visible prose.
///
/// Text events outside code blocks and front matter. Link destinations,
/// inline code and raw HTML are never part of a span.
pub fn prose_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut hidden = 0usize;
    for (event, range) in Parser::new_ext(text, source_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(_) | Tag::MetadataBlock(_)) => hidden += 1,
            Event::End(TagEnd::CodeBlock | TagEnd::MetadataBlock(_)) => {
                hidden = hidden.saturating_sub(1);
            }
            Event::Text(_) if hidden == 0 => spans.push(range),
            _ => {}
        }
    }
    spans
}

fn flush(current: &mut String, blocks: &mut Vec<String>) {
    let block = current.trim();
    if !block.is_empty() {
        blocks.push(block.to_string());
    }
    current.clear();
}

/// Strip YAML front matter delimited by `---` lines.
fn strip_frontmatter(text: &str) -> &str {
    let trimmed = text.trim_start();
    let Some(after_opening) = trimmed.strip_prefix("---") else {
        return text;
    };
    let Some(close_pos) = after_opening.find("\n---") else {
        return text;
    };
    let remainder = &after_opening[close_pos + 4..];
    remainder.strip_prefix('\n').unwrap_or(remainder)
}
