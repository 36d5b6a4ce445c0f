//! Linear fence scanner: first match wins, no nesting.

use super::{CodeSegment, FENCE, Segment};
use crate::core::classify::classify;

/// A fence located in the source, before language resolution.
struct RawBlock<'a> {
    start: usize,
    end: usize,
    tag: Option<&'a str>,
    body: &'a str,
}

/// Parse message content into text and code block segments.
/// Matches ```lang\n ... ``` or ```\n ... ``` patterns; an unterminated fence stays text.
pub fn segment(message: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    let mut index = 0;
    while let Some(block) = next_block(message, cursor) {
        push_text(&mut segments, &message[cursor..block.start]);
        let content = strip_closing_newline(block.body);
        let (language, explicit_language) = match block.tag {
            Some(tag) => (tag, true),
            None => (classify(content), false),
        };
        segments.push(Segment::Code(CodeSegment {
            language,
            content,
            index,
            explicit_language,
            span: block.start..block.end,
        }));
        index += 1;
        cursor = block.end;
    }
    push_text(&mut segments, &message[cursor..]);
    segments
}

/// Empty text is dropped so back-to-back fences don't produce a spurious segment.
fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Text { content: text });
    }
}

/// Find the next complete fence at or after `from`.
fn next_block(message: &str, from: usize) -> Option<RawBlock<'_>> {
    let mut pos = from;
    loop {
        let open = pos + message[pos..].find(FENCE)?;
        let after_open = open + FENCE.len();
        let Some((tag, header_len)) = opening_line(&message[after_open..]) else {
            // Not an opener here; a later marker may still start a block.
            pos = open + 1;
            continue;
        };
        let body_start = after_open + header_len;
        // No closing marker means no later opener can close either.
        let close = body_start + message[body_start..].find(FENCE)?;
        return Some(RawBlock {
            start: open,
            end: close + FENCE.len(),
            tag,
            body: &message[body_start..close],
        });
    }
}

/// Parse the rest of the opening line: optional tag, then a newline.
/// Returns the tag and the number of bytes consumed (tag plus line ending).
fn opening_line(rest: &str) -> Option<(Option<&str>, usize)> {
    let tag_len = rest
        .find(|c: char| c.is_whitespace() || c == '`')
        .unwrap_or(rest.len());
    let after_tag = &rest[tag_len..];
    let newline_len = if after_tag.starts_with('\n') {
        1
    } else if after_tag.starts_with("\r\n") {
        2
    } else {
        return None;
    };
    let tag = (tag_len > 0).then(|| &rest[..tag_len]);
    Some((tag, tag_len + newline_len))
}

/// Strip exactly one line ending left by a closing fence on its own line.
fn strip_closing_newline(body: &str) -> &str {
    match body.strip_suffix('\n') {
        Some(stripped) => stripped.strip_suffix('\r').unwrap_or(stripped),
        None => body,
    }
}
