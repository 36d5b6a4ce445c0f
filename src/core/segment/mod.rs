//! Message segmentation: split content into text and fenced code blocks.

mod scanner;

pub use scanner::segment;

use std::ops::Range;

use serde::Serialize;

/// Fence delimiter opening and closing a code block.
pub const FENCE: &str = "```";

/// Segment of a message: either plain text or a fenced code block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment<'a> {
    /// Literal prose, verbatim (whitespace included).
    Text { content: &'a str },
    Code(CodeSegment<'a>),
}

/// A fenced code block extracted from a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSegment<'a> {
    /// Explicit fence tag, or the classifier's guess when the fence had none.
    pub language: &'a str,
    /// Code between the fences, minus the newline after the tag and one newline before the close.
    pub content: &'a str,
    /// Zero-based ordinal of this block within the message; key for copy state.
    pub index: usize,
    /// True when `language` came from the fence itself.
    pub explicit_language: bool,
    /// Byte range of the whole fence (markers included) in the source message.
    pub span: Range<usize>,
}

impl<'a> Segment<'a> {
    pub fn as_code(&self) -> Option<&CodeSegment<'a>> {
        match self {
            Segment::Code(code) => Some(code),
            Segment::Text { .. } => None,
        }
    }

    /// Displayable content of either variant.
    pub fn content(&self) -> &'a str {
        match self {
            Segment::Text { content } => *content,
            Segment::Code(code) => code.content,
        }
    }
}

/// Code segments in index order.
pub fn code_blocks<'s, 'a>(
    segments: &'s [Segment<'a>],
) -> impl Iterator<Item = &'s CodeSegment<'a>> {
    segments.iter().filter_map(Segment::as_code)
}

/// Rebuild a message from its segments, writing each code block as a canonical fence.
/// Inferred languages are not written back, so untagged fences stay untagged.
pub fn reassemble(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Text { content } => out.push_str(content),
            Segment::Code(code) => {
                out.push_str(FENCE);
                if code.explicit_language {
                    out.push_str(code.language);
                }
                out.push('\n');
                out.push_str(code.content);
                out.push('\n');
                out.push_str(FENCE);
            }
        }
    }
    out
}
