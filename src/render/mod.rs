//! Rendering layer: segments to styled lines with labeled, copyable code blocks.

mod syntax;
mod wrap;

pub use wrap::wrap_message;

use std::ops::Range;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::config::{Config, DEFAULT_THEME};
use crate::core::copy_state::{COPIED_LABEL, COPY_LABEL};
use crate::core::segment::{CodeSegment, Segment};

/// Accent green color (#98FB98).
pub(crate) const ACCENT: Color = Color::Rgb(152, 251, 152);

/// Secondary accent: soft cyan (#7EC8E3) that pairs well with the green.
pub(crate) const ACCENT_SECONDARY: Color = Color::Rgb(126, 200, 227);

/// Width used when the caller has no terminal size.
pub const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Total columns available, borders included.
    pub width: usize,
    pub highlight: bool,
    pub theme: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            highlight: true,
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl RenderOptions {
    pub fn from_config(config: &Config, width: usize) -> Self {
        Self {
            width,
            highlight: config.highlight,
            theme: config.theme.clone(),
        }
    }
}

/// Where a code block landed in the rendered lines; used for click hit testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRegion {
    /// `CodeSegment::index` of the block.
    pub index: usize,
    /// Line holding the language and copy labels.
    pub header_line: usize,
    /// All lines of the block, header and footer included.
    pub lines: Range<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderedMessage {
    pub lines: Vec<Line<'static>>,
    pub code_regions: Vec<CodeRegion>,
}

impl RenderedMessage {
    /// Index of the code block covering display line `line`, if any.
    pub fn code_block_at(&self, line: usize) -> Option<usize> {
        self.code_regions
            .iter()
            .find(|region| region.lines.contains(&line))
            .map(|region| region.index)
    }

    /// Lines without styling, joined with `\n`.
    pub fn to_plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Lines with 24-bit ANSI colors and bold/italic/underline, joined with `\n`.
    pub fn to_ansi_text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for span in &line.spans {
                push_ansi_span(&mut out, span);
            }
        }
        out
    }
}

fn push_ansi_span(out: &mut String, span: &Span<'_>) {
    let mut codes = Vec::new();
    let modifiers = span.style.add_modifier;
    if modifiers.contains(Modifier::BOLD) {
        codes.push("1".to_string());
    }
    if modifiers.contains(Modifier::ITALIC) {
        codes.push("3".to_string());
    }
    if modifiers.contains(Modifier::UNDERLINED) {
        codes.push("4".to_string());
    }
    if let Some(Color::Rgb(r, g, b)) = span.style.fg {
        codes.push(format!("38;2;{};{};{}", r, g, b));
    }
    if codes.is_empty() {
        out.push_str(&span.content);
    } else {
        out.push_str(&format!(
            "\x1b[{}m{}\x1b[0m",
            codes.join(";"),
            span.content
        ));
    }
}

/// Repeat a character to fill width (approximate; chars may have different display widths).
fn repeat_char(c: char, n: usize) -> String {
    std::iter::repeat_n(c, n).collect()
}

/// Render a segmented message. `is_copied` answers the copy state of each code block.
pub fn render_message(
    segments: &[Segment<'_>],
    options: &RenderOptions,
    is_copied: impl Fn(usize) -> bool,
) -> RenderedMessage {
    let mut rendered = RenderedMessage::default();
    for segment in segments {
        match segment {
            Segment::Text { content } => {
                add_text_lines(&mut rendered.lines, content, options.width)
            }
            Segment::Code(code) => {
                let copied = is_copied(code.index);
                let region = add_code_block(&mut rendered.lines, code, options, copied);
                rendered.code_regions.push(region);
            }
        }
    }
    rendered
}

/// Prose is shown verbatim; only the blank lines hugging a fence are left out.
fn add_text_lines(lines: &mut Vec<Line<'static>>, text: &str, width: usize) {
    let text = text.trim_matches(['\n', '\r']);
    if text.is_empty() {
        return;
    }
    for chunk in wrap_message(text, width) {
        lines.push(Line::from(Span::raw(chunk)));
    }
}

fn add_code_block(
    lines: &mut Vec<Line<'static>>,
    code: &CodeSegment<'_>,
    options: &RenderOptions,
    copied: bool,
) -> CodeRegion {
    let border_style = Style::default().fg(ACCENT_SECONDARY);
    let width = options.width.max(4);
    let inner_width = width.saturating_sub(2);
    let start = lines.len();

    // Header: "┌─ lang ─────── Copy ─┐"
    let (label, label_style) = if copied {
        (
            COPIED_LABEL,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )
    } else {
        (COPY_LABEL, border_style)
    };
    let lang_part = format!("┌─ {} ", code.language);
    let label_part = format!(" {} ", label);
    let fill =
        width.saturating_sub(lang_part.chars().count() + label_part.chars().count() + 2);
    lines.push(Line::from(vec![
        Span::styled(lang_part, border_style.add_modifier(Modifier::BOLD)),
        Span::styled(repeat_char('─', fill), border_style),
        Span::styled(label_part, label_style),
        Span::styled("─┐".to_string(), border_style),
    ]));

    let highlighted = if options.highlight {
        syntax::highlight_code(code.language, code.content, &options.theme)
    } else {
        syntax::plain_code(code.content)
    };
    // Line numbers are right-aligned to the widest one; continuation chunks get a blank gutter.
    let digits = highlighted.len().max(1).to_string().len();
    let gutter_style = Style::default().fg(Color::DarkGray);
    let code_width = inner_width.saturating_sub(digits + 1).max(1);
    for (number, spans) in highlighted.iter().enumerate() {
        let len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        for (chunk, (from, to)) in wrap::column_chunks(len, code_width).into_iter().enumerate() {
            let gutter = if chunk == 0 {
                format!("{:>digits$} ", number + 1)
            } else {
                " ".repeat(digits + 1)
            };
            let mut line = vec![
                Span::styled("│ ".to_string(), border_style),
                Span::styled(gutter, gutter_style),
            ];
            line.extend(syntax::slice_spans_by_range(spans, from, to));
            lines.push(Line::from(line));
        }
    }

    let footer = format!("└{}┘", repeat_char('─', width.saturating_sub(2)));
    lines.push(Line::from(Span::styled(footer, border_style)));

    CodeRegion {
        index: code.index,
        header_line: start,
        lines: start..lines.len(),
    }
}
