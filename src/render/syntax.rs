//! Syntax highlighting for code blocks using syntect.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use super::ACCENT_SECONDARY;

/// Convert syntect Color to ratatui Color. Alpha 0 => None (colourless).
fn translate_colour(c: syntect::highlighting::Color) -> Option<Color> {
    let syntect::highlighting::Color { r, g, b, a } = c;
    if a > 0 { Some(Color::Rgb(r, g, b)) } else { None }
}

/// Convert syntect FontStyle to ratatui Modifier.
fn translate_font_style(f: FontStyle) -> Modifier {
    let mut m = Modifier::empty();
    if f.contains(FontStyle::BOLD) {
        m.insert(Modifier::BOLD);
    }
    if f.contains(FontStyle::ITALIC) {
        m.insert(Modifier::ITALIC);
    }
    if f.contains(FontStyle::UNDERLINE) {
        m.insert(Modifier::UNDERLINED);
    }
    m
}

/// Foreground and font style only; the block keeps the terminal background.
fn translate_style(s: syntect::highlighting::Style) -> Style {
    let fg = translate_colour(s.foreground).unwrap_or(ACCENT_SECONDARY);
    Style::default()
        .fg(fg)
        .add_modifier(translate_font_style(s.font_style))
}

static SYNTAX_SET: std::sync::OnceLock<SyntaxSet> = std::sync::OnceLock::new();
static THEME_SET: std::sync::OnceLock<ThemeSet> = std::sync::OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Map a language tag (explicit or classified) to a syntect extension.
fn lang_to_extension(lang: &str) -> Option<&'static str> {
    let ext = match lang.trim().to_lowercase().as_str() {
        "rs" | "rust" => "rs",
        "py" | "python" | "python3" => "py",
        "js" | "javascript" | "jsx" => "js",
        "ts" | "typescript" => "ts",
        "java" => "java",
        "go" | "golang" => "go",
        "rb" | "ruby" => "rb",
        "sh" | "bash" | "zsh" => "sh",
        "sql" => "sql",
        "json" => "json",
        "yaml" | "yml" => "yml",
        "toml" => "toml",
        "md" | "markdown" => "md",
        "html" => "html",
        "css" => "css",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "c++" => "cpp",
        _ => return None,
    };
    Some(ext)
}

fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let ps = syntax_set();
    match lang_to_extension(lang) {
        Some(ext) => ps.find_syntax_by_extension(ext),
        None => ps.find_syntax_by_token(lang.trim()),
    }
}

fn find_theme(name: &str) -> Option<&'static Theme> {
    let ts = theme_set();
    ts.themes.get(name).or_else(|| {
        log::warn!("Unknown highlight theme {:?}, using the first available", name);
        ts.themes.values().next()
    })
}

fn plain_line(line: &str) -> Vec<Span<'static>> {
    vec![Span::styled(
        line.to_string(),
        Style::default().fg(ACCENT_SECONDARY),
    )]
}

/// Plain styling for every line of `code`, one entry per `\n`-separated line.
pub(super) fn plain_code(code: &str) -> Vec<Vec<Span<'static>>> {
    code.split('\n').map(plain_line).collect()
}

/// Highlight `code` line by line, carrying parser state across lines.
/// Unknown languages, unknown themes and highlighter errors fall back to plain styling.
pub(super) fn highlight_code(lang: &str, code: &str, theme: &str) -> Vec<Vec<Span<'static>>> {
    let (Some(syntax), Some(theme)) = (find_syntax(lang), find_theme(theme)) else {
        return plain_code(code);
    };
    let ps = syntax_set();
    let mut h = HighlightLines::new(syntax, theme);

    let mut out = Vec::new();
    for line in code.split('\n') {
        let line_with_ending = format!("{}\n", line);
        let ranges = match h.highlight_line(&line_with_ending, ps) {
            Ok(ranges) => ranges,
            Err(e) => {
                log::warn!("Highlighting {} failed: {}", lang, e);
                return plain_code(code);
            }
        };
        let spans = ranges
            .into_iter()
            .filter_map(|(style, text)| {
                let text = text.trim_end_matches(['\n', '\r']);
                (!text.is_empty()).then(|| Span::styled(text.to_string(), translate_style(style)))
            })
            .collect();
        out.push(spans);
    }
    out
}

/// Slice spans to cover only the character range [range_start, range_end).
/// Used when wrapping code lines: each wrap chunk gets the spans for its character slice.
pub(super) fn slice_spans_by_range(
    spans: &[Span<'static>],
    range_start: usize,
    range_end: usize,
) -> Vec<Span<'static>> {
    let mut result = Vec::new();
    let mut pos = 0;
    for span in spans {
        let s = span.content.as_ref();
        let len = s.chars().count();
        let span_end = pos + len;
        if span_end <= range_start || pos >= range_end {
            pos = span_end;
            continue;
        }
        let take_start = range_start.saturating_sub(pos);
        let take_end = (range_end - pos).min(len);
        if take_start < take_end {
            let sliced: String = s
                .chars()
                .skip(take_start)
                .take(take_end - take_start)
                .collect();
            result.push(Span::styled(sliced, span.style));
        }
        pos = span_end;
    }
    result
}

#[cfg(test)]
mod tests {
    use ratatui::text::Span;

    use super::{highlight_code, lang_to_extension, plain_code, slice_spans_by_range};

    fn text_of(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn classifier_tags_map_to_extensions() {
        for tag in ["jsx", "python", "javascript", "java", "cpp", "sql"] {
            assert!(lang_to_extension(tag).is_some(), "{}", tag);
        }
        assert_eq!(lang_to_extension("text"), None);
    }

    #[test]
    fn highlight_keeps_text_and_line_count() {
        let code = "fn main() {\n    let x = 1;\n}";
        let lines = highlight_code("rust", code, "base16-ocean.dark");
        assert_eq!(lines.len(), 3);
        assert_eq!(text_of(&lines[0]), "fn main() {");
        assert_eq!(text_of(&lines[1]), "    let x = 1;");
        assert_eq!(text_of(&lines[2]), "}");
    }

    #[test]
    fn unknown_language_is_plain() {
        let lines = highlight_code("no-such-lang", "a\nb", "base16-ocean.dark");
        assert_eq!(lines, plain_code("a\nb"));
    }

    #[test]
    fn unknown_theme_still_highlights() {
        let lines = highlight_code("py", "x = 1", "no-such-theme");
        assert_eq!(text_of(&lines[0]), "x = 1");
    }

    #[test]
    fn slice_spans_across_boundaries() {
        let spans = vec![Span::raw("abc"), Span::raw("defg")];
        let sliced = slice_spans_by_range(&spans, 2, 5);
        assert_eq!(text_of(&sliced), "cde");
        assert_eq!(sliced.len(), 2);
    }
}
