//! Markdown → ratatui `Text` renderer for message bodies.
//!
//! Bodies are sanitized (see [`crate::tui::sanitize`]) before parsing, and
//! the event loop below never emits HTML events, so tag-shaped content from
//! other users cannot reach the terminal. Emphasis, headings, inline code,
//! fenced code blocks (syntect-highlighted), lists, blockquotes, and links
//! are supported; everything else degrades to plain text.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::tui::sanitize::sanitize_markup;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);
const CODE_THEME: &str = "base16-eighties.dark";

/// Sanitize and render a message body with the given base text color.
///
/// Returns owned text (`'static`) so callers aren't constrained by input
/// lifetime.
pub fn render_body(body: &str, base_fg: Color) -> Text<'static> {
    let clean = sanitize_markup(body);
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut renderer = Renderer::new(base_fg);
    for event in Parser::new_ext(&clean, opts) {
        renderer.event(event);
    }
    renderer.finish()
}

struct Renderer {
    text: Text<'static>,
    base_fg: Color,
    /// Composed inline styles; nested bold+italic works via `patch`.
    styles: Vec<Style>,
    /// Bullet/number prefix to emit at the start of the next list item line.
    list_stack: Vec<Option<u64>>,
    blockquote_depth: usize,
    /// Syntax highlighter while inside a fenced code block, if the fence
    /// language is known.
    highlighter: Option<HighlightLines<'static>>,
    in_code_block: bool,
    link_url: Option<String>,
    /// Whether a blank separator line is owed before the next block.
    separate: bool,
    line_open: bool,
}

impl Renderer {
    fn new(base_fg: Color) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            styles: Vec::new(),
            list_stack: Vec::new(),
            blockquote_depth: 0,
            highlighter: None,
            in_code_block: false,
            link_url: None,
            separate: false,
            line_open: false,
        }
    }

    fn finish(self) -> Text<'static> {
        self.text
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn open_line(&mut self) {
        if self.line_open {
            return;
        }
        if self.separate && !self.text.lines.is_empty() {
            self.text.lines.push(Line::default());
        }
        self.separate = false;
        let mut line = Line::default();
        for _ in 0..self.blockquote_depth {
            line.push_span(Span::styled("│ ", Style::default().fg(Color::DarkGray)));
        }
        self.text.lines.push(line);
        self.line_open = true;
    }

    fn close_line(&mut self) {
        self.line_open = false;
    }

    fn span(&mut self, content: String, style: Style) {
        self.open_line();
        if let Some(line) = self.text.lines.last_mut() {
            line.push_span(Span::styled(content, style));
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(t) if self.in_code_block => self.code_text(&t),
            Event::Text(t) => {
                let style = self.style();
                self.span(t.to_string(), style);
            }
            Event::Code(code) => {
                let style = self
                    .style()
                    .patch(Style::default().fg(Color::LightYellow).bg(Color::Black));
                self.span(code.to_string(), style);
            }
            Event::SoftBreak => {
                let style = self.style();
                self.span(" ".to_string(), style);
            }
            Event::HardBreak => self.close_line(),
            Event::Rule => {
                self.separate = true;
                self.open_line();
                self.span("────────".into(), Style::default().fg(Color::DarkGray));
                self.close_line();
                self.separate = true;
            }
            Event::TaskListMarker(done) => {
                let mark = if done { "[x] " } else { "[ ] " };
                let style = self.style();
                self.span(mark.to_string(), style);
            }
            // Raw HTML never reaches the terminal, sanitized or not.
            Event::Html(_) | Event::InlineHtml(_) => {}
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open_line(),
            Tag::Heading { .. } => {
                self.separate = true;
                self.push_style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
                self.open_line();
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::BlockQuote(_) => {
                self.separate = true;
                self.blockquote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.separate = true;
                self.close_line();
                self.in_code_block = true;
                self.highlighter = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => SYNTAX_SET
                        .find_syntax_by_token(&lang)
                        .map(|syntax| {
                            HighlightLines::new(syntax, &THEME_SET.themes[CODE_THEME])
                        }),
                    _ => None,
                };
            }
            Tag::List(start) => {
                if self.list_stack.is_empty() {
                    self.separate = true;
                }
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.close_line();
                self.open_line();
                let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
                let marker = match self.list_stack.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{indent}{n}. ");
                        *n += 1;
                        m
                    }
                    _ => format!("{indent}• "),
                };
                self.span(marker, Style::default().fg(Color::DarkGray));
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.close_line();
                self.separate = true;
            }
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.close_line();
                self.separate = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::BlockQuote(_) => {
                self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
                self.close_line();
                self.separate = true;
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.highlighter = None;
                self.close_line();
                self.separate = true;
            }
            TagEnd::List(_) => {
                self.list_stack.pop();
                self.close_line();
                if self.list_stack.is_empty() {
                    self.separate = true;
                }
            }
            TagEnd::Item => self.close_line(),
            TagEnd::Link => {
                self.styles.pop();
                if let Some(url) = self.link_url.take() {
                    self.span(format!(" ({url})"), Style::default().fg(Color::DarkGray));
                }
            }
            _ => {}
        }
    }

    /// Code block text: one ratatui line per source line, highlighted when
    /// the fence language resolved to a known syntax.
    fn code_text(&mut self, text: &str) {
        for source_line in LinesWithEndings::from(text) {
            self.close_line();
            self.open_line();
            let trimmed = source_line.trim_end_matches('\n');
            match self.highlighter.as_mut() {
                Some(hl) => match hl.highlight_line(source_line, &SYNTAX_SET) {
                    Ok(regions) => {
                        let spans: Vec<Span<'static>> = regions
                            .into_iter()
                            .map(|(style, run)| {
                                Span::styled(
                                    run.trim_end_matches('\n').to_string(),
                                    Style::default().fg(Color::Rgb(
                                        style.foreground.r,
                                        style.foreground.g,
                                        style.foreground.b,
                                    )),
                                )
                            })
                            .collect();
                        if let Some(line) = self.text.lines.last_mut() {
                            for span in spans {
                                line.push_span(span);
                            }
                        }
                    }
                    Err(_) => {
                        self.span(trimmed.to_string(), Style::default().fg(Color::Gray));
                    }
                },
                None => {
                    self.span(trimmed.to_string(), Style::default().fg(Color::Gray));
                }
            }
            self.close_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(text: &Text<'_>) -> String {
        text.lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn spans_with_modifier(text: &Text<'_>, modifier: Modifier) -> Vec<String> {
        text.lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .filter(|s| s.style.add_modifier.contains(modifier))
            .map(|s| s.content.to_string())
            .collect()
    }

    #[test]
    fn plain_paragraph_renders_as_one_line() {
        let text = render_body("hello world", Color::White);
        assert_eq!(flat(&text), "hello world");
    }

    #[test]
    fn bold_gets_the_bold_modifier() {
        let text = render_body("some **bold** text", Color::White);
        assert_eq!(spans_with_modifier(&text, Modifier::BOLD), vec!["bold"]);
    }

    #[test]
    fn script_is_sanitized_but_emphasis_survives() {
        // The hard requirement: hostile markup gone, markdown still styled
        let text = render_body("<script>alert(1)</script>**bold**", Color::White);
        let rendered = flat(&text);
        assert!(!rendered.contains("alert"), "script leaked: {rendered}");
        assert!(!rendered.contains("<script>"));
        assert_eq!(spans_with_modifier(&text, Modifier::BOLD), vec!["bold"]);
    }

    #[test]
    fn inline_html_events_are_never_emitted() {
        let text = render_body("before <notreal x=\"<\"> after", Color::White);
        let rendered = flat(&text);
        assert!(!rendered.contains('<') || !rendered.contains('>'));
        assert!(rendered.contains("before"));
        assert!(rendered.contains("after"));
    }

    #[test]
    fn code_block_keeps_every_source_line() {
        let text = render_body("```\nlet a = 1;\nlet b = 2;\n```", Color::White);
        let rendered = flat(&text);
        assert!(rendered.contains("let a = 1;"));
        assert!(rendered.contains("let b = 2;"));
    }

    #[test]
    fn rust_fence_is_highlighted() {
        let text = render_body("```rust\nfn main() {}\n```", Color::White);
        // At least one span should carry a syntect RGB color
        let has_rgb = text
            .lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .any(|s| matches!(s.style.fg, Some(Color::Rgb(..))));
        assert!(has_rgb);
    }

    #[test]
    fn unordered_list_gets_bullets() {
        let text = render_body("- one\n- two", Color::White);
        let rendered = flat(&text);
        assert!(rendered.contains("• one"));
        assert!(rendered.contains("• two"));
    }

    #[test]
    fn ordered_list_counts_up() {
        let text = render_body("1. first\n2. second", Color::White);
        let rendered = flat(&text);
        assert!(rendered.contains("1. first"));
        assert!(rendered.contains("2. second"));
    }

    #[test]
    fn blockquote_lines_are_prefixed() {
        let text = render_body("> quoted", Color::White);
        assert!(flat(&text).contains("│ quoted"));
    }

    #[test]
    fn link_url_is_appended_after_text() {
        let text = render_body("[site](https://example.test)", Color::White);
        let rendered = flat(&text);
        assert!(rendered.contains("site"));
        assert!(rendered.contains("(https://example.test)"));
    }

    #[test]
    fn base_color_applies_to_plain_text() {
        let text = render_body("plain", Color::Cyan);
        let span = &text.lines[0].spans[0];
        assert_eq!(span.style.fg, Some(Color::Cyan));
    }
}
