//! # Composer Component
//!
//! The message input at the bottom of the screen. Owns the draft text and
//! cursor; the channel it will send to is shared application state (the
//! viewed channel), which channel inference mutates as the user types.
//!
//! ## Responsibilities
//!
//! - Capture and edit draft text (insert, backspace, delete, cursor moves,
//!   paste, Ctrl+J newline)
//! - Emit `Submit` on Enter — preconditions live in the reducer, so an empty
//!   draft is still emitted and bounced there
//! - Emit `ContentChanged` on every edit so channel inference can run
//! - Render the draft with a channel-colored border, disabled/pulsing while
//!   a send is in flight
//!
//! The buffer is *not* cleared on submit: the draft survives the tag modal
//! and login detours, and is only cleared when the dispatch resolves
//! (success or error alike) via [`Composer::clear`].

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Draft lines shown before the composer stops growing and scrolls.
const MAX_VISIBLE_LINES: u16 = 6;
/// Top + bottom border.
const VERTICAL_OVERHEAD: u16 = 2;
/// Left + right border.
const HORIZONTAL_OVERHEAD: u16 = 2;

/// High-level events emitted by the Composer.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent {
    /// Enter pressed; carries the current draft (possibly empty).
    Submit(String),
    /// The draft changed; carries the new text for channel inference.
    ContentChanged(String),
}

pub struct Composer {
    buffer: String,
    /// Cursor as a byte offset into `buffer` (always on a char boundary).
    cursor: usize,
    /// Current channel name (prop, synced each frame).
    pub channel: String,
    /// Channel border color (prop).
    pub channel_color: Color,
    /// True while a send is awaiting its result (prop); input is disabled
    /// and the border pulses.
    pub sending: bool,
    /// Pulse phase 0.0..1.0 while sending (prop).
    pub pulse: f32,
    /// Dimmed when focus is elsewhere (prop).
    pub dimmed: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            channel: String::new(),
            channel_color: Color::Gray,
            sending: false,
            pulse: 0.0,
            dimmed: false,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Clear the draft. Called when a send's dispatch resolves — success or
    /// error alike — never at submit time.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Placeholder mirrors the target: bare when unscoped, named otherwise.
    fn placeholder(&self) -> String {
        if self.channel.is_empty() || self.channel == crate::core::channel::ALL_CHANNEL {
            String::from("Send message...")
        } else {
            format!("Send message to {}", self.channel)
        }
    }

    /// Height needed for the current draft at `width`, clamped to the
    /// visible-line cap.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD).max(1);
        let lines = wrapped_line_count(&self.buffer, inner);
        lines.min(MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    fn prev_boundary(&self) -> usize {
        let mut i = self.cursor;
        while i > 0 {
            i -= 1;
            if self.buffer.is_char_boundary(i) {
                break;
            }
        }
        i
    }

    fn next_boundary(&self) -> usize {
        let mut i = self.cursor + 1;
        while i < self.buffer.len() && !self.buffer.is_char_boundary(i) {
            i += 1;
        }
        i.min(self.buffer.len())
    }

    /// Cursor position on screen, derived from the wrapped layout of the
    /// text before the cursor. Trailing spaces are trimmed by the wrap, so
    /// the cursor hugs the last visible glyph rather than chasing them.
    fn cursor_screen_pos(&self, area: Rect) -> (u16, u16) {
        let inner = area.width.saturating_sub(HORIZONTAL_OVERHEAD).max(1);
        let before = &self.buffer[..self.cursor];
        let lines = textwrap::wrap(before, wrap_options(inner));

        let (row, col) = if before.is_empty() {
            (0, 0)
        } else if before.ends_with('\n') {
            // The fresh line may or may not be represented by the wrap
            let row = if lines.last().is_some_and(|l| l.is_empty()) {
                lines.len().saturating_sub(1)
            } else {
                lines.len()
            };
            (row as u16, 0)
        } else {
            (
                lines.len().saturating_sub(1) as u16,
                lines.last().map(|l| l.width() as u16).unwrap_or(0),
            )
        };

        (
            (area.x + 1 + col).min(area.x + area.width.saturating_sub(1)),
            area.y + 1 + row.min(MAX_VISIBLE_LINES - 1),
        )
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrapping options that track how `Paragraph` breaks lines, so predicted
/// heights line up with rendered ones.
fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(width.max(1) as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Display lines for `text` wrapped at `width`, minimum 1.
fn wrapped_line_count(text: &str, width: u16) -> u16 {
    if text.is_empty() {
        return 1;
    }
    let lines = textwrap::wrap(text, wrap_options(width));
    let mut count = (lines.len() as u16).max(1);
    // A trailing newline isn't always represented as an empty wrapped line
    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        count += 1;
    }
    count
}

impl Component for Composer {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_color = if self.channel == crate::core::channel::ALL_CHANNEL {
            Color::Gray
        } else {
            self.channel_color
        };
        let mut border_style = Style::default().fg(border_color);
        if self.dimmed {
            border_style = border_style.add_modifier(Modifier::DIM);
        }
        // Pulse while the dispatch is outstanding
        if self.sending && self.pulse > 0.5 {
            border_style = border_style.add_modifier(Modifier::BOLD);
        }

        let title = if self.sending {
            format!(" #{} (sending...) ", self.channel)
        } else {
            format!(" #{} ", self.channel)
        };

        let block = Block::bordered()
            .border_type(ratatui::widgets::BorderType::Rounded)
            .border_style(border_style)
            .title(title);

        let (text, style) = if self.buffer.is_empty() {
            (self.placeholder(), Style::default().fg(Color::DarkGray))
        } else {
            let fg = if self.sending {
                Color::DarkGray
            } else {
                Color::White
            };
            (self.buffer.clone(), Style::default().fg(fg))
        };

        let input = Paragraph::new(text)
            .block(block)
            .style(style)
            .wrap(Wrap { trim: false });
        frame.render_widget(input, area);

        if !self.dimmed && !self.sending {
            let (x, y) = self.cursor_screen_pos(area);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for Composer {
    type Event = ComposerEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        // The input surface is disabled for the whole send duration.
        if self.sending {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(ComposerEvent::ContentChanged(self.buffer.clone()))
            }
            TuiEvent::Paste(text) => {
                self.buffer.insert_str(self.cursor, text);
                self.cursor += text.len();
                Some(ComposerEvent::ContentChanged(self.buffer.clone()))
            }
            TuiEvent::Backspace => {
                if self.cursor > 0 {
                    let prev = self.prev_boundary();
                    self.buffer.drain(prev..self.cursor);
                    self.cursor = prev;
                    Some(ComposerEvent::ContentChanged(self.buffer.clone()))
                } else {
                    None
                }
            }
            TuiEvent::Delete => {
                if self.cursor < self.buffer.len() {
                    let next = self.next_boundary();
                    self.buffer.drain(self.cursor..next);
                    Some(ComposerEvent::ContentChanged(self.buffer.clone()))
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => {
                if self.cursor > 0 {
                    self.cursor = self.prev_boundary();
                }
                None
            }
            TuiEvent::CursorRight => {
                if self.cursor < self.buffer.len() {
                    self.cursor = self.next_boundary();
                }
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer[self.cursor..]
                    .find('\n')
                    .map(|i| self.cursor + i)
                    .unwrap_or(self.buffer.len());
                None
            }
            // Empty drafts are submitted too; the reducer turns them into a
            // validation message instead of a dispatch.
            TuiEvent::Submit => Some(ComposerEvent::Submit(self.buffer.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn typing_builds_the_draft_and_reports_changes() {
        let mut composer = Composer::new();
        let ev = composer.handle_event(&TuiEvent::InputChar('h'));
        assert_eq!(ev, Some(ComposerEvent::ContentChanged("h".into())));
        composer.handle_event(&TuiEvent::InputChar('i'));
        assert_eq!(composer.buffer(), "hi");

        let ev = composer.handle_event(&TuiEvent::Backspace);
        assert_eq!(ev, Some(ComposerEvent::ContentChanged("h".into())));
    }

    #[test]
    fn submit_emits_draft_without_clearing_it() {
        let mut composer = Composer::new();
        composer.handle_event(&TuiEvent::Paste("hello".into()));
        let ev = composer.handle_event(&TuiEvent::Submit);
        assert_eq!(ev, Some(ComposerEvent::Submit("hello".into())));
        // Draft survives: it is only cleared when the dispatch resolves
        assert_eq!(composer.buffer(), "hello");
    }

    #[test]
    fn empty_submit_is_still_emitted() {
        let mut composer = Composer::new();
        let ev = composer.handle_event(&TuiEvent::Submit);
        assert_eq!(ev, Some(ComposerEvent::Submit(String::new())));
    }

    #[test]
    fn sending_disables_all_input() {
        let mut composer = Composer::new();
        composer.handle_event(&TuiEvent::InputChar('a'));
        composer.sending = true;
        assert_eq!(composer.handle_event(&TuiEvent::InputChar('b')), None);
        assert_eq!(composer.handle_event(&TuiEvent::Submit), None);
        assert_eq!(composer.buffer(), "a");
    }

    #[test]
    fn clear_resets_buffer_and_cursor() {
        let mut composer = Composer::new();
        composer.handle_event(&TuiEvent::Paste("draft".into()));
        composer.clear();
        assert_eq!(composer.buffer(), "");
        // Typing after clear starts at the front again
        composer.handle_event(&TuiEvent::InputChar('x'));
        assert_eq!(composer.buffer(), "x");
    }

    #[test]
    fn cursor_moves_respect_char_boundaries() {
        let mut composer = Composer::new();
        composer.handle_event(&TuiEvent::Paste("aé".into()));
        composer.handle_event(&TuiEvent::CursorLeft);
        composer.handle_event(&TuiEvent::InputChar('x'));
        assert_eq!(composer.buffer(), "axé");
    }

    #[test]
    fn height_grows_with_newlines_up_to_cap() {
        let mut composer = Composer::new();
        assert_eq!(composer.calculate_height(40), 1 + VERTICAL_OVERHEAD);
        composer.handle_event(&TuiEvent::Paste("a\nb\nc".into()));
        assert_eq!(composer.calculate_height(40), 3 + VERTICAL_OVERHEAD);
        composer.handle_event(&TuiEvent::Paste("\nd\ne\nf\ng\nh\ni".into()));
        assert_eq!(
            composer.calculate_height(40),
            MAX_VISIBLE_LINES + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn render_shows_channel_and_placeholder() {
        let backend = TestBackend::new(50, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut composer = Composer::new();
        composer.channel = "bugs".into();

        terminal.draw(|f| composer.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("#bugs"));
        assert!(text.contains("Send message to bugs"));
    }
}
