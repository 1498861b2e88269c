//! # Message Item Component
//!
//! Renders a single message — sender, relative age, tag badges, markdown
//! body — and owns that message's transient interaction state: inline edit,
//! delete confirmation, and the nested reply input.
//!
//! ## Architecture
//!
//! - `MessageItemState` is persistent, one per message id, held in a map in
//!   `MessageListState`. Instances are independent: editing one message
//!   never touches another's state.
//! - `MessageItem` is a transient wrapper created per frame per visible
//!   message, implementing `Widget` so the scroll view can paint it.
//!
//! The edit save is optimistic: the buffer is handed off and `editing`
//! drops immediately, with no pending indicator while the dispatch is out.
//! The delete confirmation stays open after confirming (the row vanishes
//! when the refreshed list no longer contains the message); what the
//! confirm *does* guarantee is that the delete action is dispatched at most
//! once, via the `delete_in_flight` guard.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

use crate::core::channel::ChannelCatalog;
use crate::core::message::Message;
use crate::tui::event::TuiEvent;
use crate::tui::markdown::render_body;
use crate::tui::theme::parse_color;
use crate::tui::timefmt::relative_age;

/// Header + placeholder footer + trailing separator line.
const CHROME_HEIGHT: u16 = 3;
/// Bordered single-line input (reply box, edit box minimum).
const INPUT_BOX_HEIGHT: u16 = 3;

/// Per-message transient UI state.
#[derive(Debug, Default)]
pub struct MessageItemState {
    pub editing: bool,
    pub edit_buffer: String,
    pub delete_confirm_open: bool,
    pub delete_in_flight: bool,
    pub reply_open: bool,
    pub reply_buffer: String,
}

/// What an edit- or reply-focused key sequence resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemInputEvent {
    SaveEdit(String),
    CancelEdit,
    SubmitReply(String),
    CancelReply,
}

impl MessageItemState {
    /// Begin editing: copies the body into the buffer. Refused for
    /// non-authors (the caller passes the permission check result) and
    /// when already editing.
    pub fn start_edit(&mut self, body: &str, permitted: bool) -> bool {
        if !permitted || self.editing {
            return false;
        }
        self.edit_buffer = body.to_string();
        self.editing = true;
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    pub fn request_delete(&mut self) {
        self.delete_confirm_open = true;
    }

    /// Arm the delete. Returns true exactly once per confirmation cycle:
    /// a second confirm while the dispatch is in flight is swallowed.
    pub fn confirm_delete(&mut self) -> bool {
        if !self.delete_confirm_open || self.delete_in_flight {
            return false;
        }
        self.delete_in_flight = true;
        true
    }

    pub fn cancel_delete(&mut self) {
        self.delete_confirm_open = false;
        self.delete_in_flight = false;
    }

    /// Flip the reply input. Closing discards the typed reply.
    /// Returns whether it is now open.
    pub fn toggle_reply(&mut self) -> bool {
        self.reply_open = !self.reply_open;
        if !self.reply_open {
            self.reply_buffer.clear();
        }
        self.reply_open
    }

    /// Keystrokes routed here while this item is being edited.
    pub fn handle_edit_event(&mut self, event: &TuiEvent) -> Option<ItemInputEvent> {
        debug_assert!(self.editing);
        match event {
            TuiEvent::InputChar(c) => {
                self.edit_buffer.push(*c);
                None
            }
            TuiEvent::Paste(text) => {
                self.edit_buffer.push_str(text);
                None
            }
            TuiEvent::Backspace => {
                self.edit_buffer.pop();
                None
            }
            TuiEvent::Submit => {
                // Optimistic: hand the body off and drop the editing state
                // without waiting for the dispatch to resolve.
                let body = std::mem::take(&mut self.edit_buffer);
                self.editing = false;
                Some(ItemInputEvent::SaveEdit(body))
            }
            TuiEvent::Escape => {
                self.cancel_edit();
                Some(ItemInputEvent::CancelEdit)
            }
            _ => None,
        }
    }

    /// Keystrokes routed here while this item's reply input is open.
    pub fn handle_reply_event(&mut self, event: &TuiEvent) -> Option<ItemInputEvent> {
        debug_assert!(self.reply_open);
        match event {
            TuiEvent::InputChar(c) => {
                self.reply_buffer.push(*c);
                None
            }
            TuiEvent::Paste(text) => {
                self.reply_buffer.push_str(text);
                None
            }
            TuiEvent::Backspace => {
                self.reply_buffer.pop();
                None
            }
            TuiEvent::Submit => {
                let body = std::mem::take(&mut self.reply_buffer);
                self.reply_open = false;
                Some(ItemInputEvent::SubmitReply(body))
            }
            TuiEvent::Escape => {
                self.toggle_reply();
                Some(ItemInputEvent::CancelReply)
            }
            _ => None,
        }
    }
}

/// Transient render wrapper: one message row in the thread view.
pub struct MessageItem<'a> {
    pub message: &'a Message,
    pub state: &'a MessageItemState,
    pub sender_name: String,
    /// The channel currently being viewed; its own badge is omitted.
    pub viewing_channel: &'a str,
    pub catalog: &'a ChannelCatalog,
    pub is_selected: bool,
    pub is_own: bool,
    /// Pulse phase 0.0..1.0, non-zero only while this row's delete is in
    /// flight.
    pub pulse: f32,
}

impl<'a> MessageItem<'a> {
    /// Rows this message needs at `width`. Must stay in lockstep with
    /// `render` — the list's scroll math depends on it.
    pub fn calculate_height(message: &Message, state: &MessageItemState, width: u16) -> u16 {
        let body_height = if state.editing {
            edit_box_height(&state.edit_buffer)
        } else {
            body_paragraph(&message.body).line_count(width.max(1)) as u16
        };
        let reply_height = if state.reply_open { INPUT_BOX_HEIGHT } else { 0 };
        CHROME_HEIGHT + body_height + reply_height
    }

    fn header_line(&self) -> Line<'static> {
        let name_style = if self.is_selected {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };
        let mut spans = vec![
            Span::styled(self.sender_name.clone(), name_style),
            Span::raw("  "),
            Span::styled(
                relative_age(self.message.created_at),
                Style::default().fg(Color::DarkGray),
            ),
        ];

        // Badges for every tag except the channel being viewed, colored by
        // catalog position.
        for tag in self.message.tags.iter().filter(|t| *t != self.viewing_channel) {
            let color = self
                .catalog
                .color_of(tag)
                .map(parse_color)
                .unwrap_or(Color::DarkGray);
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!(" {tag} "),
                Style::default().fg(Color::Black).bg(color),
            ));
        }

        if self.state.delete_in_flight {
            let style = if self.pulse > 0.5 {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Red).add_modifier(Modifier::DIM)
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled("deleting...", style));
        }
        if self.is_own && !self.state.editing {
            spans.push(Span::styled(
                "  e edit · d delete",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            ));
        }
        Line::from(spans)
    }

    /// Placeholder footer: reply counting isn't wired up yet, so this is
    /// always zero and the creation age.
    fn footer_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::styled("0 replies", Style::default().fg(Color::Blue)),
            Span::styled(
                format!("  Last reply {}", relative_age(self.message.created_at)),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    }
}

fn body_paragraph(body: &str) -> Paragraph<'static> {
    Paragraph::new(render_body(body, Color::White)).wrap(Wrap { trim: false })
}

fn edit_box_height(buffer: &str) -> u16 {
    buffer.lines().count().max(1) as u16 + 2
}

impl<'a> Widget for MessageItem<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let body_height = if self.state.editing {
            edit_box_height(&self.state.edit_buffer)
        } else {
            body_paragraph(&self.message.body).line_count(area.width.max(1)) as u16
        };
        let reply_height = if self.state.reply_open { INPUT_BOX_HEIGHT } else { 0 };
        let [header_area, body_area, footer_area, reply_area, _sep] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(body_height),
            Constraint::Length(1),
            Constraint::Length(reply_height),
            Constraint::Length(1),
        ])
        .areas(area);

        self.header_line().render(header_area, buf);

        if self.state.editing {
            let edit = Paragraph::new(self.state.edit_buffer.as_str())
                .style(Style::default().fg(Color::White))
                .block(
                    Block::bordered()
                        .border_style(Style::default().fg(Color::Yellow))
                        .title(" edit (Enter save · Esc cancel) "),
                );
            edit.render(body_area, buf);
        } else {
            body_paragraph(&self.message.body).render(body_area, buf);
        }

        self.footer_line().render(footer_area, buf);

        if self.state.reply_open {
            let reply = Paragraph::new(self.state.reply_buffer.as_str())
                .style(Style::default().fg(Color::White))
                .block(
                    Block::bordered()
                        .border_style(Style::default().fg(Color::Cyan))
                        .title(" reply (Enter send · Esc close) "),
                );
            reply.render(reply_area, buf);
        }
    }
}

/// The delete confirmation prompt, drawn as a full-frame overlay for
/// whichever message has `delete_confirm_open`.
pub struct DeleteConfirm<'a> {
    pub state: &'a MessageItemState,
    pub pulse: f32,
}

impl<'a> DeleteConfirm<'a> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(50, 20, area);
        frame.render_widget(Clear, overlay);

        let border_style = if self.state.delete_in_flight && self.pulse > 0.5 {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Red)
        };
        let help = if self.state.delete_in_flight {
            " deleting... | Esc Close "
        } else {
            " Enter Delete  Esc Cancel "
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Delete message ")
            .title_bottom(Line::from(help).centered());
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let prompt = Paragraph::new("Are you sure you want to delete this message?")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(prompt, inner);
    }
}

/// Compute a centered rect using percentage of the outer rect.
fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_catalog, test_message};

    // ── Edit lifecycle ──────────────────────────────────────────────────

    #[test]
    fn start_edit_copies_body_when_permitted() {
        let mut s = MessageItemState::default();
        assert!(s.start_edit("original body", true));
        assert!(s.editing);
        assert_eq!(s.edit_buffer, "original body");
    }

    #[test]
    fn start_edit_refused_for_non_author() {
        let mut s = MessageItemState::default();
        assert!(!s.start_edit("body", false));
        assert!(!s.editing);
        assert!(s.edit_buffer.is_empty());
    }

    #[test]
    fn save_edit_is_optimistic() {
        let mut s = MessageItemState::default();
        s.start_edit("body", true);
        s.handle_edit_event(&TuiEvent::InputChar('!'));
        let ev = s.handle_edit_event(&TuiEvent::Submit);
        assert_eq!(ev, Some(ItemInputEvent::SaveEdit("body!".into())));
        // No pending state: editing drops immediately, buffer is gone
        assert!(!s.editing);
        assert!(s.edit_buffer.is_empty());
    }

    #[test]
    fn cancel_edit_discards_the_buffer() {
        let mut s = MessageItemState::default();
        s.start_edit("body", true);
        let ev = s.handle_edit_event(&TuiEvent::Escape);
        assert_eq!(ev, Some(ItemInputEvent::CancelEdit));
        assert!(!s.editing);
        assert!(s.edit_buffer.is_empty());
    }

    // ── Delete lifecycle ────────────────────────────────────────────────

    #[test]
    fn confirm_delete_fires_exactly_once() {
        let mut s = MessageItemState::default();
        s.request_delete();
        assert!(s.confirm_delete());
        // Second confirm while the dispatch is out: swallowed
        assert!(!s.confirm_delete());
        assert!(s.delete_in_flight);
        // The prompt is not force-closed by confirming
        assert!(s.delete_confirm_open);
    }

    #[test]
    fn confirm_without_prompt_is_refused() {
        let mut s = MessageItemState::default();
        assert!(!s.confirm_delete());
    }

    #[test]
    fn cancel_delete_resets_both_flags() {
        let mut s = MessageItemState::default();
        s.request_delete();
        s.confirm_delete();
        s.cancel_delete();
        assert!(!s.delete_confirm_open);
        assert!(!s.delete_in_flight);
        // A fresh confirmation cycle can fire again
        s.request_delete();
        assert!(s.confirm_delete());
    }

    // ── Reply lifecycle ─────────────────────────────────────────────────

    #[test]
    fn toggle_reply_flips_and_closing_discards_text() {
        let mut s = MessageItemState::default();
        assert!(s.toggle_reply());
        s.handle_reply_event(&TuiEvent::InputChar('h'));
        assert!(!s.toggle_reply());
        assert!(s.reply_buffer.is_empty());
    }

    #[test]
    fn submitting_a_reply_closes_the_input() {
        let mut s = MessageItemState::default();
        s.toggle_reply();
        s.handle_reply_event(&TuiEvent::Paste("me too".into()));
        let ev = s.handle_reply_event(&TuiEvent::Submit);
        assert_eq!(ev, Some(ItemInputEvent::SubmitReply("me too".into())));
        assert!(!s.reply_open);
    }

    // ── Height / render ─────────────────────────────────────────────────

    #[test]
    fn height_includes_chrome_and_body() {
        let state = MessageItemState::default();
        let message = test_message(1, 1, &["bugs"]);
        // 1-line body + header + footer + separator
        assert_eq!(
            MessageItem::calculate_height(&message, &state, 60),
            CHROME_HEIGHT + 1
        );
    }

    #[test]
    fn height_grows_when_reply_input_is_open() {
        let mut state = MessageItemState::default();
        let message = test_message(1, 1, &["bugs"]);
        let closed = MessageItem::calculate_height(&message, &state, 60);
        state.toggle_reply();
        let open = MessageItem::calculate_height(&message, &state, 60);
        assert_eq!(open, closed + INPUT_BOX_HEIGHT);
    }

    #[test]
    fn editing_height_tracks_the_edit_buffer() {
        let mut state = MessageItemState::default();
        let message = test_message(1, 1, &["bugs"]);
        state.start_edit("one\ntwo\nthree", true);
        assert_eq!(
            MessageItem::calculate_height(&message, &state, 60),
            CHROME_HEIGHT + 3 + 2
        );
    }

    #[test]
    fn badges_skip_the_viewed_channel() {
        let catalog = test_catalog();
        let message = test_message(1, 1, &["bugs", "ideas"]);
        let state = MessageItemState::default();
        let item = MessageItem {
            message: &message,
            state: &state,
            sender_name: "alice".into(),
            viewing_channel: "bugs",
            catalog: &catalog,
            is_selected: false,
            is_own: false,
            pulse: 0.0,
        };
        let header = item.header_line();
        let text: String = header.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains(" ideas "), "missing badge: {text}");
        assert!(!text.contains(" bugs "), "viewed channel badged: {text}");
    }

    #[test]
    fn footer_renders_placeholder_counts() {
        let catalog = test_catalog();
        let message = test_message(1, 1, &["bugs"]);
        let state = MessageItemState::default();
        let item = MessageItem {
            message: &message,
            state: &state,
            sender_name: "alice".into(),
            viewing_channel: "bugs",
            catalog: &catalog,
            is_selected: false,
            is_own: false,
            pulse: 0.0,
        };
        let text: String = item
            .footer_line()
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.starts_with("0 replies"));
        assert!(text.contains("Last reply"));
    }
}
