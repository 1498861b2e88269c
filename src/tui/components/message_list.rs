//! # MessageList Component
//!
//! Scrollable, channel-scoped thread view.
//!
//! ## Responsibilities
//!
//! - Flatten the reply tree into render order (depth-bounded, see
//!   `core::message`) and indent replies by nesting depth
//! - Own every message's transient `MessageItemState`, keyed by id
//! - Scrolling, stick-to-bottom, and mouse hit testing
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) wrapping
//! `&mut MessageListState` (persistent) plus borrowed app data as props.
//! Heights are recomputed every frame; with relative ages recomputed at
//! render time anyway, there is nothing stable enough to make caching pay
//! for itself here.

use std::collections::HashMap;

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::{Message, flatten_thread};
use crate::core::state::App;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message_item::{MessageItem, MessageItemState};
use crate::tui::event::TuiEvent;

/// Columns of indent per reply nesting level.
const INDENT_PER_DEPTH: u16 = 2;

/// One rendered row's geometry, kept for hit testing and navigation.
#[derive(Debug, Clone, Copy)]
pub struct RowLayout {
    pub id: u64,
    pub top: u16,
    pub height: u16,
}

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    /// Transient per-message UI state, keyed by message id. Entries appear
    /// on first interaction and are pruned when the message disappears
    /// from the refreshed list.
    pub item_states: HashMap<u64, MessageItemState>,
    /// Currently selected message id (hover or keyboard navigation).
    pub selected: Option<u64>,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Row geometry from the last render, in display order.
    pub rows: Vec<RowLayout>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            item_states: HashMap::new(),
            selected: None,
            stick_to_bottom: true, // Start attached to bottom
            rows: Vec::new(),
            viewport_height: 0,
        }
    }

    /// Transient state for a message, created on first touch.
    pub fn state_of(&mut self, id: u64) -> &mut MessageItemState {
        self.item_states.entry(id).or_default()
    }

    /// Drop state for messages that no longer exist. This is what finally
    /// dismisses a delete confirmation: the row (and its state) go away
    /// when the refreshed list comes back without the message.
    pub fn prune(&mut self, messages: &[Message]) {
        self.item_states
            .retain(|id, _| messages.iter().any(|m| m.id == *id));
        if let Some(sel) = self.selected
            && !messages.iter().any(|m| m.id == sel)
        {
            self.selected = None;
        }
    }

    /// The message whose delete confirmation is currently open, if any.
    pub fn delete_confirm_target(&self) -> Option<u64> {
        self.item_states
            .iter()
            .find(|(_, s)| s.delete_confirm_open)
            .map(|(id, _)| *id)
    }

    /// Map a content-space y coordinate to the message row under it.
    pub fn hit_test(&self, content_y: u16) -> Option<u64> {
        self.rows
            .iter()
            .find(|r| content_y >= r.top && content_y < r.top + r.height)
            .map(|r| r.id)
    }

    /// Move the selection up/down in display order.
    pub fn select_adjacent(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let idx = self
            .selected
            .and_then(|sel| self.rows.iter().position(|r| r.id == sel));
        let next = match (idx, delta) {
            (None, _) => self.rows.len() - 1,
            (Some(i), d) if d < 0 => i.saturating_sub(1),
            (Some(i), _) => (i + 1).min(self.rows.len() - 1),
        };
        self.selected = Some(self.rows[next].id);
        self.scroll_to_row(next);
    }

    /// Scroll the viewport so the given row is visible.
    fn scroll_to_row(&mut self, idx: usize) {
        let Some(row) = self.rows.get(idx) else {
            return;
        };
        let offset_y = self.scroll_state.offset().y;
        if row.top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: row.top });
            self.stick_to_bottom = false;
        } else if row.top + row.height > offset_y + self.viewport_height {
            let new_y = (row.top + row.height).saturating_sub(self.viewport_height);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            let total = self.total_height();
            self.stick_to_bottom = new_y >= total.saturating_sub(self.viewport_height);
        }
    }

    fn total_height(&self) -> u16 {
        self.rows.last().map(|r| r.top + r.height).unwrap_or(0)
    }

    /// Re-engage auto-scroll if a scroll-down reached the bottom.
    fn repin_if_at_bottom(&mut self) {
        let max_y = self.total_height().saturating_sub(self.viewport_height);
        if self.scroll_state.offset().y >= max_y {
            self.stick_to_bottom = true;
        }
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
                None
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
                None
            }
            _ => None,
        }
    }
}

/// Scrollable thread view, created fresh each frame.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub app: &'a App,
    pub pulse: f32,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, app: &'a App, pulse: f32) -> Self {
        Self { state, app, pulse }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        let flat = flatten_thread(&self.app.messages, &self.app.channel);

        if flat.is_empty() {
            let hint = if self.app.loading {
                "Loading messages..."
            } else {
                "No messages here yet. Say something!"
            };
            let empty = Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(ratatui::layout::Alignment::Center);
            frame.render_widget(empty, area);
            self.state.rows.clear();
            return;
        }

        // 1. Measure every row (indent shrinks the wrap width).
        let mut rows = Vec::with_capacity(flat.len());
        let mut y: u16 = 0;
        for &(message, depth) in &flat {
            let indent = (depth as u16) * INDENT_PER_DEPTH;
            let width = content_width.saturating_sub(indent).max(10);
            let state = self.state.state_of(message.id);
            let height = MessageItem::calculate_height(message, state, width);
            rows.push(RowLayout {
                id: message.id,
                top: y,
                height,
            });
            y += height;
        }
        let total_height = y;
        self.state.rows = rows;
        self.state.viewport_height = area.height;

        // 2. Render rows into the scroll view.
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height.max(1)))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for (i, &(message, depth)) in flat.iter().enumerate() {
            let row = self.state.rows[i];
            let indent = (depth as u16) * INDENT_PER_DEPTH;
            let width = content_width.saturating_sub(indent).max(10);
            let rect = Rect::new(indent, row.top, width, row.height);

            let state = &self.state.item_states[&message.id];
            let item = MessageItem {
                message,
                state,
                sender_name: self.app.sender_name(message.sender),
                viewing_channel: &self.app.channel,
                catalog: &self.app.catalog,
                is_selected: self.state.selected == Some(message.id),
                is_own: self.app.is_own_message(message),
                pulse: if state.delete_in_flight { self.pulse } else { 0.0 },
            };
            scroll_view.render_widget(item, rect);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        } else {
            // Clamp so deletions can't leave the viewport past the end
            let max_y = total_height.saturating_sub(area.height);
            let offset = self.state.scroll_state.offset();
            if offset.y > max_y {
                self.state.scroll_state.set_offset(Position { x: offset.x, y: max_y });
            }
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}
