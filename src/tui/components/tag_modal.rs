//! # Tag Modal Component
//!
//! Overlay forcing a concrete channel choice before an unscoped ("all")
//! send goes out. Opened by the reducer's `Effect::OpenTagPicker`, so it
//! only ever exists while a send is blocked on tagging.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `TagModalState` lives in `TuiState` (Some = open; dropping it closes
//!   the modal and with it every key binding it owned)
//! - `TagModal` is created each frame with borrowed state
//!
//! Moving the highlight — arrow keys or mouse hover — *previews* the
//! channel by mutating the shared selection, not just local highlight
//! state. Enter or click selects, which submits immediately. Esc closes
//! without selecting; the draft is untouched either way.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::core::channel::ChannelCatalog;
use crate::tui::event::TuiEvent;
use crate::tui::theme::parse_color;

/// Persistent state for the tag-selection overlay.
pub struct TagModalState {
    /// Real channels as (name, color), catalog order.
    options: Vec<(String, Color)>,
    pub highlighted: usize,
    /// Option hit-boxes from the last render, for mouse interaction.
    option_areas: Vec<Rect>,
}

/// Events emitted by the tag modal.
#[derive(Debug, Clone, PartialEq)]
pub enum TagModalEvent {
    /// Highlight moved here; preview it as the selected channel.
    Preview(String),
    /// This channel was chosen; set it and submit the draft now.
    Select(String),
    Dismiss,
}

impl TagModalState {
    /// Build from the catalog, highlighting `current` when it is a real
    /// channel (it usually isn't — the modal exists because it was "all").
    pub fn new(catalog: &ChannelCatalog, current: &str) -> Self {
        let options: Vec<(String, Color)> = catalog
            .real_channels()
            .iter()
            .map(|c| (c.name.clone(), parse_color(&c.color)))
            .collect();
        let highlighted = options
            .iter()
            .position(|(name, _)| name == current)
            .unwrap_or(0);
        Self {
            options,
            highlighted,
            option_areas: Vec::new(),
        }
    }

    fn highlighted_name(&self) -> Option<String> {
        self.options.get(self.highlighted).map(|(n, _)| n.clone())
    }

    fn move_highlight(&mut self, delta: isize) -> Option<TagModalEvent> {
        if self.options.is_empty() {
            return None;
        }
        let last = self.options.len() - 1;
        let next = match delta {
            d if d < 0 => self.highlighted.saturating_sub(1),
            _ => (self.highlighted + 1).min(last),
        };
        if next == self.highlighted {
            return None;
        }
        self.highlighted = next;
        self.highlighted_name().map(TagModalEvent::Preview)
    }

    /// Handle a key or mouse event, returning an event when the modal
    /// previewed, selected, or wants to close.
    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<TagModalEvent> {
        match event {
            TuiEvent::Escape => Some(TagModalEvent::Dismiss),
            TuiEvent::CursorLeft | TuiEvent::CursorUp => self.move_highlight(-1),
            TuiEvent::CursorRight | TuiEvent::CursorDown => self.move_highlight(1),
            TuiEvent::Submit => self.highlighted_name().map(TagModalEvent::Select),
            TuiEvent::MouseMove(col, row) => {
                let hit = self.hit_test(*col, *row)?;
                if hit == self.highlighted {
                    return None;
                }
                self.highlighted = hit;
                self.highlighted_name().map(TagModalEvent::Preview)
            }
            TuiEvent::MouseClick(col, row) => {
                let hit = self.hit_test(*col, *row)?;
                self.highlighted = hit;
                self.highlighted_name().map(TagModalEvent::Select)
            }
            _ => None,
        }
    }

    fn hit_test(&self, col: u16, row: u16) -> Option<usize> {
        self.option_areas
            .iter()
            .position(|r| r.contains(ratatui::layout::Position { x: col, y: row }))
    }
}

/// Transient render wrapper for the tag modal overlay.
pub struct TagModal<'a> {
    state: &'a mut TagModalState,
}

impl<'a> TagModal<'a> {
    pub fn new(state: &'a mut TagModalState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(60, 30, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Add a tag to your message ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" Enter Send  Esc Back ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        if self.state.options.is_empty() {
            let empty = Paragraph::new("No channels configured.\nAdd [[channels]] entries to ~/.chatter/config.toml")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(empty, inner);
            self.state.option_areas.clear();
            return;
        }

        // One evenly sized column per channel, side by side.
        let constraints: Vec<Constraint> = self
            .state
            .options
            .iter()
            .map(|_| Constraint::Ratio(1, self.state.options.len() as u32))
            .collect();
        let row = Rect {
            y: inner.y + inner.height / 2,
            height: 1.min(inner.height),
            ..inner
        };
        let columns = Layout::horizontal(constraints).split(row);
        self.state.option_areas = columns.to_vec();

        for (i, ((name, color), cell)) in
            self.state.options.iter().zip(columns.iter()).enumerate()
        {
            let style = if i == self.state.highlighted {
                Style::default()
                    .fg(*color)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(*color)
            };
            let label = Paragraph::new(name.as_str())
                .style(style)
                .alignment(Alignment::Center);
            frame.render_widget(label, *cell);
        }
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
    use crate::test_support::test_catalog;

    fn state() -> TagModalState {
        TagModalState::new(&test_catalog(), "all")
    }

    #[test]
    fn opens_with_first_channel_highlighted() {
        let s = state();
        assert_eq!(s.highlighted, 0);
        assert_eq!(s.highlighted_name().as_deref(), Some("bugs"));
    }

    #[test]
    fn arrow_keys_preview_the_next_channel() {
        let mut s = state();
        let ev = s.handle_event(&TuiEvent::CursorRight);
        assert_eq!(ev, Some(TagModalEvent::Preview("general".into())));
        let ev = s.handle_event(&TuiEvent::CursorLeft);
        assert_eq!(ev, Some(TagModalEvent::Preview("bugs".into())));
    }

    #[test]
    fn highlight_stops_at_the_edges() {
        let mut s = state();
        assert_eq!(s.handle_event(&TuiEvent::CursorLeft), None);
        s.highlighted = 2;
        assert_eq!(s.handle_event(&TuiEvent::CursorDown), None);
    }

    #[test]
    fn enter_selects_the_highlighted_channel() {
        let mut s = state();
        s.handle_event(&TuiEvent::CursorRight);
        let ev = s.handle_event(&TuiEvent::Submit);
        assert_eq!(ev, Some(TagModalEvent::Select("general".into())));
    }

    #[test]
    fn escape_dismisses_without_selecting() {
        let mut s = state();
        assert_eq!(
            s.handle_event(&TuiEvent::Escape),
            Some(TagModalEvent::Dismiss)
        );
    }

    #[test]
    fn mouse_hover_previews_and_click_selects() {
        let mut s = state();
        s.option_areas = vec![
            Rect::new(0, 5, 10, 1),
            Rect::new(10, 5, 10, 1),
            Rect::new(20, 5, 10, 1),
        ];
        let ev = s.handle_event(&TuiEvent::MouseMove(25, 5));
        assert_eq!(ev, Some(TagModalEvent::Preview("ideas".into())));
        // Hovering the same option again is not a new preview
        assert_eq!(s.handle_event(&TuiEvent::MouseMove(26, 5)), None);

        let ev = s.handle_event(&TuiEvent::MouseClick(11, 5));
        assert_eq!(ev, Some(TagModalEvent::Select("general".into())));
    }

    #[test]
    fn mouse_outside_the_options_does_nothing() {
        let mut s = state();
        s.option_areas = vec![Rect::new(0, 5, 10, 1)];
        assert_eq!(s.handle_event(&TuiEvent::MouseMove(50, 20)), None);
    }
}
