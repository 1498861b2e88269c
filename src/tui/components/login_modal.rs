//! # Login Modal Component
//!
//! Prompt shown when an unauthenticated user tries to send. Collects a name
//! and hands it to the backend's login endpoint; the blocked draft stays in
//! the composer so the user can re-send after signing in.
//!
//! Persistent state + transient wrapper, like the other overlays.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::tui::event::TuiEvent;

/// Persistent state for the login overlay.
pub struct LoginModalState {
    pub name: String,
    /// Why the prompt appeared ("Create an account to send your message").
    pub message: String,
    /// True while a login call is outstanding.
    pub waiting: bool,
}

/// Events emitted by the login modal.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginEvent {
    Submit(String),
    Dismiss,
}

impl LoginModalState {
    pub fn new(message: &str) -> Self {
        Self {
            name: String::new(),
            message: message.to_string(),
            waiting: false,
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<LoginEvent> {
        if self.waiting {
            // Only Esc works while the login call is in flight
            return matches!(event, TuiEvent::Escape).then_some(LoginEvent::Dismiss);
        }
        match event {
            TuiEvent::Escape => Some(LoginEvent::Dismiss),
            TuiEvent::InputChar(c) if !c.is_control() => {
                self.name.push(*c);
                None
            }
            TuiEvent::Paste(text) => {
                self.name.push_str(text.trim());
                None
            }
            TuiEvent::Backspace => {
                self.name.pop();
                None
            }
            TuiEvent::Submit => Some(LoginEvent::Submit(self.name.clone())),
            _ => None,
        }
    }
}

/// Transient render wrapper for the login overlay.
pub struct LoginModal<'a> {
    state: &'a LoginModalState,
}

impl<'a> LoginModal<'a> {
    pub fn new(state: &'a LoginModalState) -> Self {
        Self { state }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(50, 25, area);
        frame.render_widget(Clear, overlay);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Sign in ")
            .title_bottom(Line::from(" Enter Sign in  Esc Back ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [message_area, _, input_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .areas(inner);

        let message = Paragraph::new(self.state.message.as_str())
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        frame.render_widget(message, message_area);

        let name_style = if self.state.waiting {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::White)
        };
        let title = if self.state.waiting {
            " name (signing in...) "
        } else {
            " name "
        };
        let input = Paragraph::new(self.state.name.as_str())
            .style(name_style)
            .block(Block::bordered().title(title));
        frame.render_widget(input, input_area);

        if !self.state.waiting {
            frame.set_cursor_position((
                input_area.x + 1 + self.state.name.chars().count() as u16,
                input_area.y + 1,
            ));
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

    #[test]
    fn typing_builds_the_name() {
        let mut s = LoginModalState::new("hello");
        s.handle_event(&TuiEvent::InputChar('a'));
        s.handle_event(&TuiEvent::InputChar('l'));
        s.handle_event(&TuiEvent::Backspace);
        assert_eq!(s.name, "a");
    }

    #[test]
    fn enter_submits_the_name() {
        let mut s = LoginModalState::new("hello");
        s.name = "alice".into();
        assert_eq!(
            s.handle_event(&TuiEvent::Submit),
            Some(LoginEvent::Submit("alice".into()))
        );
    }

    #[test]
    fn input_is_frozen_while_waiting() {
        let mut s = LoginModalState::new("hello");
        s.waiting = true;
        assert_eq!(s.handle_event(&TuiEvent::InputChar('x')), None);
        assert_eq!(s.handle_event(&TuiEvent::Submit), None);
        assert_eq!(s.handle_event(&TuiEvent::Escape), Some(LoginEvent::Dismiss));
        assert_eq!(s.name, "");
    }
}
