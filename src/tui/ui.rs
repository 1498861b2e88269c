//! Frame composition: title, channel bar, thread view, composer, overlays.
//!
//! `draw_ui` also records the geometry the event loop needs for mouse
//! handling (message area, channel-bar hit boxes) on `TuiState`.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    ChannelBar, DeleteConfirm, LoginModal, MessageList, TagModal,
};

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};

    let composer_height = tui.composer.calculate_height(frame.area().width);
    let layout = Layout::vertical([Length(1), Length(1), Min(0), Length(composer_height)]);
    let [title_area, channels_area, messages_area, composer_area] = layout.areas(frame.area());

    draw_title(frame, title_area, app);

    let mut bar = ChannelBar::new(&app.catalog, &app.channel);
    bar.render(frame, channels_area);
    tui.channel_hits = bar.label_spans.clone();
    tui.channel_bar_row = channels_area.y;

    let mut list = MessageList::new(&mut tui.message_list, app, tui.pulse_value);
    list.render(frame, messages_area);
    tui.messages_area = messages_area;

    tui.composer.render(frame, composer_area);

    // Overlays, bottom-up: delete confirmation, then the composer detours.
    if let Some(id) = tui.message_list.delete_confirm_target()
        && let Some(state) = tui.message_list.item_states.get(&id)
    {
        DeleteConfirm {
            state,
            pulse: tui.pulse_value,
        }
        .render(frame, frame.area());
    }
    if let Some(ref mut tag_state) = tui.tag_modal {
        TagModal::new(tag_state).render(frame, frame.area());
    }
    if let Some(ref login_state) = tui.login_modal {
        LoginModal::new(login_state).render(frame, frame.area());
    }
}

fn draw_title(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        "Chatter",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    match &app.current_user {
        Some(user) => spans.push(Span::styled(
            format!("  {}", user.name),
            Style::default().fg(Color::Green),
        )),
        None => spans.push(Span::styled(
            "  not signed in",
            Style::default().fg(Color::DarkGray),
        )),
    }
    if !app.status_message.is_empty() {
        spans.push(Span::styled(
            format!("  |  {}", app.status_message),
            Style::default().fg(Color::Gray),
        ));
    }
    spans.push(Span::styled(
        "  |  Tab channel · Ctrl+R refresh · Ctrl+C quit",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
    ));
    frame.render_widget(Line::from(spans), area);
}

/// Convert a mouse position to a content-space y inside the message list,
/// if the position is over it.
pub fn message_content_y(tui: &TuiState, col: u16, row: u16) -> Option<u16> {
    let area = tui.messages_area;
    if col < area.x
        || col >= area.x + area.width
        || row < area.y
        || row >= area.y + area.height
    {
        return None;
    }
    Some(row - area.y + tui.message_list.scroll_state.offset().y)
}
