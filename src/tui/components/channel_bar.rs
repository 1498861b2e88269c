//! # Channel Bar Component
//!
//! One-line strip under the title showing every channel in catalog order,
//! with the viewed channel highlighted in its own color. Stateless: channel
//! switching (Tab, or clicking a name) is handled by the event loop; this
//! component just reports what was clicked.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::channel::{ALL_CHANNEL, ChannelCatalog};
use crate::tui::component::Component;
use crate::tui::theme::parse_color;

pub struct ChannelBar<'a> {
    pub catalog: &'a ChannelCatalog,
    pub selected: &'a str,
    /// (start column, width, name) per rendered label, for click handling.
    pub label_spans: Vec<(u16, u16, String)>,
    area: Rect,
}

impl<'a> ChannelBar<'a> {
    pub fn new(catalog: &'a ChannelCatalog, selected: &'a str) -> Self {
        Self {
            catalog,
            selected,
            label_spans: Vec::new(),
            area: Rect::default(),
        }
    }

    /// The channel name under a mouse position, if the bar was clicked.
    pub fn channel_at(&self, col: u16, row: u16) -> Option<&str> {
        if row != self.area.y {
            return None;
        }
        self.label_spans
            .iter()
            .find(|(start, width, _)| col >= *start && col < start + width)
            .map(|(_, _, name)| name.as_str())
    }
}

impl<'a> Component for ChannelBar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.area = area;
        self.label_spans.clear();

        let mut spans = Vec::new();
        let mut col = area.x;
        for name in self.catalog.names() {
            let color = if name == ALL_CHANNEL {
                Color::Gray
            } else {
                self.catalog.color_of(name).map(parse_color).unwrap_or(Color::Gray)
            };
            let style = if name == self.selected {
                Style::default()
                    .fg(color)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(color)
            };
            let label = format!(" #{name} ");
            let width = label.chars().count() as u16;
            self.label_spans.push((col, width, name.to_string()));
            spans.push(Span::styled(label, style));
            col += width;
        }

        frame.render_widget(Line::from(spans), area);
    }
}
