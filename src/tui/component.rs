use ratatui::Frame;
use ratatui::layout::Rect;

/// A renderable UI piece: the composer, the thread view, the channel bar.
///
/// Components receive external data as props (struct fields set each frame)
/// and may own internal state (buffers, scroll offsets). Persistent state
/// lives in `TuiState`; transient wrappers borrow it per frame.
///
/// `render` takes `&mut self` so a component can maintain presentation
/// state mid-pass — the message list records row geometry for hit testing,
/// the composer places the terminal cursor. This mirrors Ratatui's
/// `StatefulWidget` split without forcing every component into it.
pub trait Component {
    /// Render the component into the given area.
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that consumes terminal events and may emit a higher-level
/// one for the event loop to act on (a submitted draft, a chosen tag).
///
/// Returning `None` means the event was either absorbed (a keystroke into
/// a buffer) or ignored; the loop never double-routes an event.
pub trait EventHandler {
    /// The type of high-level event this component emits.
    type Event;

    /// Handle a low-level `TuiEvent` and optionally return a high-level event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
