//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard/mouse events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event routing
//!
//! Input goes to exactly one place per event, checked in priority order:
//! open overlays first (tag modal, login modal, delete confirmation — their
//! key bindings exist only while their state object does), then the current
//! focus (composer, message browsing, an inline edit, or a reply input).
//!
//! ## Redraw Strategy
//!
//! The loop uses conditional redraw: while something animates (a send or
//! delete in flight, the initial load) it draws at ~12fps for the pulse;
//! idle, it sleeps up to 500ms and only redraws on events. Dispatch results
//! arrive on an mpsc channel and are folded through `update()` exactly like
//! input-driven actions.

pub mod component;
pub mod components;
pub mod event;
pub mod markdown;
pub mod sanitize;
pub mod theme;
pub mod timefmt;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::layout::Rect;

use crate::backend::{HostedBackend, MessageAction, MessageBackend};
use crate::core::action::{Action, DispatchOrigin, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    Composer, ComposerEvent, ItemInputEvent, LoginEvent, LoginModalState, MessageListState,
    TagModalEvent, TagModalState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::theme::parse_color;

/// Where keyboard input currently lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Typing into the composer. Esc switches to Browse.
    Composer,
    /// Navigating messages with arrow keys; e/d/r act on the selection.
    /// Typing anything else switches back to Composer.
    Browse,
    /// Inline edit of the message with this id.
    Edit(u64),
    /// Reply input nested under the message with this id.
    Reply(u64),
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub composer: Composer,
    pub message_list: MessageListState,
    pub tag_modal: Option<TagModalState>,
    pub login_modal: Option<LoginModalState>,
    pub focus: Focus,
    // Animation state
    pub pulse_value: f32,
    // Geometry recorded by draw_ui for mouse handling
    pub messages_area: Rect,
    pub channel_hits: Vec<(u16, u16, String)>,
    pub channel_bar_row: u16,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            composer: Composer::new(),
            message_list: MessageListState::new(),
            tag_modal: None,
            login_modal: None,
            focus: Focus::Composer, // User expects to type immediately
            pulse_value: 0.0,
            messages_area: Rect::default(),
            channel_hits: Vec::new(),
            channel_bar_row: 0,
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        info!("Terminal modes enabled (mouse capture, bracketed paste)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn MessageBackend> =
        Arc::new(HostedBackend::new(config.backend_base_url.clone()));
    let mut app = App::from_config(backend, &config);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()?;

    // Channel for actions resolved by background tasks
    let (tx, rx) = mpsc::channel();

    // Initial load: messages + user directory, plus the configured
    // auto-login if one is set.
    app.loading = true;
    spawn_fetch_messages(app.backend.clone(), tx.clone());
    spawn_fetch_users(app.backend.clone(), tx.clone());
    if let Some(ref name) = config.username {
        spawn_login(app.backend.clone(), name.clone(), tx.clone());
    }

    let start_time = std::time::Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        // Sync composer props with App/TUI state
        tui.composer.channel = app.channel.clone();
        tui.composer.channel_color = app
            .catalog
            .color_of(&app.channel)
            .map(parse_color)
            .unwrap_or(ratatui::style::Color::Gray);
        tui.composer.sending = app.sending;
        tui.composer.dimmed = tui.focus != Focus::Composer;
        tui.composer.pulse = tui.pulse_value;

        let delete_pulsing = tui
            .message_list
            .item_states
            .values()
            .any(|s| s.delete_in_flight);
        let animating = app.sending || app.loading || delete_pulsing;
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let elapsed = start_time.elapsed().as_secs_f32();
            tui.pulse_value = (elapsed * 5.0).sin() * 0.5 + 0.5;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            std::time::Duration::from_millis(80)
        } else {
            std::time::Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if matches!(event, TuiEvent::Resize) {
                continue;
            }

            // Ctrl+C always quits regardless of focus
            if matches!(event, TuiEvent::ForceQuit) {
                if update(&mut app, Action::Quit) == Effect::Quit {
                    should_quit = true;
                }
                continue;
            }

            // ── Overlays take all input while open ──────────────────────
            if tui.tag_modal.is_some() {
                handle_tag_modal_event(&event, &mut app, &mut tui, &tx);
                continue;
            }
            if tui.login_modal.is_some() {
                handle_login_modal_event(&event, &mut app, &mut tui, &tx);
                continue;
            }
            if let Some(target) = tui.message_list.delete_confirm_target() {
                handle_delete_confirm_event(&event, target, &mut app, &mut tui, &tx);
                continue;
            }

            // ── Global bindings ─────────────────────────────────────────
            match &event {
                TuiEvent::MouseMove(col, row) => {
                    if let Some(content_y) = ui::message_content_y(&tui, *col, *row) {
                        tui.message_list.selected = tui.message_list.hit_test(content_y);
                    }
                    continue;
                }
                TuiEvent::MouseClick(col, row) => {
                    if *row == tui.channel_bar_row {
                        let hit = tui
                            .channel_hits
                            .iter()
                            .find(|(start, width, _)| col >= start && *col < start + width)
                            .map(|(_, _, name)| name.clone());
                        if let Some(name) = hit {
                            apply(&mut app, Action::SelectChannel(name), &mut tui, &tx);
                        }
                    } else if let Some(content_y) = ui::message_content_y(&tui, *col, *row) {
                        tui.message_list.selected = tui.message_list.hit_test(content_y);
                        if tui.message_list.selected.is_some() {
                            tui.focus = Focus::Browse;
                        }
                    }
                    continue;
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.message_list.handle_event(&event);
                    continue;
                }
                TuiEvent::CycleChannel => {
                    apply(&mut app, Action::CycleChannel, &mut tui, &tx);
                    continue;
                }
                TuiEvent::Refresh => {
                    apply(&mut app, Action::RefreshRequested, &mut tui, &tx);
                    continue;
                }
                _ => {}
            }

            // ── Focus routing ───────────────────────────────────────────
            match tui.focus {
                Focus::Composer => {
                    if matches!(event, TuiEvent::Escape) {
                        tui.focus = Focus::Browse;
                        if tui.message_list.selected.is_none() {
                            tui.message_list.select_adjacent(-1);
                        }
                        continue;
                    }
                    if let Some(composer_event) = tui.composer.handle_event(&event) {
                        match composer_event {
                            ComposerEvent::Submit(text) => {
                                apply(&mut app, Action::SubmitDraft(text), &mut tui, &tx);
                            }
                            ComposerEvent::ContentChanged(text) => {
                                apply(&mut app, Action::DraftChanged(text), &mut tui, &tx);
                            }
                        }
                    }
                }
                Focus::Browse => handle_browse_event(&event, &mut app, &mut tui),
                Focus::Edit(id) => {
                    if !tui.message_list.item_states.contains_key(&id) {
                        tui.focus = Focus::Browse;
                        continue;
                    }
                    let item_event = tui.message_list.state_of(id).handle_edit_event(&event);
                    match item_event {
                        Some(ItemInputEvent::SaveEdit(body)) => {
                            tui.focus = Focus::Browse;
                            apply(
                                &mut app,
                                Action::SaveEdit {
                                    message_id: id,
                                    body,
                                },
                                &mut tui,
                                &tx,
                            );
                        }
                        Some(ItemInputEvent::CancelEdit) => tui.focus = Focus::Browse,
                        _ => {}
                    }
                }
                Focus::Reply(id) => {
                    if !tui.message_list.item_states.contains_key(&id) {
                        tui.focus = Focus::Browse;
                        continue;
                    }
                    let item_event = tui.message_list.state_of(id).handle_reply_event(&event);
                    match item_event {
                        Some(ItemInputEvent::SubmitReply(body)) => {
                            tui.focus = Focus::Browse;
                            apply(
                                &mut app,
                                Action::SubmitReply {
                                    reply_to: id,
                                    body,
                                },
                                &mut tui,
                                &tx,
                            );
                        }
                        Some(ItemInputEvent::CancelReply) => tui.focus = Focus::Browse,
                        _ => {}
                    }
                }
            }
        }

        if should_quit {
            break;
        }

        // Handle background task results (dispatch outcomes, fetches)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);

            // Presentation-side reactions to specific resolutions
            match &action {
                // The draft is cleared when the dispatch resolves,
                // success or error alike.
                Action::SendFinished(_) => tui.composer.clear(),
                Action::LoginFinished(Ok(_)) => tui.login_modal = None,
                Action::LoginFinished(Err(_)) => {
                    if let Some(ref mut login) = tui.login_modal {
                        login.waiting = false;
                    }
                }
                _ => {}
            }

            let refreshed = matches!(&action, Action::MessagesLoaded(Ok(_)));
            if apply(&mut app, action, &mut tui, &tx) {
                should_quit = true;
                break;
            }
            if refreshed {
                // Deleted messages take their transient state (including an
                // open delete prompt) with them.
                tui.message_list.prune(&app.messages);
                match tui.focus {
                    Focus::Edit(id) | Focus::Reply(id)
                        if !tui.message_list.item_states.contains_key(&id) =>
                    {
                        tui.focus = Focus::Browse;
                    }
                    _ => {}
                }
            }
        }

        if should_quit {
            break;
        }
    }

    ratatui::restore();
    Ok(())
}

/// Run an action through the reducer and perform the resulting effect.
/// Returns true when the app should quit.
fn apply(app: &mut App, action: Action, tui: &mut TuiState, tx: &mpsc::Sender<Action>) -> bool {
    let effect = update(app, action);
    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::Dispatch { action, origin } => {
            spawn_dispatch(app.backend.clone(), action, origin, tx.clone());
            false
        }
        Effect::Login(name) => {
            if let Some(ref mut login) = tui.login_modal {
                login.waiting = true;
            }
            spawn_login(app.backend.clone(), name, tx.clone());
            false
        }
        Effect::Refresh => {
            spawn_fetch_messages(app.backend.clone(), tx.clone());
            false
        }
        Effect::OpenTagPicker => {
            tui.tag_modal = Some(TagModalState::new(&app.catalog, &app.channel));
            false
        }
        Effect::OpenLogin => {
            tui.login_modal = Some(LoginModalState::new(
                "Create an account to send your message",
            ));
            false
        }
    }
}

fn handle_tag_modal_event(
    event: &TuiEvent,
    app: &mut App,
    tui: &mut TuiState,
    tx: &mpsc::Sender<Action>,
) {
    let Some(ref mut tag_modal) = tui.tag_modal else {
        return;
    };
    match tag_modal.handle_event(event) {
        Some(TagModalEvent::Preview(channel)) => {
            apply(app, Action::TagPreviewed(channel), tui, tx);
        }
        Some(TagModalEvent::Select(channel)) => {
            tui.tag_modal = None;
            let draft = tui.composer.buffer().to_string();
            apply(app, Action::TagChosen { channel, draft }, tui, tx);
        }
        Some(TagModalEvent::Dismiss) => {
            // Close without selecting: the draft stays put for a retry
            tui.tag_modal = None;
        }
        None => {}
    }
}

fn handle_login_modal_event(
    event: &TuiEvent,
    app: &mut App,
    tui: &mut TuiState,
    tx: &mpsc::Sender<Action>,
) {
    let Some(ref mut login_modal) = tui.login_modal else {
        return;
    };
    match login_modal.handle_event(event) {
        Some(LoginEvent::Submit(name)) => {
            apply(app, Action::LoginSubmitted(name), tui, tx);
        }
        Some(LoginEvent::Dismiss) => tui.login_modal = None,
        None => {}
    }
}

fn handle_delete_confirm_event(
    event: &TuiEvent,
    target: u64,
    app: &mut App,
    tui: &mut TuiState,
    tx: &mpsc::Sender<Action>,
) {
    match event {
        TuiEvent::Submit | TuiEvent::InputChar('y') => {
            // The guard makes a double-confirm a no-op: one prompt, one
            // delete action, no matter how eagerly Enter is pressed.
            if tui.message_list.state_of(target).confirm_delete() {
                apply(app, Action::ConfirmDelete { message_id: target }, tui, tx);
            }
        }
        TuiEvent::Escape | TuiEvent::InputChar('n') => {
            tui.message_list.state_of(target).cancel_delete();
        }
        _ => {}
    }
}

fn handle_browse_event(event: &TuiEvent, app: &mut App, tui: &mut TuiState) {
    match event {
        TuiEvent::Escape => {}
        TuiEvent::CursorUp => tui.message_list.select_adjacent(-1),
        TuiEvent::CursorDown => tui.message_list.select_adjacent(1),
        TuiEvent::InputChar('e') => {
            let Some(id) = tui.message_list.selected else {
                return;
            };
            let Some(message) = app.message_by_id(id) else {
                return;
            };
            let permitted = app.is_own_message(message);
            let body = message.body.clone();
            if tui.message_list.state_of(id).start_edit(&body, permitted) {
                tui.focus = Focus::Edit(id);
            }
        }
        TuiEvent::InputChar('d') => {
            let Some(id) = tui.message_list.selected else {
                return;
            };
            let Some(message) = app.message_by_id(id) else {
                return;
            };
            if app.is_own_message(message) {
                tui.message_list.state_of(id).request_delete();
            }
        }
        TuiEvent::InputChar('r') => {
            let Some(id) = tui.message_list.selected else {
                return;
            };
            // The reply affordance only exists for signed-in users
            if app.current_user.is_none() || app.message_by_id(id).is_none() {
                return;
            }
            if tui.message_list.state_of(id).toggle_reply() {
                tui.focus = Focus::Reply(id);
            } else {
                tui.focus = Focus::Browse;
            }
        }
        // Any other typing returns to the composer and lands there
        TuiEvent::InputChar(_) | TuiEvent::Paste(_) => {
            tui.focus = Focus::Composer;
            tui.message_list.selected = None;
            tui.composer.handle_event(event);
        }
        TuiEvent::Submit => {
            tui.focus = Focus::Composer;
            tui.message_list.selected = None;
        }
        _ => {}
    }
}

fn spawn_dispatch(
    backend: Arc<dyn MessageBackend>,
    action: MessageAction,
    origin: DispatchOrigin,
    tx: mpsc::Sender<Action>,
) {
    info!("Spawning dispatch: {} ({origin:?})", action.kind());
    tokio::spawn(async move {
        let result = backend.dispatch(action).await;
        let resolved = match origin {
            DispatchOrigin::Send => Action::SendFinished(result),
            DispatchOrigin::Reply => Action::ReplyFinished(result),
            DispatchOrigin::Edit => Action::EditFinished(result),
            DispatchOrigin::Delete { message_id } => Action::DeleteFinished { message_id, result },
        };
        if tx.send(resolved).is_err() {
            warn!("Failed to send dispatch result: receiver dropped");
        }
    });
}

fn spawn_fetch_messages(backend: Arc<dyn MessageBackend>, tx: mpsc::Sender<Action>) {
    debug!("Spawning message fetch");
    tokio::spawn(async move {
        let result = backend.fetch_messages().await;
        if tx.send(Action::MessagesLoaded(result)).is_err() {
            warn!("Failed to send fetched messages: receiver dropped");
        }
    });
}

fn spawn_fetch_users(backend: Arc<dyn MessageBackend>, tx: mpsc::Sender<Action>) {
    debug!("Spawning user directory fetch");
    tokio::spawn(async move {
        let result = backend.fetch_users().await;
        if tx.send(Action::UsersLoaded(result)).is_err() {
            warn!("Failed to send fetched users: receiver dropped");
        }
    });
}

fn spawn_login(backend: Arc<dyn MessageBackend>, name: String, tx: mpsc::Sender<Action>) {
    info!("Spawning login for '{name}'");
    tokio::spawn(async move {
        let result = backend.login(&name).await;
        if tx.send(Action::LoginFinished(result)).is_err() {
            warn!("Failed to send login result: receiver dropped");
        }
    });
}
