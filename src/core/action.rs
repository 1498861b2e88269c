//! # Actions
//!
//! Everything that can happen in Chatter becomes an `Action`.
//! User presses Enter in the composer? That's `Action::SubmitDraft`.
//! The backend acknowledges a send? That's `Action::SendFinished(result)`.
//!
//! The `update()` function takes the current state and an action, applies
//! the transition, and returns an `Effect` telling the event loop what I/O
//! to start. No I/O happens here, which is what makes the composer's
//! precondition chain and the tagging flow directly testable:
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{info, warn};

use crate::backend::{BackendError, MessageAction};
use crate::core::channel::ALL_CHANNEL;
use crate::core::message::{Message, User};
use crate::core::state::App;

/// Which user interaction produced an outstanding dispatch. The event loop
/// uses this to route the resolved result back as the right `*Finished`
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOrigin {
    Send,
    Reply,
    Edit,
    Delete { message_id: u64 },
}

#[derive(Debug)]
pub enum Action {
    // Composer
    /// Draft text changed; runs channel inference.
    DraftChanged(String),
    /// Enter pressed in the composer with the given draft text.
    SubmitDraft(String),
    /// A concrete channel was picked in the tag modal; submits immediately.
    TagChosen { channel: String, draft: String },
    /// The tag modal highlight moved; previews the channel selection.
    TagPreviewed(String),
    SendFinished(Result<(), BackendError>),

    // Message item operations
    SaveEdit { message_id: u64, body: String },
    EditFinished(Result<(), BackendError>),
    ConfirmDelete { message_id: u64 },
    DeleteFinished { message_id: u64, result: Result<(), BackendError> },
    SubmitReply { reply_to: u64, body: String },
    ReplyFinished(Result<(), BackendError>),

    // Login
    LoginSubmitted(String),
    LoginFinished(Result<User, BackendError>),

    // Data loading
    RefreshRequested,
    MessagesLoaded(Result<Vec<Message>, BackendError>),
    UsersLoaded(Result<std::collections::HashMap<u64, User>, BackendError>),

    // Navigation
    CycleChannel,
    SelectChannel(String),
    Quit,
}

/// Side effects the event loop performs after a state transition.
#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    /// Spawn `backend.dispatch(action)`; resolve back via `origin`.
    Dispatch {
        action: MessageAction,
        origin: DispatchOrigin,
    },
    /// Spawn `backend.login(name)`.
    Login(String),
    /// Spawn a message-list refetch.
    Refresh,
    /// Open the tag-selection modal (composer target was "all").
    OpenTagPicker,
    /// Open the login prompt (no authenticated user).
    OpenLogin,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        // ── Composer ────────────────────────────────────────────────────
        Action::DraftChanged(text) => {
            // Inference only ever switches the selection to a newly
            // mentioned channel; it never un-tags on deletion.
            if let Some(inferred) = app.catalog.infer_from_text(&app.channel, &text) {
                info!("Inferred channel '{}' from draft", inferred);
                app.channel = inferred.to_string();
            }
            Effect::None
        }

        Action::SubmitDraft(text) => submit_draft(app, text),

        Action::TagChosen { channel, draft } => {
            app.channel = channel;
            // The modal re-checks auth itself: a session can expire between
            // opening the picker and choosing a tag.
            submit_now(app, draft, None)
        }

        Action::TagPreviewed(channel) => {
            // Hover/highlight previews mutate the shared selection directly,
            // same as a real pick — only the submit is withheld.
            app.channel = channel;
            Effect::None
        }

        Action::SendFinished(result) => {
            app.sending = false;
            match result {
                Ok(()) => {
                    app.status_message.clear();
                    Effect::Refresh
                }
                Err(e) => {
                    // The draft is cleared by the composer regardless; the
                    // failure is logged, not surfaced.
                    warn!("Send failed: {e}");
                    Effect::None
                }
            }
        }

        // ── Message item operations ─────────────────────────────────────
        Action::SaveEdit { message_id, body } => {
            let Some(message) = app.message_by_id(message_id) else {
                warn!("Edit for unknown message {message_id}");
                return Effect::None;
            };
            if !app.is_own_message(message) {
                warn!("Ignoring edit of message {message_id} by non-author");
                return Effect::None;
            }
            Effect::Dispatch {
                action: MessageAction::MessageEdit { message_id, body },
                origin: DispatchOrigin::Edit,
            }
        }

        Action::EditFinished(result) => match result {
            Ok(()) => Effect::Refresh,
            Err(e) => {
                // Edit failures are not surfaced anywhere in the UI; the
                // stale body simply reappears on the next refresh.
                warn!("Edit failed: {e}");
                Effect::None
            }
        },

        Action::ConfirmDelete { message_id } => Effect::Dispatch {
            action: MessageAction::MessageDelete { message_id },
            origin: DispatchOrigin::Delete { message_id },
        },

        Action::DeleteFinished { message_id, result } => match result {
            Ok(()) => Effect::Refresh,
            Err(e) => {
                warn!("Delete of message {message_id} failed: {e}");
                Effect::None
            }
        },

        Action::SubmitReply { reply_to, body } => submit_reply(app, reply_to, body),

        Action::ReplyFinished(result) => match result {
            Ok(()) => Effect::Refresh,
            Err(e) => {
                warn!("Reply failed: {e}");
                Effect::None
            }
        },

        // ── Login ───────────────────────────────────────────────────────
        Action::LoginSubmitted(name) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                app.status_message = String::from("Enter a name to sign in");
                Effect::None
            } else {
                Effect::Login(name)
            }
        }

        Action::LoginFinished(result) => match result {
            Ok(user) => {
                info!("Signed in as {} (id={})", user.name, user.id);
                app.status_message = format!("Signed in as {}", user.name);
                app.current_user = Some(user);
                Effect::None
            }
            Err(e) => {
                warn!("Login failed: {e}");
                app.status_message = format!("Login failed: {e}");
                Effect::None
            }
        },

        // ── Data loading ────────────────────────────────────────────────
        Action::RefreshRequested => {
            app.loading = true;
            Effect::Refresh
        }

        Action::MessagesLoaded(result) => {
            app.loading = false;
            match result {
                Ok(messages) => {
                    app.messages = messages;
                    Effect::None
                }
                Err(e) => {
                    warn!("Message fetch failed: {e}");
                    app.status_message = format!("Refresh failed: {e}");
                    Effect::None
                }
            }
        }

        Action::UsersLoaded(result) => {
            match result {
                Ok(users) => app.users = users,
                Err(e) => warn!("User directory fetch failed: {e}"),
            }
            Effect::None
        }

        // ── Navigation ──────────────────────────────────────────────────
        Action::CycleChannel => {
            app.channel = app.catalog.next_after(&app.channel);
            Effect::None
        }

        Action::SelectChannel(name) => {
            if name == ALL_CHANNEL || app.catalog.is_real(&name) {
                app.channel = name;
            }
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}

/// The composer's precondition chain, in order: non-empty draft,
/// authenticated user, concrete channel. Only then does a create action
/// cross the dispatch boundary.
fn submit_draft(app: &mut App, text: String) -> Effect {
    if app.sending {
        // The input surface is disabled while sending; this is the
        // belt-and-braces reject for events already in flight.
        return Effect::None;
    }
    if text.is_empty() {
        app.status_message = String::from("Cannot send an empty message");
        return Effect::None;
    }
    if app.current_user.is_none() {
        return Effect::OpenLogin;
    }
    if app.channel == ALL_CHANNEL {
        return Effect::OpenTagPicker;
    }
    submit_now(app, text, None)
}

/// Issue the create action. Callers have already run (or deliberately
/// skipped) the precondition chain; auth is re-checked because every path
/// needs a sender id.
fn submit_now(app: &mut App, body: String, reply_to: Option<u64>) -> Effect {
    let Some(user) = app.current_user.as_ref() else {
        warn!("Submit without authenticated user");
        return Effect::None;
    };
    app.sending = true;
    Effect::Dispatch {
        action: MessageAction::MessageCreate {
            sender: user.id,
            body,
            tags: vec![app.channel.clone()],
            reply_to,
        },
        origin: if reply_to.is_some() {
            DispatchOrigin::Reply
        } else {
            DispatchOrigin::Send
        },
    }
}

/// Replies inherit the parent's tags so a thread stays visible in the
/// channels its root was posted to, even when viewed from "all".
fn submit_reply(app: &mut App, reply_to: u64, body: String) -> Effect {
    if body.is_empty() {
        return Effect::None;
    }
    let Some(user) = app.current_user.as_ref() else {
        return Effect::OpenLogin;
    };
    let Some(parent) = app.message_by_id(reply_to) else {
        warn!("Reply to unknown message {reply_to}");
        return Effect::None;
    };
    let tags = if parent.tags.is_empty() {
        vec![app.channel.clone()]
    } else {
        parent.tags.clone()
    };
    Effect::Dispatch {
        action: MessageAction::MessageCreate {
            sender: user.id,
            body,
            tags,
            reply_to: Some(reply_to),
        },
        origin: DispatchOrigin::Reply,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_app, test_app_signed_in, test_message};

    // ── Channel inference ───────────────────────────────────────────────

    #[test]
    fn draft_change_infers_mentioned_channel() {
        let mut app = test_app();
        // Catalog: bugs, general, ideas (see test_support)
        let effect = update(&mut app, Action::DraftChanged("fix the bugs please".into()));
        assert_eq!(effect, Effect::None);
        assert_eq!(app.channel, "bugs");
    }

    #[test]
    fn draft_change_without_mention_keeps_channel() {
        let mut app = test_app();
        update(&mut app, Action::DraftChanged("nothing relevant".into()));
        assert_eq!(app.channel, "all");
    }

    #[test]
    fn inference_is_not_undone_when_mention_is_deleted() {
        let mut app = test_app();
        update(&mut app, Action::DraftChanged("bugs".into()));
        assert_eq!(app.channel, "bugs");
        // Deleting the mention leaves the inferred selection in place
        update(&mut app, Action::DraftChanged("bu".into()));
        assert_eq!(app.channel, "bugs");
    }

    // ── Submit precondition chain ───────────────────────────────────────

    #[test]
    fn empty_draft_never_dispatches() {
        let mut app = test_app_signed_in();
        app.channel = "bugs".into();
        let effect = update(&mut app, Action::SubmitDraft(String::new()));
        assert_eq!(effect, Effect::None);
        assert!(!app.sending);
        assert_eq!(app.status_message, "Cannot send an empty message");
    }

    #[test]
    fn submit_without_user_opens_login() {
        let mut app = test_app();
        app.channel = "bugs".into();
        let effect = update(&mut app, Action::SubmitDraft("hello".into()));
        assert_eq!(effect, Effect::OpenLogin);
        assert!(!app.sending);
    }

    #[test]
    fn submit_on_all_channel_opens_tag_picker_not_dispatch() {
        let mut app = test_app_signed_in();
        assert_eq!(app.channel, "all");
        let effect = update(&mut app, Action::SubmitDraft("hello".into()));
        assert_eq!(effect, Effect::OpenTagPicker);
        assert!(!app.sending);
    }

    #[test]
    fn submit_on_concrete_channel_dispatches_create() {
        let mut app = test_app_signed_in();
        app.channel = "bugs".into();
        let effect = update(&mut app, Action::SubmitDraft("hello".into()));
        match effect {
            Effect::Dispatch {
                action:
                    MessageAction::MessageCreate {
                        sender,
                        body,
                        tags,
                        reply_to,
                    },
                origin: DispatchOrigin::Send,
            } => {
                assert_eq!(sender, 1);
                assert_eq!(body, "hello");
                assert_eq!(tags, vec!["bugs".to_string()]);
                assert_eq!(reply_to, None);
            }
            other => panic!("expected create dispatch, got {other:?}"),
        }
        assert!(app.sending);
    }

    #[test]
    fn submit_while_sending_is_rejected() {
        let mut app = test_app_signed_in();
        app.channel = "bugs".into();
        app.sending = true;
        let effect = update(&mut app, Action::SubmitDraft("again".into()));
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn send_finished_clears_sending_on_success_and_error() {
        let mut app = test_app_signed_in();
        app.sending = true;
        let effect = update(&mut app, Action::SendFinished(Ok(())));
        assert_eq!(effect, Effect::Refresh);
        assert!(!app.sending);

        app.sending = true;
        let effect = update(
            &mut app,
            Action::SendFinished(Err(crate::backend::BackendError::Network("down".into()))),
        );
        // Error swallowed: no refresh, no status surface
        assert_eq!(effect, Effect::None);
        assert!(!app.sending);
    }

    // ── Tag picker flow ─────────────────────────────────────────────────

    #[test]
    fn tag_preview_mutates_shared_selection() {
        let mut app = test_app_signed_in();
        update(&mut app, Action::TagPreviewed("ideas".into()));
        assert_eq!(app.channel, "ideas");
    }

    #[test]
    fn tag_chosen_sets_channel_and_dispatches() {
        let mut app = test_app_signed_in();
        let effect = update(
            &mut app,
            Action::TagChosen {
                channel: "general".into(),
                draft: "hi all".into(),
            },
        );
        assert_eq!(app.channel, "general");
        assert!(app.sending);
        match effect {
            Effect::Dispatch {
                action: MessageAction::MessageCreate { tags, .. },
                origin: DispatchOrigin::Send,
            } => assert_eq!(tags, vec!["general".to_string()]),
            other => panic!("expected create dispatch, got {other:?}"),
        }
    }

    #[test]
    fn tag_chosen_without_user_is_silent_noop() {
        let mut app = test_app();
        let effect = update(
            &mut app,
            Action::TagChosen {
                channel: "general".into(),
                draft: "hi".into(),
            },
        );
        // The modal path bails silently rather than opening the login prompt
        assert_eq!(effect, Effect::None);
        assert!(!app.sending);
    }

    // ── Edit / delete / reply ───────────────────────────────────────────

    #[test]
    fn save_edit_by_author_dispatches_edit() {
        let mut app = test_app_signed_in();
        app.messages = vec![test_message(10, 1, &["bugs"])];
        let effect = update(
            &mut app,
            Action::SaveEdit {
                message_id: 10,
                body: "edited".into(),
            },
        );
        match effect {
            Effect::Dispatch {
                action: MessageAction::MessageEdit { message_id, body },
                origin: DispatchOrigin::Edit,
            } => {
                assert_eq!(message_id, 10);
                assert_eq!(body, "edited");
            }
            other => panic!("expected edit dispatch, got {other:?}"),
        }
    }

    #[test]
    fn save_edit_by_non_author_is_noop() {
        let mut app = test_app_signed_in(); // signed in as user 1
        app.messages = vec![test_message(10, 2, &["bugs"])];
        let effect = update(
            &mut app,
            Action::SaveEdit {
                message_id: 10,
                body: "edited".into(),
            },
        );
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn edit_round_trip_refreshes_and_shows_the_new_body() {
        let mut app = test_app_signed_in();
        app.messages = vec![test_message(10, 1, &["bugs"])];
        update(
            &mut app,
            Action::SaveEdit {
                message_id: 10,
                body: "now **fixed**".into(),
            },
        );
        // The resolved edit triggers a refetch...
        let effect = update(&mut app, Action::EditFinished(Ok(())));
        assert_eq!(effect, Effect::Refresh);
        // ...and the refetched list carries the new body
        let mut updated = test_message(10, 1, &["bugs"]);
        updated.body = "now **fixed**".into();
        update(&mut app, Action::MessagesLoaded(Ok(vec![updated])));
        assert_eq!(app.message_by_id(10).unwrap().body, "now **fixed**");
    }

    #[test]
    fn failed_edit_is_logged_but_not_surfaced() {
        let mut app = test_app_signed_in();
        let before_status = app.status_message.clone();
        let effect = update(
            &mut app,
            Action::EditFinished(Err(crate::backend::BackendError::Network("down".into()))),
        );
        assert_eq!(effect, Effect::None);
        assert_eq!(app.status_message, before_status);
    }

    #[test]
    fn successful_delete_refreshes_the_list() {
        let mut app = test_app_signed_in();
        let effect = update(
            &mut app,
            Action::DeleteFinished {
                message_id: 7,
                result: Ok(()),
            },
        );
        assert_eq!(effect, Effect::Refresh);
    }

    #[test]
    fn confirm_delete_dispatches_delete() {
        let mut app = test_app_signed_in();
        let effect = update(&mut app, Action::ConfirmDelete { message_id: 7 });
        match effect {
            Effect::Dispatch {
                action: MessageAction::MessageDelete { message_id },
                origin: DispatchOrigin::Delete { message_id: origin_id },
            } => {
                assert_eq!(message_id, 7);
                assert_eq!(origin_id, 7);
            }
            other => panic!("expected delete dispatch, got {other:?}"),
        }
    }

    #[test]
    fn reply_inherits_parent_tags() {
        let mut app = test_app_signed_in();
        app.channel = "all".into();
        app.messages = vec![test_message(5, 2, &["bugs", "ideas"])];
        let effect = update(
            &mut app,
            Action::SubmitReply {
                reply_to: 5,
                body: "me too".into(),
            },
        );
        match effect {
            Effect::Dispatch {
                action:
                    MessageAction::MessageCreate {
                        tags, reply_to, ..
                    },
                origin: DispatchOrigin::Reply,
            } => {
                assert_eq!(tags, vec!["bugs".to_string(), "ideas".to_string()]);
                assert_eq!(reply_to, Some(5));
            }
            other => panic!("expected reply dispatch, got {other:?}"),
        }
    }

    #[test]
    fn reply_without_user_opens_login() {
        let mut app = test_app();
        app.messages = vec![test_message(5, 2, &["bugs"])];
        let effect = update(
            &mut app,
            Action::SubmitReply {
                reply_to: 5,
                body: "me too".into(),
            },
        );
        assert_eq!(effect, Effect::OpenLogin);
    }

    // ── Login / data ────────────────────────────────────────────────────

    #[test]
    fn login_finished_sets_current_user() {
        let mut app = test_app();
        update(
            &mut app,
            Action::LoginFinished(Ok(crate::core::message::User {
                id: 9,
                name: "zoe".into(),
            })),
        );
        assert_eq!(app.current_user.as_ref().unwrap().id, 9);
        assert_eq!(app.status_message, "Signed in as zoe");
    }

    #[test]
    fn messages_loaded_replaces_list_and_clears_loading() {
        let mut app = test_app();
        app.loading = true;
        update(
            &mut app,
            Action::MessagesLoaded(Ok(vec![test_message(1, 1, &["bugs"])])),
        );
        assert!(!app.loading);
        assert_eq!(app.messages.len(), 1);
    }

    #[test]
    fn cycle_channel_walks_the_catalog() {
        let mut app = test_app();
        update(&mut app, Action::CycleChannel);
        assert_eq!(app.channel, "bugs");
        update(&mut app, Action::CycleChannel);
        assert_eq!(app.channel, "general");
    }

    #[test]
    fn select_channel_rejects_unknown_names() {
        let mut app = test_app();
        update(&mut app, Action::SelectChannel("nope".into()));
        assert_eq!(app.channel, "all");
        update(&mut app, Action::SelectChannel("ideas".into()));
        assert_eq!(app.channel, "ideas");
    }
}
