//! # Application State
//!
//! Core business state for Chatter. This module contains domain state only -
//! no TUI-specific types. Presentation state (buffers, cursors, scroll,
//! per-message transient flags) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn MessageBackend>  // dispatch boundary
//! ├── catalog: ChannelCatalog           // ordered channels, "all" implicit
//! ├── channel: String                   // viewed + composer-selected channel
//! ├── sending: bool                     // one outstanding send, max
//! ├── messages: Vec<Message>            // backend-owned list (read copy)
//! ├── users: HashMap<u64, User>         // directory for sender names
//! ├── current_user: Option<User>        // None until login
//! ├── loading: bool                     // initial/refresh fetch in flight
//! └── status_message: String            // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::MessageBackend;
use crate::core::channel::{ALL_CHANNEL, ChannelCatalog};
use crate::core::config::ResolvedConfig;
use crate::core::message::{Message, User};

pub struct App {
    pub backend: Arc<dyn MessageBackend>,
    pub catalog: ChannelCatalog,
    /// The channel being viewed, which is also the channel the next message
    /// will be tagged with. The two are deliberately the same piece of
    /// state, so channel inference in the composer changes the view too.
    pub channel: String,
    /// True while a composer send is awaiting its dispatch result.
    pub sending: bool,
    pub messages: Vec<Message>,
    pub users: HashMap<u64, User>,
    pub current_user: Option<User>,
    /// True while a message-list fetch is in flight.
    pub loading: bool,
    pub status_message: String,
}

impl App {
    pub fn new(backend: Arc<dyn MessageBackend>, catalog: ChannelCatalog) -> Self {
        Self {
            backend,
            catalog,
            channel: ALL_CHANNEL.to_string(),
            sending: false,
            messages: Vec::new(),
            users: HashMap::new(),
            current_user: None,
            loading: false,
            status_message: String::from("Welcome to Chatter!"),
        }
    }

    pub fn from_config(backend: Arc<dyn MessageBackend>, config: &ResolvedConfig) -> Self {
        Self::new(backend, config.catalog.clone())
    }

    /// Display name for a sender id: directory entry, or a synthesized
    /// fallback when the directory has no entry (or hasn't loaded yet).
    pub fn sender_name(&self, sender: u64) -> String {
        self.users
            .get(&sender)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| format!("User {sender}"))
    }

    /// Whether the signed-in user authored the message.
    pub fn is_own_message(&self, message: &Message) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|u| u.id == message.sender)
    }

    pub fn message_by_id(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }
}
