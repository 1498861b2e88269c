//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::backend::{BackendError, MessageAction, MessageBackend};
use crate::core::channel::{Channel, ChannelCatalog};
use crate::core::message::{Message, User};
use crate::core::state::App;

/// A backend that records every dispatched action and answers reads from
/// in-memory fixtures. Lets reducer and component tests assert on exactly
/// what crossed the boundary.
#[derive(Default)]
pub struct RecordingBackend {
    pub dispatched: Mutex<Vec<MessageAction>>,
    pub messages: Mutex<Vec<Message>>,
    pub users: Mutex<HashMap<u64, User>>,
}

#[async_trait]
impl MessageBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    async fn dispatch(&self, action: MessageAction) -> Result<(), BackendError> {
        self.dispatched.lock().unwrap().push(action);
        Ok(())
    }

    async fn fetch_messages(&self) -> Result<Vec<Message>, BackendError> {
        Ok(self.messages.lock().unwrap().clone())
    }

    async fn fetch_users(&self) -> Result<HashMap<u64, User>, BackendError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn login(&self, name: &str) -> Result<User, BackendError> {
        Ok(User {
            id: 1,
            name: name.to_string(),
        })
    }
}

/// Catalog used throughout the tests: bugs, general, ideas (in that order).
pub fn test_catalog() -> ChannelCatalog {
    ChannelCatalog::new(vec![
        Channel {
            name: "bugs".into(),
            color: "red".into(),
        },
        Channel {
            name: "general".into(),
            color: "cyan".into(),
        },
        Channel {
            name: "ideas".into(),
            color: "yellow".into(),
        },
    ])
}

/// Creates a test App with a RecordingBackend, signed out, viewing "all".
pub fn test_app() -> App {
    App::new(Arc::new(RecordingBackend::default()), test_catalog())
}

/// Same as [`test_app`] but signed in as user 1 ("tester").
pub fn test_app_signed_in() -> App {
    let mut app = test_app();
    app.current_user = Some(User {
        id: 1,
        name: "tester".into(),
    });
    app
}

/// A message fixture with fixed body/timestamp.
pub fn test_message(id: u64, sender: u64, tags: &[&str]) -> Message {
    Message {
        id,
        body: format!("message {id}"),
        sender,
        created_at: 1_700_000_000,
        reply_to: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}
