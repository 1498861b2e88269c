//! # Dispatch Boundary
//!
//! Everything that mutates a message goes through here. The UI never talks
//! to the network directly: it hands a [`MessageAction`] to a
//! [`MessageBackend`] and gets back a single resolved result. Reads
//! (message list, user directory) and login go through the same trait so
//! tests can substitute the whole backend with a fake.
//!
//! The trait object is injected as `Arc<dyn MessageBackend>` at startup.
//! Calls are awaited once; there is no timeout, cancellation, or retry at
//! this layer — a hung call leaves the caller's in-flight flag set, which is
//! a documented limitation of the UI's coarse send guard.

pub mod http;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::message::{Message, User};

pub use http::HostedBackend;

/// A mutation request submitted to the hosted backend.
///
/// Serializes as the tagged shape the backend expects:
/// `{"type":"MessageCreate","sender":1,"body":"...","tags":["bugs"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum MessageAction {
    MessageCreate {
        sender: u64,
        body: String,
        tags: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reply_to: Option<u64>,
    },
    MessageEdit {
        message_id: u64,
        body: String,
    },
    MessageDelete {
        message_id: u64,
    },
}

impl MessageAction {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            MessageAction::MessageCreate { .. } => "MessageCreate",
            MessageAction::MessageEdit { .. } => "MessageEdit",
            MessageAction::MessageDelete { .. } => "MessageDelete",
        }
    }
}

/// Errors that can come back from the backend boundary.
/// Variants carry enough info to tell transport from server trouble.
#[derive(Debug)]
pub enum BackendError {
    /// Backend misconfigured (bad base URL). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Backend returned a non-success response.
    Api { status: u16, message: String },
    /// Failed to decode the backend's response body.
    Parse(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "config error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            BackendError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

#[async_trait]
pub trait MessageBackend: Send + Sync {
    /// Returns the name of the backend (for logs and the title bar).
    fn name(&self) -> &str;

    /// Submit a mutation. Resolves once with success or an error value;
    /// the caller decides what (if anything) to do with a failure.
    async fn dispatch(&self, action: MessageAction) -> Result<(), BackendError>;

    /// Fetch the full message list.
    async fn fetch_messages(&self) -> Result<Vec<Message>, BackendError>;

    /// Fetch the user directory keyed by user id.
    async fn fetch_users(&self) -> Result<HashMap<u64, User>, BackendError>;

    /// Authenticate (or register) by name, returning the signed-in user.
    async fn login(&self, name: &str) -> Result<User, BackendError>;
}
