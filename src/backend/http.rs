//! Hosted backend client.
//!
//! Speaks the hosted chat service's small REST surface:
//! - `POST /actions`  — tagged [`MessageAction`] JSON, empty 2xx on success
//! - `GET  /messages` — full message list
//! - `GET  /users`    — user directory
//! - `POST /login`    — `{"name": "..."}` → the signed-in user
//!
//! Every mutation carries an `X-Request-Id` UUID so a dispatch can be
//! correlated with server logs.

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;
use uuid::Uuid;

use super::{BackendError, MessageAction, MessageBackend};
use crate::core::message::{Message, User};

pub struct HostedBackend {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    name: &'a str,
}

impl HostedBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a completed response to success or `BackendError::Api`,
    /// preserving the body as the error message where possible.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl MessageBackend for HostedBackend {
    fn name(&self) -> &str {
        "hosted"
    }

    async fn dispatch(&self, action: MessageAction) -> Result<(), BackendError> {
        let request_id = Uuid::new_v4();
        debug!("Dispatching {} (request_id={request_id})", action.kind());

        let response = self
            .client
            .post(self.url("/actions"))
            .header("X-Request-Id", request_id.to_string())
            .json(&action)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Self::check_status(response).await?;
        debug!("{} acknowledged (request_id={request_id})", action.kind());
        Ok(())
    }

    async fn fetch_messages(&self) -> Result<Vec<Message>, BackendError> {
        let response = self
            .client
            .get(self.url("/messages"))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let messages: Vec<Message> = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        debug!("Fetched {} messages", messages.len());
        Ok(messages)
    }

    async fn fetch_users(&self) -> Result<HashMap<u64, User>, BackendError> {
        let response = self
            .client
            .get(self.url("/users"))
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let users: Vec<User> = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        debug!("Fetched {} users", users.len());
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    async fn login(&self, name: &str) -> Result<User, BackendError> {
        let response = self
            .client
            .post(self.url("/login"))
            .json(&LoginRequest { name })
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let user: User = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| {
                warn!("Login response for '{name}' was not a user object");
                BackendError::Parse(e.to_string())
            })?;
        Ok(user)
    }
}
