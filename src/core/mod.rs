//! # Core Application Logic
//!
//! This module contains Chatter's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • Channel catalog      │
//!                    │  • Message views        │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │  Backend   │      │   Tests    │
//!     │  Adapter   │      │ (dispatch) │      │ (fake      │
//!     │ (ratatui)  │      │            │      │  backend)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct — all application state in one place
//! - [`action`]: The `Action` enum and `update()` reducer
//! - [`channel`]: Channel catalog and tag inference
//! - [`message`]: Message/user models and thread views
//! - [`config`]: Layered configuration and the channel catalog source

pub mod action;
pub mod channel;
pub mod config;
pub mod message;
pub mod state;
