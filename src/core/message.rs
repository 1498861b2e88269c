//! # Message Model
//!
//! Messages are owned by the hosted backend; this crate only reads them and
//! requests mutations through the dispatch boundary. What lives here is the
//! read-side shape plus the filtered views the UI renders from: the
//! channel-scoped top-level list and the per-message reply list.
//!
//! Replies form a tree keyed by `reply_to`. The data is externally owned, so
//! a hostile or buggy backend could hand us a reply cycle; every recursive
//! walk is bounded by [`MAX_REPLY_DEPTH`].

use serde::{Deserialize, Serialize};

use crate::core::channel::ALL_CHANNEL;

/// How deep the reply tree is followed before rendering stops. Anything
/// below this depth is silently cut off rather than recursed into.
pub const MAX_REPLY_DEPTH: usize = 8;

/// A chat message as the backend serves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: u64,
    /// Markdown source. Sanitized at render time, never trusted.
    pub body: String,
    pub sender: u64,
    /// Unix seconds.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<u64>,
    /// Channel names this message belongs to. Order-insignificant; the
    /// backend guarantees at least one entry.
    pub tags: Vec<String>,
}

impl Message {
    /// Whether this message shows up when viewing `channel`.
    /// "all" is the unscoped view and matches everything.
    pub fn visible_in(&self, channel: &str) -> bool {
        channel == ALL_CHANNEL || self.tags.iter().any(|t| t == channel)
    }
}

/// A directory entry from the user provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

/// Top-level messages for a channel view: visible in the channel and not a
/// reply to anything.
pub fn thread_roots<'a>(messages: &'a [Message], channel: &str) -> Vec<&'a Message> {
    messages
        .iter()
        .filter(|m| m.reply_to.is_none() && m.visible_in(channel))
        .collect()
}

/// Direct replies to `parent` within a channel view, in list order.
pub fn replies_to<'a>(messages: &'a [Message], channel: &str, parent: u64) -> Vec<&'a Message> {
    messages
        .iter()
        .filter(|m| m.reply_to == Some(parent) && m.visible_in(channel))
        .collect()
}

/// Flatten a channel view into render order: each root followed by its
/// replies depth-first, each entry paired with its nesting depth. Recursion
/// stops at [`MAX_REPLY_DEPTH`] so adversarial reply graphs can't hang the
/// renderer.
pub fn flatten_thread<'a>(messages: &'a [Message], channel: &str) -> Vec<(&'a Message, usize)> {
    let mut out = Vec::new();
    for root in thread_roots(messages, channel) {
        push_subtree(messages, channel, root, 0, &mut out);
    }
    out
}

fn push_subtree<'a>(
    messages: &'a [Message],
    channel: &str,
    node: &'a Message,
    depth: usize,
    out: &mut Vec<(&'a Message, usize)>,
) {
    out.push((node, depth));
    if depth + 1 >= MAX_REPLY_DEPTH {
        return;
    }
    for reply in replies_to(messages, channel, node.id) {
        push_subtree(messages, channel, reply, depth + 1, out);
    }
}
