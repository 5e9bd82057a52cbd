// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation client for the chatdesk operator UI.
//!
//! [`ChatClient`] keeps paged per-counterpart threads, a bounded recent feed
//! across counterparts, and a profile cache in sync with the gateway.
//! Optimistic sends and polled messages are reconciled by message id.

pub mod api;
pub mod client;
pub mod poller;
pub mod state;

pub use api::{Draft, HttpMessageApi, MessageApi};
pub use client::ChatClient;
pub use poller::Poller;
pub use state::{ChatState, Conversation, ConversationSummary};
