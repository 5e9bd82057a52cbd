// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LINE Messaging API adapter for chatdesk.
//!
//! [`LineClient`] implements [`MessagingPlatform`](chatdesk_core::MessagingPlatform)
//! over the REST API. [`signature`] verifies `x-line-signature` on webhook
//! deliveries and [`webhook`] holds the inbound event shapes.

pub mod client;
pub mod signature;
pub mod types;
pub mod webhook;

pub use client::LineClient;
pub use webhook::{EventMessage, WebhookEvent, parse_events};
