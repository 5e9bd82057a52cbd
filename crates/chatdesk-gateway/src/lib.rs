// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for chatdesk.
//!
//! Serves the LINE webhook (signature-verified ingestion with media relay),
//! the operator API (read, send, profiles, uploads) and an unauthenticated
//! health endpoint. Adapters are injected through [`GatewayState`] so the
//! same router runs against LINE and object storage in production and
//! against mocks in tests.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod outbound;
pub mod relay;
pub mod server;
pub mod webhook;

pub use error::ApiError;
pub use server::{GatewayState, build_router, start_server};
pub use webhook::IngestReport;
