// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message store trait for persistence backends.

use async_trait::async_trait;

use crate::error::ChatdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Insertion, Message, Page, PageQuery};

/// Durable, append-only table of messages keyed by id.
#[async_trait]
pub trait MessageStore: PluginAdapter {
    /// Opens the backend and applies migrations.
    async fn initialize(&self) -> Result<(), ChatdeskError>;

    /// Flushes pending writes and releases the backend.
    async fn close(&self) -> Result<(), ChatdeskError>;

    /// Writes `message` unless a row with the same id exists.
    ///
    /// An existing row is never overwritten; it is returned as
    /// [`Insertion::Duplicate`]. Must hold under concurrent redelivery of the
    /// same id.
    async fn insert_if_absent(&self, message: &Message) -> Result<Insertion, ChatdeskError>;

    /// Reads one page of messages, newest `limit` before the cursor, returned
    /// in ascending `(timestamp, id)` order.
    async fn query_page(&self, query: &PageQuery) -> Result<Page, ChatdeskError>;
}
