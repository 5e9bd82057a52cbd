// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite message store for chatdesk.
//!
//! WAL-mode SQLite with embedded refinery migrations. All statements run on
//! the single `tokio-rusqlite` background thread, which serializes writes and
//! makes insert-if-absent atomic without extra locking.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
