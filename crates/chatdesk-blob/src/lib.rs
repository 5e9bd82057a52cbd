// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage adapter for chatdesk.
//!
//! Talks to a Supabase Storage compatible REST API: object upload with
//! optional upsert, signed read URLs, and signed upload URLs for direct
//! browser uploads.

pub mod client;

pub use client::SupabaseBlobStore;
