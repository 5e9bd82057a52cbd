// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for chatdesk's external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod blob;
pub mod platform;
pub mod store;

pub use adapter::PluginAdapter;
pub use blob::BlobStore;
pub use platform::MessagingPlatform;
pub use store::MessageStore;
