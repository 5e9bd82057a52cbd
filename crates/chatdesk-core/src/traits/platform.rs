// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging platform trait (LINE Messaging API and test doubles).

use async_trait::async_trait;

use crate::error::ChatdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{BotInfo, PushMessage, UserProfile};

/// Outbound side of the messaging platform: push, media content, profiles.
#[async_trait]
pub trait MessagingPlatform: PluginAdapter {
    /// Pushes a message to a counterpart.
    async fn push(&self, to: &str, message: &PushMessage) -> Result<(), ChatdeskError>;

    /// Downloads the binary content attached to a platform message.
    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>, ChatdeskError>;

    /// Looks up a counterpart's profile.
    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, ChatdeskError>;

    /// Looks up the official account's own info.
    async fn get_bot_info(&self) -> Result<BotInfo, ChatdeskError>;
}
