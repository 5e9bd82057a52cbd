// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging platform for deterministic testing.
//!
//! `MockPlatform` implements `MessagingPlatform` with captured pushes,
//! canned content and profiles, and per-id failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use chatdesk_core::types::{BotInfo, PushMessage, UserProfile};
use chatdesk_core::{AdapterType, ChatdeskError, HealthStatus, MessagingPlatform, PluginAdapter};

/// Bytes returned for content that was not registered explicitly.
pub const DEFAULT_CONTENT: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

/// A messaging platform double.
pub struct MockPlatform {
    pushes: Mutex<Vec<(String, PushMessage)>>,
    content: Mutex<HashMap<String, Vec<u8>>>,
    failing_content: Mutex<HashSet<String>>,
    profiles: Mutex<HashMap<String, UserProfile>>,
    fail_push: AtomicBool,
    profile_calls: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            pushes: Mutex::new(Vec::new()),
            content: Mutex::new(HashMap::new()),
            failing_content: Mutex::new(HashSet::new()),
            profiles: Mutex::new(HashMap::new()),
            fail_push: AtomicBool::new(false),
            profile_calls: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent `push` fail with a platform error.
    pub fn set_fail_push(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    /// Make `fetch_content` fail for this message id.
    pub async fn fail_content_for(&self, message_id: &str) {
        self.failing_content
            .lock()
            .await
            .insert(message_id.to_string());
    }

    pub async fn set_content(&self, message_id: &str, data: Vec<u8>) {
        self.content.lock().await.insert(message_id.to_string(), data);
    }

    pub async fn add_profile(&self, profile: UserProfile) {
        self.profiles
            .lock()
            .await
            .insert(profile.user_id.clone(), profile);
    }

    /// Every `(to, message)` pair passed to `push`, in order.
    pub async fn pushes(&self) -> Vec<(String, PushMessage)> {
        self.pushes.lock().await.clone()
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockPlatform {
    fn name(&self) -> &str {
        "mock-platform"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Platform
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ChatdeskError> {
        Ok(())
    }
}

#[async_trait]
impl MessagingPlatform for MockPlatform {
    async fn push(&self, to: &str, message: &PushMessage) -> Result<(), ChatdeskError> {
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(ChatdeskError::Platform {
                message: "mock push failure".into(),
                status: Some(500),
                source: None,
            });
        }
        self.pushes
            .lock()
            .await
            .push((to.to_string(), message.clone()));
        Ok(())
    }

    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>, ChatdeskError> {
        if self.failing_content.lock().await.contains(message_id) {
            return Err(ChatdeskError::platform(format!(
                "mock content failure for {message_id}"
            )));
        }
        Ok(self
            .content
            .lock()
            .await
            .get(message_id)
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONTENT.to_vec()))
    }

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, ChatdeskError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .lock()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| ChatdeskError::Platform {
                message: format!("profile {user_id} not found"),
                status: Some(404),
                source: None,
            })
    }

    async fn get_bot_info(&self) -> Result<BotInfo, ChatdeskError> {
        Ok(BotInfo {
            user_id: "Ubot".into(),
            basic_id: "@mockbot".into(),
            display_name: "Mock Bot".into(),
            picture_url: None,
            chat_mode: Some("chat".into()),
            mark_as_read_mode: Some("manual".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_pushes_in_order() {
        let platform = MockPlatform::new();
        platform.push("U1", &PushMessage::Text("a".into())).await.unwrap();
        platform.push("U2", &PushMessage::Text("b".into())).await.unwrap();
        let pushes = platform.pushes().await;
        assert_eq!(pushes.len(), 2);
        assert_eq!(pushes[1].0, "U2");
    }

    #[tokio::test]
    async fn injected_failures() {
        let platform = MockPlatform::new();
        platform.set_fail_push(true);
        assert!(platform.push("U1", &PushMessage::Text("a".into())).await.is_err());

        platform.fail_content_for("m2").await;
        assert!(platform.fetch_content("m1").await.is_ok());
        assert!(platform.fetch_content("m2").await.is_err());

        let err = platform.get_profile("nobody").await.unwrap_err();
        assert_eq!(err.platform_status(), Some(404));
        assert_eq!(platform.profile_calls(), 1);
    }
}
