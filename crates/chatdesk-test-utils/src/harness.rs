// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring a temp SQLite store to the mock adapters.

use std::sync::Arc;

use chatdesk_config::ChatdeskConfig;
use chatdesk_config::model::StorageConfig;
use chatdesk_core::{ChatdeskError, Direction, Message, MessageBody, MessageStore};
use chatdesk_storage::SqliteStorage;
use tempfile::TempDir;

use crate::mock_blob::MockBlobStore;
use crate::mock_platform::MockPlatform;

/// Channel secret used by harness-built configs.
pub const TEST_CHANNEL_SECRET: &str = "test-channel-secret";

pub struct TestHarnessBuilder {
    api_token: Option<String>,
    messages_per_page: Option<u32>,
    max_file_size: Option<usize>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            api_token: None,
            messages_per_page: None,
            max_file_size: None,
        }
    }

    /// Require this bearer token on operator routes.
    pub fn with_api_token(mut self, token: &str) -> Self {
        self.api_token = Some(token.to_string());
        self
    }

    pub fn with_messages_per_page(mut self, n: u32) -> Self {
        self.messages_per_page = Some(n);
        self
    }

    pub fn with_max_file_size(mut self, bytes: usize) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    pub async fn build(self) -> Result<TestHarness, ChatdeskError> {
        let temp_dir = TempDir::new().map_err(|e| ChatdeskError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db").to_string_lossy().to_string();

        let mut config = ChatdeskConfig::default();
        config.storage = StorageConfig {
            database_path: db_path,
            wal_mode: true,
        };
        config.line.channel_secret = TEST_CHANNEL_SECRET.to_string();
        config.line.channel_access_token = "test-access-token".to_string();
        config.server.api_token = self.api_token;
        if let Some(n) = self.messages_per_page {
            config.pagination.messages_per_page = n;
        }
        if let Some(bytes) = self.max_file_size {
            config.blob.max_file_size = bytes;
        }

        let store = SqliteStorage::new(config.storage.clone());
        store.initialize().await?;

        Ok(TestHarness {
            config,
            store: Arc::new(store),
            platform: Arc::new(MockPlatform::new()),
            blob: Arc::new(MockBlobStore::new()),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete backend environment for tests.
///
/// The temp directory lives as long as the harness.
pub struct TestHarness {
    pub config: ChatdeskConfig,
    pub store: Arc<SqliteStorage>,
    pub platform: Arc<MockPlatform>,
    pub blob: Arc<MockBlobStore>,
    _temp_dir: TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub async fn new() -> Result<Self, ChatdeskError> {
        Self::builder().build().await
    }

    /// Store an incoming text message directly, bypassing the webhook.
    pub async fn seed_text(
        &self,
        id: &str,
        counterpart_id: &str,
        timestamp: i64,
        text: &str,
    ) -> Result<Message, ChatdeskError> {
        let message = Message {
            id: id.to_string(),
            counterpart_id: counterpart_id.to_string(),
            direction: Direction::Incoming,
            body: MessageBody::text(text),
            timestamp,
            webhook_event_id: None,
        };
        self.store.insert_if_absent(&message).await?;
        Ok(message)
    }

    pub async fn stored_count(&self) -> Result<u64, ChatdeskError> {
        self.store.count(None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdesk_core::PageQuery;

    #[tokio::test]
    async fn harness_provides_working_store() {
        let harness = TestHarness::new().await.unwrap();
        harness.seed_text("m1", "U1", 10, "hello").await.unwrap();
        harness.seed_text("m1", "U1", 10, "hello").await.unwrap();
        assert_eq!(harness.stored_count().await.unwrap(), 1);

        let page = harness
            .store
            .query_page(&PageQuery::for_counterpart("U1", 10))
            .await
            .unwrap();
        assert_eq!(page.messages.len(), 1);
        assert_eq!(harness.config.line.channel_secret, TEST_CHANNEL_SECRET);
    }
}
