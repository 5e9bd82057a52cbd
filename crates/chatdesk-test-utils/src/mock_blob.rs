// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory object store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use chatdesk_core::types::SignedUpload;
use chatdesk_core::{AdapterType, BlobStore, ChatdeskError, HealthStatus, PluginAdapter};

/// Host used in the URLs handed out by [`MockBlobStore`].
pub const MOCK_BLOB_HOST: &str = "https://blob.test";

/// A stored object: bytes and content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

pub struct MockBlobStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    fail_upload: AtomicBool,
    fail_sign: AtomicBool,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fail_upload: AtomicBool::new(false),
            fail_sign: AtomicBool::new(false),
        }
    }

    pub fn set_fail_upload(&self, fail: bool) {
        self.fail_upload.store(fail, Ordering::SeqCst);
    }

    /// Make `signed_url` fail while uploads keep working.
    pub fn set_fail_sign(&self, fail: bool) {
        self.fail_sign.store(fail, Ordering::SeqCst);
    }

    pub async fn object(&self, path: &str) -> Option<StoredObject> {
        self.objects.lock().await.get(path).cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }
}

impl Default for MockBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockBlobStore {
    fn name(&self) -> &str {
        "mock-blob"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Blob
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ChatdeskError> {
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MockBlobStore {
    async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), ChatdeskError> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(ChatdeskError::blob("mock upload failure"));
        }
        let mut objects = self.objects.lock().await;
        if !upsert && objects.contains_key(path) {
            return Err(ChatdeskError::blob(format!("{path} already exists")));
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String, ChatdeskError> {
        if self.fail_sign.load(Ordering::SeqCst) {
            return Err(ChatdeskError::blob("mock signing failure"));
        }
        if !self.objects.lock().await.contains_key(path) {
            return Err(ChatdeskError::blob(format!("{path} not found")));
        }
        Ok(format!(
            "{MOCK_BLOB_HOST}/{path}?expires={}",
            expires_in.as_secs()
        ))
    }

    async fn create_signed_upload(&self, path: &str) -> Result<SignedUpload, ChatdeskError> {
        Ok(SignedUpload {
            upload_url: format!("{MOCK_BLOB_HOST}/upload/{path}?token=mock-token"),
            token: "mock-token".into(),
            path: path.to_string(),
        })
    }
}
