// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage trait for mirrored media and operator uploads.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ChatdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SignedUpload;

/// Bucket-scoped object storage.
#[async_trait]
pub trait BlobStore: PluginAdapter {
    /// Uploads `data` under `path`. With `upsert`, an existing object is replaced.
    async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), ChatdeskError>;

    /// Creates a read URL for `path` valid for `expires_in`.
    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String, ChatdeskError>;

    /// Creates a write URL the client can upload `path` to directly.
    async fn create_signed_upload(&self, path: &str) -> Result<SignedUpload, ChatdeskError>;
}
