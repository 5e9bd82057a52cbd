// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Copies inbound media from the messaging platform into object storage.
//!
//! Platform content URLs require the channel token and expire, so images are
//! re-hosted and referenced by a long-lived signed URL instead.

use std::time::Duration;

use chatdesk_config::model::BlobConfig;
use chatdesk_core::{BlobStore, ChatdeskError, MessagingPlatform};
use tracing::debug;

/// Limits applied while relaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayOptions {
    pub expires_in: Duration,
    pub max_file_size: usize,
}

impl From<&BlobConfig> for RelayOptions {
    fn from(config: &BlobConfig) -> Self {
        Self {
            expires_in: Duration::from_secs(config.expires_in_secs),
            max_file_size: config.max_file_size,
        }
    }
}

/// Object name used for the content of platform message `message_id`.
pub fn object_name(message_id: &str) -> String {
    format!("{message_id}.jpg")
}

/// Fetch the content of `message_id`, store it, and return a durable URL.
///
/// Re-relaying the same message overwrites the same object.
pub async fn relay(
    platform: &dyn MessagingPlatform,
    blob: &dyn BlobStore,
    message_id: &str,
    options: RelayOptions,
) -> Result<String, ChatdeskError> {
    let data = platform.fetch_content(message_id).await?;
    if data.len() > options.max_file_size {
        return Err(ChatdeskError::blob(format!(
            "content of {message_id} is {} bytes, limit is {}",
            data.len(),
            options.max_file_size
        )));
    }

    let name = object_name(message_id);
    let size = data.len();
    blob.upload(&name, data, "image/jpeg", true).await?;
    let url = blob.signed_url(&name, options.expires_in).await?;
    debug!(message_id, object = %name, size, "relayed media");
    Ok(url)
}
