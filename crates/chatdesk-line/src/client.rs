// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the LINE Messaging API.
//!
//! Provides [`LineClient`], which handles bearer authentication, content
//! downloads from the data API host, and a single retry on transient errors.

use std::time::Duration;

use async_trait::async_trait;
use chatdesk_config::model::LineConfig;
use chatdesk_core::types::{BotInfo, PushMessage, UserProfile};
use chatdesk_core::{AdapterType, ChatdeskError, HealthStatus, MessagingPlatform, PluginAdapter};
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, OutgoingMessage, PushRequest};

/// Upper bound on downloaded content when none is configured.
const DEFAULT_MAX_CONTENT_BYTES: usize = 50 * 1024 * 1024;

/// LINE Messaging API client.
#[derive(Debug, Clone)]
pub struct LineClient {
    client: reqwest::Client,
    api_base_url: String,
    data_api_base_url: String,
    has_token: bool,
    timeout: Duration,
    max_content_bytes: usize,
    max_retries: u32,
    retry_delay: Duration,
}

impl LineClient {
    /// Build a client from the `[line]` config section.
    pub fn new(config: &LineConfig) -> Result<Self, ChatdeskError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.channel_access_token))
            .map_err(|e| {
                ChatdeskError::Config(format!("invalid channel access token header value: {e}"))
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ChatdeskError::Platform {
                message: format!("failed to build HTTP client: {e}"),
                status: None,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            data_api_base_url: config.data_api_base_url.trim_end_matches('/').to_string(),
            has_token: !config.channel_access_token.is_empty(),
            timeout,
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Limit the size of downloaded message content.
    pub fn with_max_content_bytes(mut self, bytes: usize) -> Self {
        self.max_content_bytes = bytes;
        self
    }

    /// Overrides the delay before retrying a transient failure.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Send a request, retrying once on 429/5xx-overload responses.
    ///
    /// `build` is called per attempt because a `RequestBuilder` is consumed on send.
    async fn execute(
        &self,
        what: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response, ChatdeskError> {
        let mut attempt = 0;
        loop {
            let response = build().send().await.map_err(|e| {
                if e.is_timeout() {
                    ChatdeskError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    ChatdeskError::Platform {
                        message: format!("{what}: HTTP request failed: {e}"),
                        status: None,
                        source: Some(Box::new(e)),
                    }
                }
            })?;

            let status = response.status();
            debug!(%status, attempt, what, "LINE API response");
            if status.is_success() {
                return Ok(response);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(%status, what, "transient LINE API error, will retry");
                attempt += 1;
                tokio::time::sleep(self.retry_delay).await;
                continue;
            }

            return Err(api_error(what, response).await);
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, what: &str, url: &str) -> Result<T, ChatdeskError> {
        let response = self.execute(what, || self.client.get(url)).await?;
        response.json::<T>().await.map_err(|e| ChatdeskError::Platform {
            message: format!("{what}: failed to parse response: {e}"),
            status: None,
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl PluginAdapter for LineClient {
    fn name(&self) -> &str {
        "line"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Platform
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatdeskError> {
        if self.has_token {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("no channel access token configured".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), ChatdeskError> {
        Ok(())
    }
}

#[async_trait]
impl MessagingPlatform for LineClient {
    async fn push(&self, to: &str, message: &PushMessage) -> Result<(), ChatdeskError> {
        let url = format!("{}/v2/bot/message/push", self.api_base_url);
        let body = PushRequest {
            to,
            messages: vec![OutgoingMessage::from(message)],
        };
        // Same retry key on every attempt so a retried push is delivered once.
        let retry_key = uuid::Uuid::new_v4().to_string();
        self.execute("push", || {
            self.client
                .post(&url)
                .header("X-Line-Retry-Key", &retry_key)
                .json(&body)
        })
        .await?;
        debug!(to, "pushed message");
        Ok(())
    }

    async fn fetch_content(&self, message_id: &str) -> Result<Vec<u8>, ChatdeskError> {
        let url = format!(
            "{}/v2/bot/message/{message_id}/content",
            self.data_api_base_url
        );
        let response = self.execute("content", || self.client.get(&url)).await?;

        if let Some(len) = response.content_length()
            && len as usize > self.max_content_bytes
        {
            return Err(too_large(message_id, len as usize, self.max_content_bytes));
        }

        let mut data = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(|e| ChatdeskError::Platform {
                message: format!("content: failed reading body of {message_id}: {e}"),
                status: None,
                source: Some(Box::new(e)),
            })?;
            if data.len() + chunk.len() > self.max_content_bytes {
                return Err(too_large(
                    message_id,
                    data.len() + chunk.len(),
                    self.max_content_bytes,
                ));
            }
            data.extend_from_slice(&chunk);
        }
        debug!(message_id, bytes = data.len(), "downloaded message content");
        Ok(data)
    }

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, ChatdeskError> {
        let url = format!("{}/v2/bot/profile/{user_id}", self.api_base_url);
        self.get_json("profile", &url).await
    }

    async fn get_bot_info(&self) -> Result<BotInfo, ChatdeskError> {
        let url = format!("{}/v2/bot/info", self.api_base_url);
        self.get_json("bot info", &url).await
    }
}

fn too_large(message_id: &str, size: usize, limit: usize) -> ChatdeskError {
    ChatdeskError::platform(format!(
        "content of {message_id} exceeds {limit} bytes (got at least {size})"
    ))
}

async fn api_error(what: &str, response: Response) -> ChatdeskError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(api_err) => format!("{what}: LINE API error ({status}): {api_err}"),
        Err(_) => format!("{what}: LINE API returned {status}: {body}"),
    };
    ChatdeskError::Platform {
        message,
        status: Some(status.as_u16()),
        source: None,
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}
