// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for chatdesk.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level chatdesk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatdeskConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LINE Messaging API credentials and endpoints.
    #[serde(default)]
    pub line: LineConfig,

    /// Message store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Object storage for mirrored media and operator uploads.
    #[serde(default)]
    pub blob: BlobConfig,

    /// Read API page sizes.
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Conversation client settings.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name shown by operator front-ends.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "LINE OA Admin".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on operator routes. `None` leaves them open.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Maximum accepted request body in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("body_limit", &self.body_limit)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_token: None,
            body_limit: default_body_limit(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

/// LINE Messaging API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    /// Long-lived channel access token used for API calls.
    #[serde(default)]
    pub channel_access_token: String,

    /// Channel secret used to verify webhook signatures.
    #[serde(default)]
    pub channel_secret: String,

    /// Base URL of the messaging API.
    #[serde(default = "default_line_api_base_url")]
    pub api_base_url: String,

    /// Base URL of the content (blob) API.
    #[serde(default = "default_line_data_api_base_url")]
    pub data_api_base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_line_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field("channel_access_token", &"[redacted]")
            .field("channel_secret", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .field("data_api_base_url", &self.data_api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: String::new(),
            channel_secret: String::new(),
            api_base_url: default_line_api_base_url(),
            data_api_base_url: default_line_data_api_base_url(),
            timeout_secs: default_line_timeout_secs(),
        }
    }
}

fn default_line_api_base_url() -> String {
    "https://api.line.me".to_string()
}

fn default_line_data_api_base_url() -> String {
    "https://api-data.line.me".to_string()
}

fn default_line_timeout_secs() -> u64 {
    30
}

/// Message store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("chatdesk").join("chatdesk.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("chatdesk.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Object storage configuration (Supabase Storage compatible REST API).
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BlobConfig {
    /// Base URL of the storage project, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: String,

    /// Service key with write access to the bucket.
    #[serde(default)]
    pub service_key: String,

    /// Bucket holding chat media.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Lifetime of signed read URLs, in seconds.
    #[serde(default = "default_expires_in_secs")]
    pub expires_in_secs: u64,

    /// Largest attachment mirrored from the platform, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl std::fmt::Debug for BlobConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobConfig")
            .field("url", &self.url)
            .field("service_key", &"[redacted]")
            .field("bucket", &self.bucket)
            .field("expires_in_secs", &self.expires_in_secs)
            .field("max_file_size", &self.max_file_size)
            .finish()
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            bucket: default_bucket(),
            expires_in_secs: default_expires_in_secs(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_bucket() -> String {
    "chat-images".to_string()
}

fn default_expires_in_secs() -> u64 {
    31_536_000
}

fn default_max_file_size() -> usize {
    50 * 1024 * 1024
}

/// Read API pagination configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size when a request does not specify `limit`.
    #[serde(default = "default_messages_per_page")]
    pub messages_per_page: u32,

    /// Upper bound applied to requested `limit` values.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            messages_per_page: default_messages_per_page(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_messages_per_page() -> u32 {
    50
}

fn default_max_limit() -> u32 {
    500
}

/// Conversation client configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Gateway base URL the client talks to.
    #[serde(default = "default_client_base_url")]
    pub base_url: String,

    /// Bearer token sent with client requests.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Interval between recent-message polls, in milliseconds.
    #[serde(default = "default_polling_interval_ms")]
    pub polling_interval_ms: u64,

    /// Number of cross-counterpart messages fetched per poll.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,

    /// Maximum entries kept in the recent list.
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,

    /// Page size for per-counterpart loads.
    #[serde(default = "default_messages_per_page")]
    pub messages_per_page: u32,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("polling_interval_ms", &self.polling_interval_ms)
            .field("recent_limit", &self.recent_limit)
            .field("recent_capacity", &self.recent_capacity)
            .field("messages_per_page", &self.messages_per_page)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_client_base_url(),
            api_token: None,
            polling_interval_ms: default_polling_interval_ms(),
            recent_limit: default_recent_limit(),
            recent_capacity: default_recent_capacity(),
            messages_per_page: default_messages_per_page(),
        }
    }
}

fn default_client_base_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_polling_interval_ms() -> u64 {
    3000
}

fn default_recent_limit() -> u32 {
    100
}

fn default_recent_capacity() -> usize {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ChatdeskConfig::default();
        assert_eq!(config.app.name, "LINE OA Admin");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.blob.bucket, "chat-images");
        assert_eq!(config.blob.expires_in_secs, 31_536_000);
        assert_eq!(config.blob.max_file_size, 50 * 1024 * 1024);
        assert_eq!(config.pagination.messages_per_page, 50);
        assert_eq!(config.client.polling_interval_ms, 3000);
        assert_eq!(config.client.recent_capacity, 200);
        assert!(config.storage.database_path.ends_with("chatdesk.db"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = ChatdeskConfig::default();
        config.line.channel_secret = "very-secret".into();
        config.line.channel_access_token = "token-123".into();
        config.blob.service_key = "service-key".into();
        config.server.api_token = Some("api-token".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("token-123"));
        assert!(!debug.contains("service-key"));
        assert!(!debug.contains("api-token"));
    }
}
