// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.
//!
//! All failures are collected; validation never stops at the first one.

use crate::diagnostic::ConfigError;
use crate::model::ChatdeskConfig;

/// Validate a deserialized configuration.
pub fn validate_config(config: &ChatdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::invalid("server.host", "must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::invalid(
            "server.host",
            format!("`{host}` is not a valid IP address or hostname"),
        ));
    }

    if config.server.port == 0 {
        errors.push(ConfigError::invalid("server.port", "must be non-zero"));
    }

    if let Some(token) = &config.server.api_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::invalid(
            "server.api_token",
            "must not be blank when set; remove the key to disable auth",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "storage.database_path",
            "must not be empty",
        ));
    }

    for (field, url) in [
        ("line.api_base_url", &config.line.api_base_url),
        ("line.data_api_base_url", &config.line.data_api_base_url),
        ("client.base_url", &config.client.base_url),
    ] {
        if !is_http_url(url) {
            errors.push(ConfigError::invalid(
                field,
                format!("`{url}` must start with http:// or https://"),
            ));
        }
    }

    if !config.blob.url.is_empty() && !is_http_url(&config.blob.url) {
        errors.push(ConfigError::invalid(
            "blob.url",
            format!("`{}` must start with http:// or https://", config.blob.url),
        ));
    }

    if config.blob.bucket.trim().is_empty() {
        errors.push(ConfigError::invalid("blob.bucket", "must not be empty"));
    }

    if config.blob.max_file_size == 0 {
        errors.push(ConfigError::invalid("blob.max_file_size", "must be positive"));
    }

    if config.line.timeout_secs == 0 {
        errors.push(ConfigError::invalid("line.timeout_secs", "must be positive"));
    }

    let pagination = &config.pagination;
    if pagination.messages_per_page == 0 {
        errors.push(ConfigError::invalid(
            "pagination.messages_per_page",
            "must be positive",
        ));
    }
    if pagination.max_limit == 0 {
        errors.push(ConfigError::invalid("pagination.max_limit", "must be positive"));
    } else if pagination.messages_per_page > pagination.max_limit {
        errors.push(ConfigError::invalid(
            "pagination.messages_per_page",
            format!(
                "{} exceeds pagination.max_limit ({})",
                pagination.messages_per_page, pagination.max_limit
            ),
        ));
    }

    let client = &config.client;
    if client.polling_interval_ms == 0 {
        errors.push(ConfigError::invalid(
            "client.polling_interval_ms",
            "must be positive",
        ));
    }
    if client.recent_limit == 0 {
        errors.push(ConfigError::invalid("client.recent_limit", "must be positive"));
    }
    if client.messages_per_page == 0 {
        errors.push(ConfigError::invalid(
            "client.messages_per_page",
            "must be positive",
        ));
    }
    if client.recent_capacity < client.recent_limit as usize {
        errors.push(ConfigError::invalid(
            "client.recent_capacity",
            format!(
                "{} is smaller than client.recent_limit ({})",
                client.recent_capacity, client.recent_limit
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(errors: &[ConfigError]) -> Vec<String> {
        errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::Validation { field, .. } => Some(field.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ChatdeskConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_failure() {
        let mut config = ChatdeskConfig::default();
        config.server.port = 0;
        config.storage.database_path = "  ".into();
        config.pagination.messages_per_page = 0;
        config.client.polling_interval_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields = fields(&errors);
        assert_eq!(errors.len(), 4, "{fields:?}");
        assert!(fields.contains(&"server.port".to_string()));
        assert!(fields.contains(&"storage.database_path".to_string()));
        assert!(fields.contains(&"pagination.messages_per_page".to_string()));
        assert!(fields.contains(&"client.polling_interval_ms".to_string()));
    }

    #[test]
    fn page_size_cannot_exceed_max_limit() {
        let mut config = ChatdeskConfig::default();
        config.pagination.messages_per_page = 600;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(fields(&errors), vec!["pagination.messages_per_page"]);
    }

    #[test]
    fn rejects_bad_host_and_urls() {
        let mut config = ChatdeskConfig::default();
        config.server.host = "bad host!".into();
        config.line.api_base_url = "api.line.me".into();
        config.blob.url = "ftp://storage".into();
        let fields = fields(&validate_config(&config).unwrap_err());
        assert_eq!(
            fields,
            vec!["server.host", "line.api_base_url", "blob.url"]
        );
    }

    #[test]
    fn blank_api_token_is_rejected() {
        let mut config = ChatdeskConfig::default();
        config.server.api_token = Some(String::new());
        let fields = fields(&validate_config(&config).unwrap_err());
        assert_eq!(fields, vec!["server.api_token"]);
    }
}
