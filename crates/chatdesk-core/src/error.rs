// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for chatdesk.

use thiserror::Error;

/// The primary error type used across all chatdesk adapter traits and services.
#[derive(Debug, Error)]
pub enum ChatdeskError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, row mapping).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging platform errors (push failure, content download, profile lookup).
    ///
    /// `status` carries the HTTP status returned by the platform, when there was one.
    #[error("platform error: {message}")]
    Platform {
        message: String,
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Object storage errors (upload, URL signing).
    #[error("blob storage error: {message}")]
    Blob {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A request or record is missing a required field or carries an invalid value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Webhook authenticity check failed.
    #[error("authenticity error: {0}")]
    Authenticity(#[from] AuthenticityError),

    /// Errors raised by the conversation client talking to the gateway.
    #[error("client error: {message}")]
    Client {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChatdeskError {
    /// Shorthand for a platform error without an upstream status or source.
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Shorthand for a blob storage error without a source.
    pub fn blob(message: impl Into<String>) -> Self {
        Self::Blob {
            message: message.into(),
            source: None,
        }
    }

    /// HTTP status reported by the messaging platform, if this error carries one.
    pub fn platform_status(&self) -> Option<u16> {
        match self {
            Self::Platform { status, .. } => *status,
            _ => None,
        }
    }

    /// True for failures of an external collaborator (platform or blob store).
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Platform { .. } | Self::Blob { .. } | Self::Timeout { .. })
    }
}

/// Reasons a webhook delivery fails the signature check.
///
/// The two cases map to different HTTP statuses so operators can tell a
/// misconfigured sender from a forged request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthenticityError {
    /// No signature header was sent.
    #[error("missing signature")]
    Missing,
    /// The signature does not match the body.
    #[error("invalid signature")]
    Invalid,
}
