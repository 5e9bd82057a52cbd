// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP error responses.
//!
//! Webhook and send endpoints answer `{"message": ...}`; profile and upload
//! endpoints answer `{"error": ...}`. Operator front-ends rely on both shapes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatdesk_core::{AuthenticityError, ChatdeskError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
enum ErrorBody {
    Message { message: String },
    Error { error: String },
}

/// An error that renders as a JSON HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// `{"message": ...}` body.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::Message {
                message: message.into(),
            },
        }
    }

    /// `{"error": ...}` body.
    pub fn error(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::Error {
                error: error.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::message(StatusCode::BAD_REQUEST, message)
    }

    /// Opaque 500 used when the cause must not leak to the caller.
    pub fn failed() -> Self {
        Self::message(StatusCode::INTERNAL_SERVER_ERROR, "Failed")
    }

    /// Map an upstream error to `{"error"}`, keeping the platform's HTTP
    /// status when it reported one.
    pub fn upstream(err: &ChatdeskError) -> Self {
        let status = err
            .platform_status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::error(status, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<AuthenticityError> for ApiError {
    fn from(err: AuthenticityError) -> Self {
        match err {
            AuthenticityError::Missing => Self::bad_request("Missing signature"),
            AuthenticityError::Invalid => Self::message(StatusCode::FORBIDDEN, "Invalid signature"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
