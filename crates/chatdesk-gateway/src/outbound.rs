// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `POST /messages`: operator sends a message to a counterpart.
//!
//! The message is pushed first and persisted only after the platform accepted
//! it. If persisting then fails the counterpart has the message but the
//! history does not; that case is logged at error level.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use chatdesk_core::types::PushMessage;
use chatdesk_core::{Direction, Message, MessageBody, MessageKind, now_millis};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest {
    #[serde(default)]
    odna: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

/// A validated send request.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    to: String,
    body: MessageBody,
    push: PushMessage,
}

fn validate(request: SendRequest) -> Result<Draft, ApiError> {
    let to = request
        .odna
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing userId"))?;

    let kind = match request.kind.as_deref() {
        None | Some("") => MessageKind::Text,
        Some(other) => other
            .parse::<MessageKind>()
            .map_err(|_| ApiError::bad_request(format!("Unsupported type: {other}")))?,
    };

    match kind {
        MessageKind::Text => {
            let text = request
                .text
                .filter(|t| !t.is_empty())
                .ok_or_else(|| ApiError::bad_request("Missing text"))?;
            Ok(Draft {
                to,
                push: PushMessage::Text(text.clone()),
                body: MessageBody::text(text),
            })
        }
        MessageKind::Image => {
            let url = request
                .image_url
                .filter(|u| !u.is_empty())
                .ok_or_else(|| ApiError::bad_request("Missing imageUrl"))?;
            let body = match request.text.filter(|t| !t.is_empty()) {
                Some(caption) => MessageBody::Image {
                    url: url.clone(),
                    caption,
                },
                None => MessageBody::image(url.clone()),
            };
            Ok(Draft {
                to,
                push: PushMessage::Image { url },
                body,
            })
        }
    }
}

/// Id for an outgoing message; unique even for sends in the same millisecond.
fn outgoing_id(now: i64) -> String {
    format!("{now}-{}", uuid::Uuid::new_v4().simple())
}

pub async fn post_message(State(state): State<GatewayState>, body: Bytes) -> Response {
    let request: SendRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "send request is not valid JSON");
            return ApiError::bad_request("Invalid body").into_response();
        }
    };
    let draft = match validate(request) {
        Ok(draft) => draft,
        Err(e) => return e.into_response(),
    };

    if let Err(e) = state.platform.push(&draft.to, &draft.push).await {
        error!(to = %draft.to, error = %e, "push failed");
        return ApiError::failed().into_response();
    }

    let now = now_millis();
    let message = Message {
        id: outgoing_id(now),
        counterpart_id: draft.to,
        direction: Direction::Outgoing,
        body: draft.body,
        timestamp: now,
        webhook_event_id: None,
    };

    match state.store.insert_if_absent(&message).await {
        Ok(_) => {
            info!(message_id = %message.id, to = %message.counterpart_id, kind = %message.body.kind(), "message sent");
            Json(message).into_response()
        }
        Err(e) => {
            error!(
                message_id = %message.id,
                to = %message.counterpart_id,
                error = %e,
                "message was delivered but could not be persisted"
            );
            ApiError::failed().into_response()
        }
    }
}
