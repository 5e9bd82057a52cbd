// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `POST /webhook`: signed event deliveries from the messaging platform.
//!
//! The signature is checked on the raw body before anything is parsed. After
//! that every event is attempted independently and the delivery is always
//! acknowledged, so the platform does not redeliver a partly failed batch.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chatdesk_core::{AuthenticityError, Direction, Insertion, Message, MessageBody, now_millis};
use chatdesk_line::signature::{self, SIGNATURE_HEADER};
use chatdesk_line::{EventMessage, WebhookEvent, parse_events};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::relay::{self, RelayOptions};
use crate::server::GatewayState;

/// Outcome of one webhook delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Events in the delivery, including ones that failed to decode.
    pub received: usize,
    /// Messages newly written.
    pub stored: usize,
    /// Messages whose id was already stored.
    pub duplicates: usize,
    /// Events not persisted for any reason.
    pub skipped: usize,
}

pub async fn post_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if state.config.line.channel_secret.is_empty() {
        error!("line.channel_secret is not configured; rejecting webhook delivery");
        return ApiError::from(AuthenticityError::Invalid).into_response();
    }

    // A header that is present but not text was tampered with, not omitted.
    let verified = headers
        .get(SIGNATURE_HEADER)
        .map(|v| v.to_str().map_err(|_| AuthenticityError::Invalid))
        .transpose()
        .and_then(|provided| {
            signature::verify(&state.config.line.channel_secret, &body, provided)
        });
    if let Err(e) = verified {
        warn!(reason = %e, "webhook signature rejected");
        return ApiError::from(e).into_response();
    }

    let (received, events) = match parse_events(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "webhook body is not valid JSON");
            return ApiError::bad_request("Invalid body").into_response();
        }
    };

    let report = ingest(&state, received, events).await;
    info!(
        received = report.received,
        stored = report.stored,
        duplicates = report.duplicates,
        skipped = report.skipped,
        "webhook processed"
    );

    Json(serde_json::json!({ "status": "ok" })).into_response()
}

/// Persist the message events of one delivery, in order.
pub async fn ingest(
    state: &GatewayState,
    received: usize,
    events: Vec<WebhookEvent>,
) -> IngestReport {
    let mut report = IngestReport {
        received,
        // Events that did not decode never reach the loop.
        skipped: received.saturating_sub(events.len()),
        ..IngestReport::default()
    };

    for event in events {
        let Some(message) = map_event(state, &event).await else {
            report.skipped += 1;
            continue;
        };
        match state.store.insert_if_absent(&message).await {
            Ok(Insertion::Created(_)) => report.stored += 1,
            Ok(Insertion::Duplicate(_)) => {
                debug!(message_id = %message.id, "duplicate delivery ignored");
                report.duplicates += 1;
            }
            Err(e) => {
                error!(message_id = %message.id, error = %e, "failed to persist inbound message");
                report.skipped += 1;
            }
        }
    }

    report
}

/// Turn an event into a storable message, or `None` if it should be skipped.
async fn map_event(state: &GatewayState, event: &WebhookEvent) -> Option<Message> {
    if !event.is_message() {
        debug!(kind = %event.kind, "ignoring non-message event");
        return None;
    }
    let Some(user_id) = event.user_id() else {
        warn!(event_id = ?event.webhook_event_id, "message event without a user id");
        return None;
    };

    let (id, body) = match event.message.as_ref()? {
        EventMessage::Text { id, text } => (id.clone(), MessageBody::text(text.clone())),
        EventMessage::Image { id } => {
            let options = RelayOptions::from(&state.config.blob);
            match relay::relay(state.platform.as_ref(), state.blob.as_ref(), id, options).await {
                Ok(url) => (id.clone(), MessageBody::image(url)),
                Err(e) => {
                    warn!(message_id = %id, error = %e, "image relay failed; skipping event");
                    return None;
                }
            }
        }
        EventMessage::Unsupported => {
            debug!(user_id, "ignoring unsupported message kind");
            return None;
        }
    };

    let timestamp = if event.timestamp > 0 {
        event.timestamp
    } else {
        now_millis()
    };

    Some(Message {
        id,
        counterpart_id: user_id.to_string(),
        direction: Direction::Incoming,
        body,
        timestamp,
        webhook_event_id: event.webhook_event_id.clone(),
    })
}
