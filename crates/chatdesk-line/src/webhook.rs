// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook payload shapes.
//!
//! Only the fields chatdesk consumes are modelled. Each event is decoded on
//! its own so one malformed or unfamiliar event cannot fail the batch.

use serde::Deserialize;
use tracing::debug;

/// Outer webhook body. Events are kept raw and decoded one by one.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

/// A webhook event, e.g. `message`, `follow` or `unsend`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

impl WebhookEvent {
    pub fn is_message(&self) -> bool {
        self.kind == "message"
    }

    /// Sender's user id, when the source carries a non-empty one.
    pub fn user_id(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|s| s.user_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Message payload of a `message` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventMessage {
    Text { id: String, text: String },
    Image { id: String },
    /// Stickers, video, audio, location and anything newer.
    #[serde(other)]
    Unsupported,
}

/// Decode the webhook body into events.
///
/// Fails only if the body itself is not the expected JSON object. Events that
/// do not decode are logged and dropped; the returned count includes them.
pub fn parse_events(body: &[u8]) -> Result<(usize, Vec<WebhookEvent>), serde_json::Error> {
    let body: WebhookBody = serde_json::from_slice(body)?;
    let received = body.events.len();
    let events = body
        .events
        .into_iter()
        .enumerate()
        .filter_map(|(index, raw)| match serde_json::from_value::<WebhookEvent>(raw) {
            Ok(event) => Some(event),
            Err(e) => {
                debug!(index, error = %e, "skipping undecodable webhook event");
                None
            }
        })
        .collect();
    Ok((received, events))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_and_image_messages() {
        let body = br#"{
            "destination": "Ubot",
            "events": [
                {"type":"message","webhookEventId":"e1","timestamp":1000,
                 "source":{"type":"user","userId":"U1"},
                 "message":{"id":"m1","type":"text","text":"hi"}},
                {"type":"message","timestamp":2000,
                 "source":{"type":"user","userId":"U2"},
                 "message":{"id":"m2","type":"image","contentProvider":{"type":"line"}}}
            ]
        }"#;
        let (received, events) = parse_events(body).unwrap();
        assert_eq!(received, 2);
        assert_eq!(
            events[0].message,
            Some(EventMessage::Text {
                id: "m1".into(),
                text: "hi".into()
            })
        );
        assert_eq!(events[0].webhook_event_id.as_deref(), Some("e1"));
        assert_eq!(events[1].message, Some(EventMessage::Image { id: "m2".into() }));
        assert_eq!(events[1].user_id(), Some("U2"));
    }

    #[test]
    fn unknown_message_types_are_unsupported() {
        let body = br#"{"events":[{"type":"message","timestamp":1,
            "source":{"type":"user","userId":"U1"},
            "message":{"id":"s1","type":"sticker","packageId":"1","stickerId":"2"}}]}"#;
        let (_, events) = parse_events(body).unwrap();
        assert_eq!(events[0].message, Some(EventMessage::Unsupported));
    }

    #[test]
    fn malformed_event_is_dropped_not_fatal() {
        let body = br#"{"events":[{"type":42},{"type":"follow","timestamp":1}]}"#;
        let (received, events) = parse_events(body).unwrap();
        assert_eq!(received, 2);
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_message());
    }

    #[test]
    fn empty_user_id_is_none() {
        let body = br#"{"events":[{"type":"message","source":{"type":"user","userId":""}}]}"#;
        let (_, events) = parse_events(body).unwrap();
        assert_eq!(events[0].user_id(), None);
    }

    #[test]
    fn non_object_body_is_an_error() {
        assert!(parse_events(b"not json").is_err());
        assert!(parse_events(b"[1,2]").is_err());
    }
}
