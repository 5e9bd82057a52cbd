// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message, page, and profile types shared across adapter traits and services.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ChatdeskError;

/// Text stored alongside image messages, both inbound and outbound.
pub const IMAGE_PLACEHOLDER: &str = "Sent an image";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Platform,
    Blob,
}

/// Whether a message came from the counterpart or was sent by the operator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Type tag of a message on the wire and in the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
}

/// Payload of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Plain text content.
    Text { text: String },
    /// An image held in object storage, with a human-readable caption.
    Image { url: String, caption: String },
}

impl MessageBody {
    /// Text body.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image body captioned with [`IMAGE_PLACEHOLDER`].
    pub fn image(url: impl Into<String>) -> Self {
        Self::Image {
            url: url.into(),
            caption: IMAGE_PLACEHOLDER.to_string(),
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text { .. } => MessageKind::Text,
            Self::Image { .. } => MessageKind::Image,
        }
    }

    /// The human-readable text: content for text messages, caption for images.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Text { text } => text,
            Self::Image { caption, .. } => caption,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Text { .. } => None,
            Self::Image { url, .. } => Some(url),
        }
    }
}

/// A persisted chat message.
///
/// Serializes to the flat wire shape described by [`MessageRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MessageRecord", into = "MessageRecord")]
pub struct Message {
    /// Platform-assigned id for inbound messages, generated at send time for outbound.
    pub id: String,
    /// The external chat partner this message belongs to.
    pub counterpart_id: String,
    pub direction: Direction,
    pub body: MessageBody,
    /// Milliseconds since the Unix epoch. Sole ordering key and pagination cursor.
    pub timestamp: i64,
    /// Correlation id of the webhook delivery that carried this message.
    pub webhook_event_id: Option<String>,
}

impl Message {
    /// Ordering key: timestamp, then id to break ties deterministically.
    pub fn sort_key(&self) -> (i64, &str) {
        (self.timestamp, self.id.as_str())
    }

    /// Pagination cursor pointing just before this message.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            timestamp: self.timestamp,
            id: Some(self.id.clone()),
        }
    }
}

/// Flat representation of a [`Message`] used for JSON and database rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: String,
    pub odna: String,
    pub direction: Direction,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_event_id: Option<String>,
}

impl From<Message> for MessageRecord {
    fn from(message: Message) -> Self {
        let kind = message.body.kind();
        let (text, image_url) = match message.body {
            MessageBody::Text { text } => (text, None),
            MessageBody::Image { url, caption } => (caption, Some(url)),
        };
        Self {
            id: message.id,
            odna: message.counterpart_id,
            direction: message.direction,
            kind,
            text,
            image_url,
            timestamp: message.timestamp,
            webhook_event_id: message.webhook_event_id,
        }
    }
}

impl TryFrom<MessageRecord> for Message {
    type Error = ChatdeskError;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        if record.odna.is_empty() {
            return Err(ChatdeskError::Validation(format!(
                "message {} has no counterpart",
                record.id
            )));
        }
        let body = match record.kind {
            MessageKind::Text => MessageBody::Text { text: record.text },
            MessageKind::Image => {
                let url = record.image_url.ok_or_else(|| {
                    ChatdeskError::Validation(format!(
                        "image message {} has no imageUrl",
                        record.id
                    ))
                })?;
                MessageBody::Image {
                    url,
                    caption: record.text,
                }
            }
        };
        Ok(Self {
            id: record.id,
            counterpart_id: record.odna,
            direction: record.direction,
            body,
            timestamp: record.timestamp,
            webhook_event_id: record.webhook_event_id,
        })
    }
}

/// Result of [`MessageStore::insert_if_absent`](crate::MessageStore::insert_if_absent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    /// The message was written.
    Created(Message),
    /// A message with the same id already existed; it is returned unchanged.
    Duplicate(Message),
}

impl Insertion {
    pub fn message(&self) -> &Message {
        match self {
            Self::Created(m) | Self::Duplicate(m) => m,
        }
    }

    pub fn into_message(self) -> Message {
        match self {
            Self::Created(m) | Self::Duplicate(m) => m,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Exclusive upper bound for backward pagination.
///
/// With only a timestamp, rows strictly older than it are returned. With an id
/// as well, rows sharing the timestamp but with a smaller id are included, so
/// paging through equal timestamps neither skips nor repeats rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub timestamp: i64,
    pub id: Option<String>,
}

impl Cursor {
    pub fn at(timestamp: i64) -> Self {
        Self {
            timestamp,
            id: None,
        }
    }
}

/// Parameters of a paginated message read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Restrict to one counterpart; `None` reads the cross-counterpart feed.
    pub counterpart_id: Option<String>,
    pub limit: u32,
    pub before: Option<Cursor>,
}

impl PageQuery {
    /// Most recent messages across all counterparts.
    pub fn recent(limit: u32) -> Self {
        Self {
            counterpart_id: None,
            limit,
            before: None,
        }
    }

    /// Most recent messages of one counterpart.
    pub fn for_counterpart(counterpart_id: impl Into<String>, limit: u32) -> Self {
        Self {
            counterpart_id: Some(counterpart_id.into()),
            limit,
            before: None,
        }
    }

    pub fn before(mut self, cursor: Cursor) -> Self {
        self.before = Some(cursor);
        self
    }
}

/// One page of messages in ascending chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub messages: Vec<Message>,
    pub has_more: bool,
}

impl Page {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Content pushed to a counterpart through the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushMessage {
    Text(String),
    /// Image referenced by a durable URL, used as both full and preview image.
    Image { url: String },
}

/// Profile of a counterpart as reported by the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl UserProfile {
    /// Picture URL, or a generated initials avatar when the profile has none.
    pub fn avatar_url(&self) -> String {
        avatar_url(&self.user_id, self.picture_url.as_deref())
    }
}

/// Avatar for a counterpart: its picture when known, else an initials placeholder.
pub fn avatar_url(user_id: &str, picture_url: Option<&str>) -> String {
    if let Some(url) = picture_url.filter(|u| !u.is_empty()) {
        return url.to_string();
    }
    let seed: String = if user_id.is_empty() {
        "UN".to_string()
    } else {
        user_id.chars().take(2).collect()
    };
    format!("https://ui-avatars.com/api/?name={seed}&background=10b981&color=fff")
}

/// Information about the official account itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotInfo {
    pub user_id: String,
    #[serde(default)]
    pub basic_id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark_as_read_mode: Option<String>,
}

/// A pre-signed URL the operator UI uploads a file to directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUpload {
    pub upload_url: String,
    pub token: String,
    pub path: String,
}
