// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and error shapes of the LINE Messaging API.

use chatdesk_core::types::PushMessage;
use serde::{Deserialize, Serialize};

/// Body of `POST /v2/bot/message/push`.
#[derive(Debug, Serialize)]
pub struct PushRequest<'a> {
    pub to: &'a str,
    pub messages: Vec<OutgoingMessage<'a>>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        original_content_url: &'a str,
        preview_image_url: &'a str,
    },
}

impl<'a> From<&'a PushMessage> for OutgoingMessage<'a> {
    fn from(message: &'a PushMessage) -> Self {
        match message {
            PushMessage::Text(text) => Self::Text { text },
            PushMessage::Image { url } => Self::Image {
                original_content_url: url,
                preview_image_url: url,
            },
        }
    }
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub message: String,
    #[serde(default)]
    pub details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub property: String,
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;
        for detail in &self.details {
            write!(f, "; {}: {}", detail.property, detail.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_push_uses_url_for_both_fields() {
        let msg = PushMessage::Image {
            url: "https://blob/x.jpg".into(),
        };
        let json = serde_json::to_value(OutgoingMessage::from(&msg)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "image",
                "originalContentUrl": "https://blob/x.jpg",
                "previewImageUrl": "https://blob/x.jpg"
            })
        );
    }

    #[test]
    fn error_body_formats_details() {
        let err: ApiErrorResponse = serde_json::from_str(
            r#"{"message":"The request body has 1 error(s)",
                "details":[{"message":"May not be empty","property":"messages[0].text"}]}"#,
        )
        .unwrap();
        assert_eq!(
            err.to_string(),
            "The request body has 1 error(s); messages[0].text: May not be empty"
        );
    }
}
