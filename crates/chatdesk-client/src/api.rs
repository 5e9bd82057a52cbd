// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway API used by the conversation client.

use async_trait::async_trait;
use chatdesk_config::model::ClientConfig;
use chatdesk_core::types::UserProfile;
use chatdesk_core::{ChatdeskError, Message, MessageKind, Page, PageQuery};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Something the operator wants to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Text(String),
    /// An already uploaded image, referenced by its durable URL.
    Image { url: String, caption: Option<String> },
}

impl Draft {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::Image {
            url: url.into(),
            caption: None,
        }
    }
}

/// Read and write operations the client needs from the gateway.
#[async_trait]
pub trait MessageApi: Send + Sync {
    /// One page of history, ascending.
    async fn fetch_page(&self, query: &PageQuery) -> Result<Page, ChatdeskError>;

    /// Send a message; returns the stored message.
    async fn send(&self, counterpart_id: &str, draft: &Draft) -> Result<Message, ChatdeskError>;

    async fn fetch_profile(&self, counterpart_id: &str) -> Result<UserProfile, ChatdeskError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendBody<'a> {
    odna: &'a str,
    #[serde(rename = "type")]
    kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

impl<'a> SendBody<'a> {
    fn new(odna: &'a str, draft: &'a Draft) -> Self {
        match draft {
            Draft::Text(text) => Self {
                odna,
                kind: MessageKind::Text,
                text: Some(text),
                image_url: None,
            },
            Draft::Image { url, caption } => Self {
                odna,
                kind: MessageKind::Image,
                text: caption.as_deref(),
                image_url: Some(url),
            },
        }
    }
}

/// Gateway error bodies come as `{"message"}` or `{"error"}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// [`MessageApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMessageApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpMessageApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ChatdeskError> {
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .map_err(|e| ChatdeskError::Config(format!("invalid client.base_url: {e}")))?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ChatdeskError::Config(format!("invalid client.api_token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| client_error(format!("failed to build HTTP client: {e}"), Some(e)))?;

        Ok(Self { client, base_url })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ChatdeskError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ChatdeskError::Config("client.base_url cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn check(what: &str, response: Response) -> Result<Response, ChatdeskError> {
        let status = response.status();
        debug!(%status, what, "gateway response");
        if status.is_success() {
            return Ok(response);
        }
        let body: ErrorBody = response.json().await.unwrap_or_default();
        let detail = body.message.or(body.error).unwrap_or_default();
        Err(client_error(
            format!("{what}: HTTP {}: {detail}", status.as_u16()),
            None,
        ))
    }
}

fn client_error(message: String, source: Option<reqwest::Error>) -> ChatdeskError {
    ChatdeskError::Client {
        message,
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    }
}

fn request_failed(what: &str) -> impl FnOnce(reqwest::Error) -> ChatdeskError + '_ {
    move |e| client_error(format!("{what}: request failed: {e}"), Some(e))
}

fn decode_failed(what: &str) -> impl FnOnce(reqwest::Error) -> ChatdeskError + '_ {
    move |e| client_error(format!("{what}: invalid response: {e}"), Some(e))
}

#[async_trait]
impl MessageApi for HttpMessageApi {
    async fn fetch_page(&self, query: &PageQuery) -> Result<Page, ChatdeskError> {
        let mut url = self.url(&["messages"])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(odna) = &query.counterpart_id {
                pairs.append_pair("odna", odna);
            }
            pairs.append_pair("limit", &query.limit.to_string());
            if let Some(cursor) = &query.before {
                pairs.append_pair("before", &cursor.timestamp.to_string());
                if let Some(id) = &cursor.id {
                    pairs.append_pair("beforeId", id);
                }
            }
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(request_failed("fetch page"))?;
        Self::check("fetch page", response)
            .await?
            .json()
            .await
            .map_err(decode_failed("fetch page"))
    }

    async fn send(&self, counterpart_id: &str, draft: &Draft) -> Result<Message, ChatdeskError> {
        let url = self.url(&["messages"])?;
        let response = self
            .client
            .post(url)
            .json(&SendBody::new(counterpart_id, draft))
            .send()
            .await
            .map_err(request_failed("send"))?;
        Self::check("send", response)
            .await?
            .json()
            .await
            .map_err(decode_failed("send"))
    }

    async fn fetch_profile(&self, counterpart_id: &str) -> Result<UserProfile, ChatdeskError> {
        let url = self.url(&["users", counterpart_id])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(request_failed("fetch profile"))?;
        Self::check("fetch profile", response)
            .await?
            .json()
            .await
            .map_err(decode_failed("fetch profile"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdesk_core::{Cursor, Direction};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer, token: Option<&str>) -> HttpMessageApi {
        let config = ClientConfig {
            base_url: server.uri(),
            api_token: token.map(Into::into),
            ..ClientConfig::default()
        };
        HttpMessageApi::new(&config).unwrap()
    }

    #[tokio::test]
    async fn fetch_page_sends_cursor_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages"))
            .and(query_param("odna", "U1"))
            .and(query_param("limit", "2"))
            .and(query_param("before", "40"))
            .and(query_param("beforeId", "m40"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [
                    {"id":"m20","odna":"U1","direction":"incoming","type":"text","text":"a","timestamp":20},
                    {"id":"m30","odna":"U1","direction":"outgoing","type":"text","text":"b","timestamp":30}
                ],
                "hasMore": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = PageQuery::for_counterpart("U1", 2).before(Cursor {
            timestamp: 40,
            id: Some("m40".into()),
        });
        let page = api(&server, Some("tok")).fetch_page(&query).await.unwrap();
        assert!(page.has_more);
        assert_eq!(page.messages.len(), 2);
        assert_eq!(page.messages[1].direction, Direction::Outgoing);
    }

    #[tokio::test]
    async fn send_posts_image_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_json(serde_json::json!({
                "odna": "U1", "type": "image", "imageUrl": "https://cdn/x.jpg"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id":"1-abc","odna":"U1","direction":"outgoing","type":"image",
                "text":"Sent an image","imageUrl":"https://cdn/x.jpg","timestamp":1
            })))
            .mount(&server)
            .await;

        let message = api(&server, None)
            .send("U1", &Draft::image("https://cdn/x.jpg"))
            .await
            .unwrap();
        assert_eq!(message.body.image_url(), Some("https://cdn/x.jpg"));
    }

    #[tokio::test]
    async fn error_body_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({"message": "Missing text"})),
            )
            .mount(&server)
            .await;

        let err = api(&server, None)
            .send("U1", &Draft::text(""))
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("400"), "{text}");
        assert!(text.contains("Missing text"), "{text}");
    }

    #[tokio::test]
    async fn profile_path_is_escaped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/U%2F1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "userId": "U/1", "displayName": "Slash"
            })))
            .mount(&server)
            .await;

        let profile = api(&server, None).fetch_profile("U/1").await.unwrap();
        assert_eq!(profile.display_name, "Slash");
    }
}
