// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read API, profile lookups, upload signing, and health.

use std::time::Duration;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatdesk_core::{Cursor, Page, PageQuery, now_millis};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::ApiError;
use crate::server::GatewayState;

/// Query string of `GET /messages`. Numbers are parsed by hand so that a
/// malformed value yields our own 400 body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    pub odna: Option<String>,
    pub limit: Option<String>,
    pub before: Option<String>,
    pub before_id: Option<String>,
}

impl MessagesQuery {
    fn into_page_query(self, default_limit: u32, max_limit: u32) -> Result<PageQuery, ApiError> {
        let limit = match self.limit.as_deref().filter(|s| !s.is_empty()) {
            None => default_limit,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| ApiError::bad_request("Invalid limit"))?
                .clamp(1, i64::from(max_limit)) as u32,
        };
        let before = match self.before.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => {
                let timestamp = raw
                    .parse::<i64>()
                    .map_err(|_| ApiError::bad_request("Invalid before"))?;
                Some(Cursor {
                    timestamp,
                    id: self.before_id.filter(|s| !s.is_empty()),
                })
            }
        };
        Ok(PageQuery {
            counterpart_id: self.odna.filter(|s| !s.is_empty()),
            limit: limit.min(max_limit),
            before,
        })
    }
}

/// GET /messages
///
/// Storage failures answer an empty page so the operator UI keeps polling.
pub async fn get_messages(
    State(state): State<GatewayState>,
    Query(query): Query<MessagesQuery>,
) -> Response {
    let pagination = &state.config.pagination;
    let page_query = match query.into_page_query(pagination.messages_per_page, pagination.max_limit)
    {
        Ok(q) => q,
        Err(e) => return e.into_response(),
    };

    match state.store.query_page(&page_query).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => {
            error!(counterpart = ?page_query.counterpart_id, error = %e, "message query failed");
            Json(Page::empty()).into_response()
        }
    }
}

/// GET /users/{user_id}
pub async fn get_user_profile(
    State(state): State<GatewayState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.platform.get_profile(&user_id).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => {
            warn!(user_id, error = %e, "profile lookup failed");
            ApiError::upstream(&e).into_response()
        }
    }
}

/// GET /profile
pub async fn get_bot_profile(State(state): State<GatewayState>) -> Response {
    match state.platform.get_bot_info().await {
        Ok(info) => Json(info).into_response(),
        Err(e) => {
            warn!(error = %e, "bot info lookup failed");
            ApiError::upstream(&e).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadInitRequest {
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    file_type: Option<String>,
}

/// POST /upload/init
///
/// Hands out a signed upload URL so the UI can upload directly to storage.
pub async fn post_upload_init(State(state): State<GatewayState>, body: Bytes) -> Response {
    let (file_name, file_type) = match serde_json::from_slice::<UploadInitRequest>(&body) {
        Ok(UploadInitRequest {
            file_name: Some(name),
            file_type,
        }) if !name.is_empty() => (name, file_type),
        Ok(_) => return ApiError::error(StatusCode::BAD_REQUEST, "Missing fileName").into_response(),
        Err(_) => return ApiError::error(StatusCode::BAD_REQUEST, "Invalid body").into_response(),
    };

    let path = format!("{}-{}", now_millis(), sanitize_file_name(&file_name));
    match state.blob.create_signed_upload(&path).await {
        Ok(upload) => {
            debug!(path, file_type = ?file_type, "signed upload issued");
            Json(upload).into_response()
        }
        Err(e) => {
            error!(path, error = %e, "failed to sign upload");
            ApiError::upstream(&e).into_response()
        }
    }
}

/// Strip path separators so a file name cannot address another object.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

#[derive(Debug, Deserialize)]
struct UploadUrlRequest {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadUrlResponse {
    url: String,
}

/// POST /upload
///
/// Durable read URL for an object the UI uploaded through `/upload/init`.
pub async fn post_upload(State(state): State<GatewayState>, body: Bytes) -> Response {
    let path = match serde_json::from_slice::<UploadUrlRequest>(&body) {
        Ok(UploadUrlRequest { path: Some(path) }) if !path.is_empty() => path,
        Ok(_) => return ApiError::error(StatusCode::BAD_REQUEST, "Missing path").into_response(),
        Err(_) => return ApiError::error(StatusCode::BAD_REQUEST, "Invalid body").into_response(),
    };

    let expires_in = Duration::from_secs(state.config.blob.expires_in_secs);
    match state.blob.signed_url(&path, expires_in).await {
        Ok(url) => Json(UploadUrlResponse { url }).into_response(),
        Err(e) => {
            error!(path, error = %e, "failed to sign read URL");
            ApiError::error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use chatdesk_test_utils::TestHarness;
    use tower::ServiceExt;

    use crate::server::build_router;

    fn query(limit: Option<&str>, before: Option<&str>, before_id: Option<&str>) -> MessagesQuery {
        MessagesQuery {
            odna: Some("U1".into()),
            limit: limit.map(Into::into),
            before: before.map(Into::into),
            before_id: before_id.map(Into::into),
        }
    }

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(query(None, None, None).into_page_query(50, 500).unwrap().limit, 50);
        assert_eq!(query(Some("0"), None, None).into_page_query(50, 500).unwrap().limit, 1);
        assert_eq!(query(Some("-3"), None, None).into_page_query(50, 500).unwrap().limit, 1);
        assert_eq!(query(Some("9999"), None, None).into_page_query(50, 500).unwrap().limit, 500);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        assert!(query(Some("ten"), None, None).into_page_query(50, 500).is_err());
        assert!(query(None, Some("yesterday"), None).into_page_query(50, 500).is_err());
    }

    #[test]
    fn before_id_only_applies_with_before() {
        let q = query(None, Some("40"), Some("m4")).into_page_query(50, 500).unwrap();
        assert_eq!(
            q.before,
            Some(Cursor {
                timestamp: 40,
                id: Some("m4".into())
            })
        );
        let q = query(None, None, Some("m4")).into_page_query(50, 500).unwrap();
        assert_eq!(q.before, None);
    }

    #[test]
    fn file_names_cannot_escape() {
        assert_eq!(sanitize_file_name("../a/b.png"), ".._a_b.png");
    }

    async fn send(harness: &TestHarness, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let state = GatewayState::new(
            harness.store.clone(),
            harness.platform.clone(),
            harness.blob.clone(),
            harness.config.clone(),
        );
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_is_public() {
        let harness = TestHarness::builder().with_api_token("tok").build().await.unwrap();
        let (status, json) = send(
            &harness,
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn unknown_user_propagates_404() {
        let harness = TestHarness::new().await.unwrap();
        let (status, json) = send(
            &harness,
            Request::builder().uri("/users/Unknown").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn bot_profile_is_returned() {
        let harness = TestHarness::new().await.unwrap();
        let (status, json) = send(
            &harness,
            Request::builder().uri("/profile").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["displayName"], "Mock Bot");
    }

    #[tokio::test]
    async fn upload_init_requires_file_name() {
        let harness = TestHarness::new().await.unwrap();
        let (status, json) = send(
            &harness,
            Request::builder()
                .method("POST")
                .uri("/upload/init")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"fileType":"image/png"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing fileName");

        let (status, json) = send(
            &harness,
            Request::builder()
                .method("POST")
                .uri("/upload/init")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"fileName":"cat.png"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["path"].as_str().unwrap().ends_with("-cat.png"));
        assert_eq!(json["token"], "mock-token");
    }

    #[tokio::test]
    async fn upload_signs_existing_object() {
        let harness = TestHarness::new().await.unwrap();
        use chatdesk_core::BlobStore;
        harness
            .blob
            .upload("1-cat.png", vec![1], "image/png", false)
            .await
            .unwrap();

        let (status, json) = send(
            &harness,
            Request::builder()
                .method("POST")
                .uri("/upload")
                .body(Body::from(r#"{"path":"1-cat.png"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["url"], "https://blob.test/1-cat.png?expires=31536000");

        let (status, _) = send(
            &harness,
            Request::builder()
                .method("POST")
                .uri("/upload")
                .body(Body::from(r#"{"path":"missing.png"}"#))
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn operator_routes_require_token_when_configured() {
        let harness = TestHarness::builder().with_api_token("tok").build().await.unwrap();
        let (status, _) = send(
            &harness,
            Request::builder().uri("/messages").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, json) = send(
            &harness,
            Request::builder()
                .uri("/messages")
                .header("authorization", "Bearer tok")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["hasMore"], false);
    }

    #[tokio::test]
    async fn malformed_limit_is_400() {
        let harness = TestHarness::new().await.unwrap();
        let (status, _) = send(
            &harness,
            Request::builder()
                .uri("/messages?limit=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
