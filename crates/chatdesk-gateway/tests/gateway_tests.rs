// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the gateway router against a temp SQLite store and
//! mock platform/blob adapters.

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use chatdesk_core::types::PushMessage;
use chatdesk_gateway::{GatewayState, build_router};
use chatdesk_line::signature::{SIGNATURE_HEADER, sign};
use chatdesk_test_utils::TestHarness;
use chatdesk_test_utils::harness::TEST_CHANNEL_SECRET;
use serde_json::{Value, json};
use tower::ServiceExt;

fn router(harness: &TestHarness) -> Router {
    build_router(GatewayState::new(
        harness.store.clone(),
        harness.platform.clone(),
        harness.blob.clone(),
        harness.config.clone(),
    ))
}

async fn call(harness: &TestHarness, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(harness).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn signed_webhook(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, sign(TEST_CHANNEL_SECRET, body.as_bytes()))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn text_event(id: &str, user: &str, ts: i64, text: &str) -> Value {
    json!({
        "type": "message",
        "webhookEventId": format!("evt-{id}"),
        "timestamp": ts,
        "source": {"type": "user", "userId": user},
        "message": {"type": "text", "id": id, "text": text}
    })
}

fn image_event(id: &str, user: &str, ts: i64) -> Value {
    json!({
        "type": "message",
        "timestamp": ts,
        "source": {"type": "user", "userId": user},
        "message": {"type": "image", "id": id}
    })
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn timestamps(page: &Value) -> Vec<i64> {
    page["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["timestamp"].as_i64().unwrap())
        .collect()
}

// --- webhook ---

#[tokio::test]
async fn redelivered_webhook_stores_message_once() {
    let harness = TestHarness::new().await.unwrap();
    let body = json!({"events": [text_event("m1", "U1", 1000, "hello")]}).to_string();

    for _ in 0..3 {
        let (status, json) = call(&harness, signed_webhook(&body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"status": "ok"}));
    }

    assert_eq!(harness.stored_count().await.unwrap(), 1);
}

#[tokio::test]
async fn missing_signature_is_400_and_writes_nothing() {
    let harness = TestHarness::new().await.unwrap();
    let body = json!({"events": [text_event("m1", "U1", 1000, "hello")]}).to_string();

    let (status, json) = call(&harness, post_json("/webhook", serde_json::from_str(&body).unwrap())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Missing signature");
    assert_eq!(harness.stored_count().await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_signature_is_403_and_writes_nothing() {
    let harness = TestHarness::new().await.unwrap();
    let body = json!({"events": [text_event("m1", "U1", 1000, "hello")]}).to_string();

    for signature in [
        sign("some-other-secret", body.as_bytes()),
        "not base64!!".to_string(),
        sign(TEST_CHANNEL_SECRET, b"a different body"),
    ] {
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.clone()))
            .unwrap();
        let (status, json) = call(&harness, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["message"], "Invalid signature");
    }

    assert_eq!(harness.stored_count().await.unwrap(), 0);
    assert_eq!(harness.blob.object_count().await, 0);
}

#[tokio::test]
async fn signed_garbage_is_400_invalid_body() {
    let harness = TestHarness::new().await.unwrap();
    let (status, json) = call(&harness, signed_webhook("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid body");
}

#[tokio::test]
async fn failed_relays_skip_only_their_events() {
    let harness = TestHarness::new().await.unwrap();
    let events: Vec<Value> = (1..=6)
        .map(|n| image_event(&format!("img{n}"), "U1", n * 100))
        .collect();
    harness.platform.fail_content_for("img2").await;
    harness.platform.fail_content_for("img5").await;

    let body = json!({"events": events}).to_string();
    let (status, _) = call(&harness, signed_webhook(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.stored_count().await.unwrap(), 4);
    assert_eq!(harness.blob.object_count().await, 4);
    assert!(harness.blob.object("img2.jpg").await.is_none());
}

#[tokio::test]
async fn blob_outage_still_acknowledges_delivery() {
    let harness = TestHarness::new().await.unwrap();
    harness.blob.set_fail_upload(true);
    let body = json!({"events": [
        image_event("img1", "U1", 100),
        text_event("t1", "U1", 200, "still here"),
    ]})
    .to_string();

    let (status, _) = call(&harness, signed_webhook(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.stored_count().await.unwrap(), 1);
}

#[tokio::test]
async fn signing_outage_skips_image_but_keeps_later_events() {
    let harness = TestHarness::new().await.unwrap();
    harness.blob.set_fail_sign(true);
    let body = json!({"events": [
        image_event("img1", "U1", 100),
        text_event("t1", "U1", 200, "after the image"),
        text_event("t2", "U1", 300, "and another"),
    ]})
    .to_string();

    let (status, json) = call(&harness, signed_webhook(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ok"}));
    assert_eq!(harness.stored_count().await.unwrap(), 2);

    let (_, page) = call(&harness, get("/messages?odna=U1")).await;
    assert_eq!(timestamps(&page), vec![200, 300]);
}

#[tokio::test]
async fn empty_channel_secret_rejects_empty_key_signature() {
    let mut harness = TestHarness::new().await.unwrap();
    harness.config.line.channel_secret = String::new();
    let body = json!({"events": [text_event("m1", "U1", 1000, "forged")]}).to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(SIGNATURE_HEADER, sign("", body.as_bytes()))
        .body(Body::from(body))
        .unwrap();
    let (status, json) = call(&harness, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Invalid signature");
    assert_eq!(harness.stored_count().await.unwrap(), 0);
}

#[tokio::test]
async fn non_text_signature_header_is_403() {
    let harness = TestHarness::new().await.unwrap();
    let body = json!({"events": [text_event("m1", "U1", 1000, "hello")]}).to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(SIGNATURE_HEADER, HeaderValue::from_bytes(&[0xff, 0xfe, 0x80]).unwrap())
        .body(Body::from(body))
        .unwrap();
    let (status, json) = call(&harness, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Invalid signature");
    assert_eq!(harness.stored_count().await.unwrap(), 0);
}

#[tokio::test]
async fn webhook_bypasses_operator_token() {
    let harness = TestHarness::builder()
        .with_api_token("operator-token")
        .build()
        .await
        .unwrap();
    let body = json!({"events": [text_event("m1", "U1", 1000, "hello")]}).to_string();
    let (status, _) = call(&harness, signed_webhook(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.stored_count().await.unwrap(), 1);
}

// --- outbound ---

#[tokio::test]
async fn sent_message_is_newest_in_history() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_text("old", "U1", 1_000, "earlier").await.unwrap();

    let (status, sent) = call(
        &harness,
        post_json("/messages", json!({"odna": "U1", "text": "reply"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["direction"], "outgoing");
    assert_eq!(sent["type"], "text");

    let (status, page) = call(&harness, get("/messages?odna=U1")).await;
    assert_eq!(status, StatusCode::OK);
    let messages = page["messages"].as_array().unwrap();
    assert_eq!(messages.last().unwrap()["id"], sent["id"]);
    assert_eq!(messages.last().unwrap()["text"], "reply");

    let pushes = harness.platform.pushes().await;
    assert_eq!(pushes, vec![("U1".to_string(), PushMessage::Text("reply".into()))]);
}

#[tokio::test]
async fn image_send_pushes_url_and_stores_placeholder() {
    let harness = TestHarness::new().await.unwrap();
    let (status, sent) = call(
        &harness,
        post_json(
            "/messages",
            json!({"odna": "U1", "type": "image", "imageUrl": "https://cdn.test/a.jpg"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["imageUrl"], "https://cdn.test/a.jpg");
    assert_eq!(sent["text"], chatdesk_core::IMAGE_PLACEHOLDER);

    let pushes = harness.platform.pushes().await;
    assert_eq!(
        pushes[0].1,
        PushMessage::Image {
            url: "https://cdn.test/a.jpg".into()
        }
    );
}

#[tokio::test]
async fn push_failure_persists_nothing() {
    let harness = TestHarness::new().await.unwrap();
    harness.platform.set_fail_push(true);

    let (status, json) = call(
        &harness,
        post_json("/messages", json!({"odna": "U1", "text": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "Failed");
    assert_eq!(harness.stored_count().await.unwrap(), 0);
}

#[tokio::test]
async fn send_validation_errors() {
    let harness = TestHarness::new().await.unwrap();
    for (body, message) in [
        (json!({"text": "hi"}), "Missing userId"),
        (json!({"odna": "U1"}), "Missing text"),
        (json!({"odna": "U1", "type": "image"}), "Missing imageUrl"),
    ] {
        let (status, json) = call(&harness, post_json("/messages", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], message);
    }
    assert!(harness.platform.pushes().await.is_empty());
}

// --- read API ---

#[tokio::test]
async fn backward_pagination_walks_history() {
    let harness = TestHarness::new().await.unwrap();
    for ts in [10, 20, 30, 40, 50] {
        harness
            .seed_text(&format!("m{ts}"), "U1", ts, "x")
            .await
            .unwrap();
    }

    let (_, first) = call(&harness, get("/messages?odna=U1&limit=2")).await;
    assert_eq!(timestamps(&first), vec![40, 50]);
    assert_eq!(first["hasMore"], true);

    let (_, second) = call(&harness, get("/messages?odna=U1&limit=2&before=40")).await;
    assert_eq!(timestamps(&second), vec![20, 30]);
    assert_eq!(second["hasMore"], true);

    let (_, third) = call(&harness, get("/messages?odna=U1&limit=2&before=20")).await;
    assert_eq!(timestamps(&third), vec![10]);
    assert_eq!(third["hasMore"], false);
}

#[tokio::test]
async fn compound_cursor_pages_through_equal_timestamps() {
    let harness = TestHarness::new().await.unwrap();
    for id in ["a", "b", "c"] {
        harness.seed_text(id, "U1", 100, id).await.unwrap();
    }

    let (_, first) = call(&harness, get("/messages?odna=U1&limit=2")).await;
    let ids: Vec<&str> = first["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["b", "c"]);

    let (_, second) = call(
        &harness,
        get("/messages?odna=U1&limit=2&before=100&beforeId=b"),
    )
    .await;
    assert_eq!(second["messages"][0]["id"], "a");
    assert_eq!(second["hasMore"], false);
}

#[tokio::test]
async fn recent_feed_spans_counterparts() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_text("a", "U1", 10, "one").await.unwrap();
    harness.seed_text("b", "U2", 20, "two").await.unwrap();

    let (_, page) = call(&harness, get("/messages")).await;
    assert_eq!(timestamps(&page), vec![10, 20]);

    let (_, page) = call(&harness, get("/messages?odna=U2")).await;
    assert_eq!(timestamps(&page), vec![20]);
}

#[tokio::test]
async fn profile_lookup_returns_platform_profile() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .platform
        .add_profile(chatdesk_core::types::UserProfile {
            user_id: "U1".into(),
            display_name: "Alice".into(),
            picture_url: None,
            status_message: None,
        })
        .await;

    let (status, json) = call(&harness, get("/users/U1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["displayName"], "Alice");
}
