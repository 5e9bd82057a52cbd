// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use chatdesk_config::ChatdeskConfig;
use chatdesk_config::model::ServerConfig;
use chatdesk_core::{BlobStore, ChatdeskError, MessageStore, MessagingPlatform};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::{handlers, outbound, webhook};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub store: Arc<dyn MessageStore>,
    pub platform: Arc<dyn MessagingPlatform>,
    pub blob: Arc<dyn BlobStore>,
    pub config: Arc<ChatdeskConfig>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(
        store: Arc<dyn MessageStore>,
        platform: Arc<dyn MessagingPlatform>,
        blob: Arc<dyn BlobStore>,
        config: ChatdeskConfig,
    ) -> Self {
        Self {
            store,
            platform,
            blob,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    fn auth(&self) -> AuthConfig {
        AuthConfig {
            bearer_token: self.config.server.api_token.clone(),
        }
    }
}

/// Build the application router.
///
/// - POST /webhook (signature-authenticated)
/// - GET /health
/// - GET|POST /messages, GET /users/{userId}, GET /profile,
///   POST /upload/init, POST /upload (bearer token when configured)
pub fn build_router(state: GatewayState) -> Router {
    let auth = state.auth();
    let body_limit = state.config.server.body_limit;

    let public_routes = Router::new()
        .route("/webhook", post(webhook::post_webhook))
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let operator_routes = Router::new()
        .route(
            "/messages",
            get(handlers::get_messages).post(outbound::post_message),
        )
        .route("/users/{user_id}", get(handlers::get_user_profile))
        .route("/profile", get(handlers::get_bot_profile))
        .route("/upload/init", post(handlers::post_upload_init))
        .route("/upload", post(handlers::post_upload))
        .route_layer(axum_middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(operator_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `server.host:server.port` and serve until `shutdown` is cancelled.
///
/// In-flight requests are allowed to finish after cancellation.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ChatdeskError> {
    if config.api_token.is_none() {
        tracing::warn!("server.api_token is not set; operator routes are unauthenticated");
    }
    if state.config.line.channel_secret.is_empty() {
        tracing::error!("line.channel_secret is not set; every webhook delivery will be rejected");
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ChatdeskError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ChatdeskError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
