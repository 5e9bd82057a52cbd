// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatdesk serve`: wire the adapters into the gateway and run until a
//! shutdown signal arrives.

use std::sync::Arc;

use chatdesk_blob::SupabaseBlobStore;
use chatdesk_config::ChatdeskConfig;
use chatdesk_core::{ChatdeskError, HealthStatus, MessageStore, PluginAdapter};
use chatdesk_gateway::{GatewayState, start_server};
use chatdesk_line::LineClient;
use chatdesk_storage::SqliteStorage;
use tracing::{error, info, warn};

use crate::shutdown;

pub async fn run_serve(config: ChatdeskConfig) -> Result<(), ChatdeskError> {
    init_tracing(&config.app.log_level);
    info!(app = %config.app.name, version = env!("CARGO_PKG_VERSION"), "starting chatdesk");

    let store = Arc::new(SqliteStorage::new(config.storage.clone()));
    store.initialize().await?;

    let platform =
        Arc::new(LineClient::new(&config.line)?.with_max_content_bytes(config.blob.max_file_size));
    let blob = Arc::new(SupabaseBlobStore::new(&config.blob)?);

    let adapters: [&dyn PluginAdapter; 3] = [store.as_ref(), platform.as_ref(), blob.as_ref()];
    for adapter in adapters {
        report_health(adapter).await;
    }

    let cancel = shutdown::install_signal_handler();
    let server_config = config.server.clone();
    let state = GatewayState::new(store.clone(), platform.clone(), blob.clone(), config);

    let served = start_server(&server_config, state, cancel).await;

    // The store checkpoints its WAL on shutdown.
    for adapter in adapters {
        if let Err(e) = adapter.shutdown().await {
            warn!(adapter = adapter.name(), error = %e, "adapter shutdown failed");
        }
    }

    served?;
    info!("chatdesk serve shutdown complete");
    Ok(())
}

async fn report_health(adapter: &dyn PluginAdapter) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => {
            info!(adapter = adapter.name(), kind = %adapter.adapter_type(), "adapter ready");
        }
        Ok(HealthStatus::Degraded(reason)) => {
            warn!(adapter = adapter.name(), kind = %adapter.adapter_type(), %reason, "adapter degraded");
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            error!(adapter = adapter.name(), kind = %adapter.adapter_type(), %reason, "adapter unhealthy");
        }
        Err(e) => {
            error!(adapter = adapter.name(), error = %e, "adapter health check failed");
        }
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chatdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
