// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background polling of the recent feed.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::ChatClient;

/// Handle to a running poll loop.
///
/// The loop stops on [`Poller::stop`] or when the handle is dropped.
pub struct Poller {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Poll once immediately, then every `interval`.
    pub fn start(client: Arc<ChatClient>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    result = client.poll_recent() => {
                        if let Err(e) = result {
                            // Best effort; the next tick retries.
                            warn!(error = %e, "recent poll failed");
                        }
                    }
                }
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            debug!("poller stopped");
        });

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Start with the client's configured interval.
    pub fn start_default(client: Arc<ChatClient>) -> Self {
        let interval = client.polling_interval();
        Self::start(client, interval)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the loop and wait for it to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
