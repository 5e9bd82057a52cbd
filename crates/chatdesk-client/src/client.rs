// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async driver around [`ChatState`].
//!
//! The state mutex is taken only for the synchronous `begin_*`/`finish_*`
//! transitions and is never held across an API call.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chatdesk_config::model::ClientConfig;
use chatdesk_core::types::UserProfile;
use chatdesk_core::{ChatdeskError, Message, PageQuery};
use tracing::{debug, warn};

use crate::api::{Draft, MessageApi};
use crate::state::{ChatState, Conversation, ConversationSummary};

/// Conversation client for one operator session.
pub struct ChatClient {
    api: Arc<dyn MessageApi>,
    state: Mutex<ChatState>,
    messages_per_page: u32,
    recent_limit: u32,
    polling_interval: Duration,
}

impl ChatClient {
    pub fn new(api: Arc<dyn MessageApi>, config: &ClientConfig) -> Self {
        Self {
            api,
            state: Mutex::new(ChatState::new(config.recent_capacity)),
            messages_per_page: config.messages_per_page,
            recent_limit: config.recent_limit,
            polling_interval: Duration::from_millis(config.polling_interval_ms),
        }
    }

    /// Interval the [`Poller`](crate::Poller) should use for this client.
    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> R {
        // Transitions never panic midway, so a poisoned state is still consistent.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Load the newest page of a thread. No-op if loaded or loading.
    pub async fn load_initial(&self, counterpart_id: &str) -> Result<(), ChatdeskError> {
        if !self.with_state(|s| s.begin_initial(counterpart_id)) {
            return Ok(());
        }
        let query = PageQuery::for_counterpart(counterpart_id, self.messages_per_page);
        match self.api.fetch_page(&query).await {
            Ok(page) => {
                debug!(counterpart_id, count = page.messages.len(), has_more = page.has_more, "loaded thread");
                self.with_state(|s| s.finish_initial(counterpart_id, page));
                Ok(())
            }
            Err(e) => {
                warn!(counterpart_id, error = %e, "failed to load thread");
                self.with_state(|s| s.fail_load(counterpart_id));
                Err(e)
            }
        }
    }

    /// Load the page before the oldest loaded message. No-op if nothing is
    /// left or a load is in flight.
    pub async fn load_older(&self, counterpart_id: &str) -> Result<(), ChatdeskError> {
        let Some(cursor) = self.with_state(|s| s.begin_older(counterpart_id)) else {
            return Ok(());
        };
        let query =
            PageQuery::for_counterpart(counterpart_id, self.messages_per_page).before(cursor);
        match self.api.fetch_page(&query).await {
            Ok(page) => {
                debug!(counterpart_id, count = page.messages.len(), has_more = page.has_more, "loaded older messages");
                self.with_state(|s| s.finish_older(counterpart_id, page));
                Ok(())
            }
            Err(e) => {
                warn!(counterpart_id, error = %e, "failed to load older messages");
                self.with_state(|s| s.fail_load(counterpart_id));
                Err(e)
            }
        }
    }

    /// Merge a sent message into local state. Returns false if already present.
    pub fn record_send(&self, message: Message) -> bool {
        self.with_state(|s| s.record_send(message))
    }

    /// Send through the gateway, then record the result optimistically.
    pub async fn send(&self, counterpart_id: &str, draft: Draft) -> Result<Message, ChatdeskError> {
        let message = self.api.send(counterpart_id, &draft).await?;
        self.record_send(message.clone());
        Ok(message)
    }

    /// Refresh the cross-counterpart recent feed.
    pub async fn poll_recent(&self) -> Result<(), ChatdeskError> {
        let page = self
            .api
            .fetch_page(&PageQuery::recent(self.recent_limit))
            .await?;
        let limit = self.recent_limit as usize;
        self.with_state(|s| s.apply_poll(page.messages, limit));
        Ok(())
    }

    /// Fetch a counterpart's profile once and cache it.
    ///
    /// Returns the cached profile without a request when one exists, and
    /// `None` while another call for the same counterpart is in flight.
    pub async fn fetch_profile(
        &self,
        counterpart_id: &str,
    ) -> Result<Option<UserProfile>, ChatdeskError> {
        let should_fetch = self.with_state(|s| s.begin_profile(counterpart_id));
        if !should_fetch {
            return Ok(self.profile(counterpart_id));
        }
        match self.api.fetch_profile(counterpart_id).await {
            Ok(profile) => {
                self.with_state(|s| s.finish_profile(counterpart_id, Some(profile.clone())));
                Ok(Some(profile))
            }
            Err(e) => {
                warn!(counterpart_id, error = %e, "failed to fetch profile");
                self.with_state(|s| s.finish_profile(counterpart_id, None));
                Err(e)
            }
        }
    }

    pub fn profile(&self, counterpart_id: &str) -> Option<UserProfile> {
        self.with_state(|s| s.profile(counterpart_id).cloned())
    }

    pub fn conversation_list(&self) -> Vec<ConversationSummary> {
        self.with_state(|s| s.conversation_list())
    }

    pub fn conversation(&self, counterpart_id: &str) -> Conversation {
        self.with_state(|s| s.conversation(counterpart_id))
    }

    pub fn recent_messages(&self) -> Vec<Message> {
        self.with_state(|s| s.recent_messages().to_vec())
    }

    pub fn select(&self, counterpart_id: Option<&str>) {
        self.with_state(|s| s.select(counterpart_id.map(str::to_string)));
    }

    pub fn selected(&self) -> Option<String> {
        self.with_state(|s| s.selected().map(str::to_string))
    }
}
