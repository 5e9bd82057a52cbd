// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation state.
//!
//! [`ChatState`] holds no I/O. Every network-backed operation in
//! [`ChatClient`](crate::ChatClient) is split into a `begin_*` transition that
//! decides whether to fetch and a `finish_*`/`fail_*` transition that applies
//! the result, so the state is never locked across a request.
//!
//! All merges are keyed by message id. Responses can therefore arrive in any
//! order without duplicating entries; only [`ChatState::apply_poll`] replaces
//! data wholesale, and it re-applies sends the server has not returned yet.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use chatdesk_core::types::{UserProfile, avatar_url};
use chatdesk_core::{Cursor, Message, Page};

/// Default bound on [`ChatState::recent_messages`].
pub const DEFAULT_RECENT_CAPACITY: usize = 200;

/// Sidebar entry for one counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub counterpart_id: String,
    pub last_message: Message,
    pub profile: Option<UserProfile>,
}

impl ConversationSummary {
    /// Profile display name, falling back to the counterpart id.
    pub fn display_name(&self) -> &str {
        self.profile
            .as_ref()
            .map(|p| p.display_name.as_str())
            .unwrap_or(&self.counterpart_id)
    }

    pub fn avatar_url(&self) -> String {
        avatar_url(
            &self.counterpart_id,
            self.profile.as_ref().and_then(|p| p.picture_url.as_deref()),
        )
    }
}

/// One open thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub counterpart_id: String,
    /// Ascending by `(timestamp, id)`.
    pub messages: Vec<Message>,
    pub has_more: bool,
    pub loading: bool,
    pub profile: Option<UserProfile>,
}

impl Conversation {
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[derive(Debug, Clone)]
pub struct ChatState {
    messages_by_counterpart: HashMap<String, Vec<Message>>,
    /// A key is present once the first page of that counterpart arrived.
    has_more_by_counterpart: HashMap<String, bool>,
    loading_by_counterpart: HashSet<String>,
    /// Most recent first.
    recent_messages: Vec<Message>,
    recent_capacity: usize,
    profiles: HashMap<String, UserProfile>,
    profile_loading: HashSet<String>,
    /// Optimistic sends not yet seen in a poll, by id.
    pending_sends: HashMap<String, Message>,
    selected_counterpart: Option<String>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_CAPACITY)
    }
}

impl ChatState {
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            messages_by_counterpart: HashMap::new(),
            has_more_by_counterpart: HashMap::new(),
            loading_by_counterpart: HashSet::new(),
            recent_messages: Vec::new(),
            recent_capacity: recent_capacity.max(1),
            profiles: HashMap::new(),
            profile_loading: HashSet::new(),
            pending_sends: HashMap::new(),
            selected_counterpart: None,
        }
    }

    pub fn is_loaded(&self, counterpart_id: &str) -> bool {
        self.has_more_by_counterpart.contains_key(counterpart_id)
    }

    pub fn is_loading(&self, counterpart_id: &str) -> bool {
        self.loading_by_counterpart.contains(counterpart_id)
    }

    /// Whether older pages remain. False until the first page is loaded.
    pub fn has_more(&self, counterpart_id: &str) -> bool {
        self.has_more_by_counterpart
            .get(counterpart_id)
            .copied()
            .unwrap_or(false)
    }

    /// Loaded messages of a counterpart, ascending.
    pub fn messages(&self, counterpart_id: &str) -> &[Message] {
        self.messages_by_counterpart
            .get(counterpart_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cross-counterpart feed, most recent first.
    pub fn recent_messages(&self) -> &[Message] {
        &self.recent_messages
    }

    pub fn pending_sends(&self) -> usize {
        self.pending_sends.len()
    }

    // --- paging ---

    /// Mark the first page as loading. Returns false if it is already loaded
    /// or in flight, in which case nothing should be fetched.
    pub fn begin_initial(&mut self, counterpart_id: &str) -> bool {
        if self.is_loaded(counterpart_id) || self.is_loading(counterpart_id) {
            return false;
        }
        self.loading_by_counterpart
            .insert(counterpart_id.to_string());
        true
    }

    pub fn finish_initial(&mut self, counterpart_id: &str, page: Page) {
        self.merge_thread(counterpart_id, page.messages);
        self.has_more_by_counterpart
            .insert(counterpart_id.to_string(), page.has_more);
        self.loading_by_counterpart.remove(counterpart_id);
    }

    /// Mark an older page as loading and return the cursor to fetch before.
    ///
    /// `None` when there is nothing more to load or a load is in flight.
    pub fn begin_older(&mut self, counterpart_id: &str) -> Option<Cursor> {
        if !self.has_more(counterpart_id) || self.is_loading(counterpart_id) {
            return None;
        }
        let cursor = self.messages(counterpart_id).first()?.cursor();
        self.loading_by_counterpart
            .insert(counterpart_id.to_string());
        Some(cursor)
    }

    pub fn finish_older(&mut self, counterpart_id: &str, page: Page) {
        self.merge_thread(counterpart_id, page.messages);
        self.has_more_by_counterpart
            .insert(counterpart_id.to_string(), page.has_more);
        self.loading_by_counterpart.remove(counterpart_id);
    }

    /// A page request failed. Only the loading flag changes.
    pub fn fail_load(&mut self, counterpart_id: &str) {
        self.loading_by_counterpart.remove(counterpart_id);
    }

    // --- sends and polling ---

    /// Optimistically add a message the operator just sent.
    ///
    /// Returns false if the id was already known everywhere, e.g. because a
    /// poll delivered it before the send response did.
    pub fn record_send(&mut self, message: Message) -> bool {
        let in_recent = self.recent_messages.iter().any(|m| m.id == message.id);
        let in_thread = self
            .messages(&message.counterpart_id)
            .iter()
            .any(|m| m.id == message.id);
        if in_recent && in_thread {
            return false;
        }

        if !in_thread {
            let thread = self
                .messages_by_counterpart
                .entry(message.counterpart_id.clone())
                .or_default();
            insert_sorted(thread, message.clone());
        }
        if !in_recent {
            self.pending_sends.insert(message.id.clone(), message.clone());
            insert_recent(&mut self.recent_messages, message);
            self.recent_messages.truncate(self.recent_capacity);
        }
        true
    }

    /// Replace the recent feed with a fresh server page (ascending, as the
    /// read API returns it) merged with sends the server has not returned yet.
    ///
    /// `limit` is the page size that was requested. When the page is full,
    /// pending sends older than all of it have scrolled out of the window
    /// and are forgotten.
    pub fn apply_poll(&mut self, page: Vec<Message>, limit: usize) {
        let mut seen = HashSet::with_capacity(page.len());
        let mut recent: Vec<Message> = page
            .into_iter()
            .rev()
            .filter(|m| seen.insert(m.id.clone()))
            .collect();

        self.pending_sends.retain(|id, _| !seen.contains(id));
        if limit > 0
            && recent.len() >= limit
            && let Some(oldest) = recent.last()
        {
            let floor = oldest.sort_key();
            self.pending_sends.retain(|_, m| m.sort_key() > floor);
        }

        for message in &recent {
            if let Some(thread) = self.messages_by_counterpart.get_mut(&message.counterpart_id)
                && !thread.iter().any(|m| m.id == message.id)
            {
                insert_sorted(thread, message.clone());
            }
        }

        recent.extend(self.pending_sends.values().cloned());
        recent.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
        recent.truncate(self.recent_capacity);
        self.recent_messages = recent;
    }

    // --- profiles ---

    pub fn profile(&self, counterpart_id: &str) -> Option<&UserProfile> {
        self.profiles.get(counterpart_id)
    }

    /// Returns true if the profile should be fetched now.
    pub fn begin_profile(&mut self, counterpart_id: &str) -> bool {
        if self.profiles.contains_key(counterpart_id) || self.profile_loading.contains(counterpart_id)
        {
            return false;
        }
        self.profile_loading.insert(counterpart_id.to_string());
        true
    }

    /// Store a fetched profile, or clear the in-flight flag on failure so a
    /// later call may retry.
    pub fn finish_profile(&mut self, counterpart_id: &str, profile: Option<UserProfile>) {
        self.profile_loading.remove(counterpart_id);
        if let Some(profile) = profile {
            self.profiles.insert(counterpart_id.to_string(), profile);
        }
    }

    // --- selection and derived views ---

    pub fn select(&mut self, counterpart_id: Option<String>) {
        self.selected_counterpart = counterpart_id;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected_counterpart.as_deref()
    }

    /// One entry per counterpart in the recent feed, newest activity first.
    /// Ties are ordered by counterpart id.
    pub fn conversation_list(&self) -> Vec<ConversationSummary> {
        let mut latest: HashMap<&str, &Message> = HashMap::new();
        for message in &self.recent_messages {
            latest
                .entry(message.counterpart_id.as_str())
                .and_modify(|current| {
                    if message.sort_key() > current.sort_key() {
                        *current = message;
                    }
                })
                .or_insert(message);
        }

        let mut list: Vec<ConversationSummary> = latest
            .into_iter()
            .map(|(counterpart_id, last)| ConversationSummary {
                counterpart_id: counterpart_id.to_string(),
                last_message: last.clone(),
                profile: self.profiles.get(counterpart_id).cloned(),
            })
            .collect();
        list.sort_by_key(|c| (Reverse(c.last_message.timestamp), c.counterpart_id.clone()));
        list
    }

    pub fn conversation(&self, counterpart_id: &str) -> Conversation {
        Conversation {
            counterpart_id: counterpart_id.to_string(),
            messages: self.messages(counterpart_id).to_vec(),
            has_more: self.has_more(counterpart_id),
            loading: self.is_loading(counterpart_id),
            profile: self.profiles.get(counterpart_id).cloned(),
        }
    }

    fn merge_thread(&mut self, counterpart_id: &str, incoming: Vec<Message>) {
        let thread = self
            .messages_by_counterpart
            .entry(counterpart_id.to_string())
            .or_default();
        let mut ids: HashSet<String> = thread.iter().map(|m| m.id.clone()).collect();
        for message in incoming {
            if ids.insert(message.id.clone()) {
                insert_sorted(thread, message);
            }
        }
    }
}

/// Insert keeping ascending `(timestamp, id)` order.
fn insert_sorted(thread: &mut Vec<Message>, message: Message) {
    let at = thread.partition_point(|m| m.sort_key() < message.sort_key());
    thread.insert(at, message);
}

/// Insert keeping descending `(timestamp, id)` order.
fn insert_recent(recent: &mut Vec<Message>, message: Message) {
    let at = recent.partition_point(|m| m.sort_key() > message.sort_key());
    recent.insert(at, message);
}
