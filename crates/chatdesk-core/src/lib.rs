// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for chatdesk.
//!
//! This crate provides the message model, error type, and the adapter traits
//! for the three external collaborators: the message store, the messaging
//! platform, and object storage.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{AuthenticityError, ChatdeskError};
pub use types::{
    AdapterType, Cursor, Direction, HealthStatus, IMAGE_PLACEHOLDER, Insertion, Message,
    MessageBody, MessageKind, Page, PageQuery,
};

pub use traits::{BlobStore, MessageStore, MessagingPlatform, PluginAdapter};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_type_round_trips_through_strings() {
        use std::str::FromStr;

        for variant in [AdapterType::Store, AdapterType::Platform, AdapterType::Blob] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        let healthy = HealthStatus::Healthy;
        assert_ne!(HealthStatus::Degraded("slow".into()), healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), healthy);
    }

    #[test]
    fn now_millis_is_after_2020() {
        assert!(now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_store<T: MessageStore>() {}
        fn _assert_platform<T: MessagingPlatform>() {}
        fn _assert_blob<T: BlobStore>() {}
    }
}
