// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for chatdesk integration tests.
//!
//! Provides mock adapters and a temp-SQLite harness for fast, deterministic
//! tests without a LINE channel or object storage.
//!
//! # Components
//!
//! - [`MockPlatform`] - messaging platform double with captured pushes and injectable failures
//! - [`MockBlobStore`] - in-memory object store
//! - [`TestHarness`] - config, SQLite store and both mocks wired together

pub mod harness;
pub mod mock_blob;
pub mod mock_platform;

pub use harness::TestHarness;
pub use mock_blob::MockBlobStore;
pub use mock_platform::MockPlatform;
