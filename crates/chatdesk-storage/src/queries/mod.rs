// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query functions over the [`Database`](crate::Database) handle.

pub mod messages;
