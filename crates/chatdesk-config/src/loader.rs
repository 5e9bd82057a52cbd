// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./chatdesk.toml` > `~/.config/chatdesk/chatdesk.toml`
//! > `/etc/chatdesk/chatdesk.toml`, with environment variable overrides via the
//! `CHATDESK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ChatdeskConfig;

/// Config sections, in the order env keys are matched against them.
const SECTIONS: &[&str] = &[
    "app",
    "server",
    "line",
    "storage",
    "blob",
    "pagination",
    "client",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chatdesk/chatdesk.toml`
/// 3. `~/.config/chatdesk/chatdesk.toml`
/// 4. `./chatdesk.toml`
/// 5. `CHATDESK_*` environment variables
pub fn load_config() -> Result<ChatdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ChatdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChatdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files searched by [`load_config`], lowest precedence first.
///
/// The user file is left out when the platform has no config directory.
pub fn standard_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/chatdesk/chatdesk.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("chatdesk").join("chatdesk.toml"));
    }
    paths.push(PathBuf::from("chatdesk.toml"));
    paths
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    let files = standard_paths()
        .into_iter()
        .fold(Figment::new(), |figment, path| figment.merge(Toml::file(path)));
    Figment::new()
        .merge(Serialized::defaults(ChatdeskConfig::default()))
        .merge(files)
        .merge(env_provider())
}

/// Environment provider mapping `CHATDESK_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `CHATDESK_LINE_CHANNEL_SECRET` must become
/// `line.channel_secret`, not `line.channel.secret`.
fn env_provider() -> Env {
    Env::prefixed("CHATDESK_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
