// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatdesk settings: the `ChatdeskConfig` model, where it is read from, and
//! how problems with it are reported.
//!
//! Every `load_and_validate*` entry point returns either a config that passed
//! semantic validation or the complete list of problems found, each carrying
//! the offending file contents so [`render_errors`] can point at the line.
//!
//! ```no_run
//! let config = match chatdesk_config::load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         chatdesk_config::render_errors(&errors);
//!         std::process::exit(1);
//!     }
//! };
//! println!("gateway on {}:{}", config.server.host, config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::ChatdeskConfig;

/// Standard file locations plus `CHATDESK_*` overrides.
pub fn load_and_validate() -> Result<ChatdeskConfig, Vec<ConfigError>> {
    check(loader::load_config(), || {
        loader::standard_paths()
            .iter()
            .filter_map(|path| read_source(path))
            .collect()
    })
}

/// A single file given on the command line, plus `CHATDESK_*` overrides.
pub fn load_and_validate_path(path: &Path) -> Result<ChatdeskConfig, Vec<ConfigError>> {
    check(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Inline TOML with no file or environment layers.
pub fn load_and_validate_str(toml_content: &str) -> Result<ChatdeskConfig, Vec<ConfigError>> {
    check(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validate an extracted config, or turn the extraction error into
/// diagnostics. Sources are only read when there is something to report.
fn check(
    extracted: Result<ChatdeskConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<ChatdeskConfig, Vec<ConfigError>> {
    let config = extracted.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    let name = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    Some((name.display().to_string(), content))
}
