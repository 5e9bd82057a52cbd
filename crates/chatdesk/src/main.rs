// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatdesk - chat desk backend for a LINE Official Account.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;

use std::path::PathBuf;
use std::process::ExitCode;

use chatdesk_config::{ChatdeskConfig, ConfigError};
use clap::{Parser, Subcommand};

/// Chatdesk - chat desk backend for a LINE Official Account.
#[derive(Parser, Debug)]
#[command(name = "chatdesk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Load and validate configuration, then exit.
    CheckConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<ChatdeskConfig, Vec<ConfigError>> {
    match path {
        Some(path) => chatdesk_config::load_and_validate_path(path),
        None => chatdesk_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            chatdesk_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::CheckConfig => {
            println!(
                "chatdesk: configuration OK (app.name={}, listen={}:{})",
                config.app.name, config.server.host, config.server.port
            );
            ExitCode::SUCCESS
        }
        Commands::Serve => match serve::run_serve(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("chatdesk: {e}");
                ExitCode::FAILURE
            }
        },
    }
}
