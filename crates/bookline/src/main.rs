// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bookline -- operator triage for automated SMS booking conversations.
//!
//! This is the binary entry point for the Bookline service.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod config_cmd;
mod serve;
mod status;

/// Bookline -- operator triage for automated SMS booking conversations.
#[derive(Parser, Debug)]
#[command(name = "bookline", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Bookline inbox service.
    Serve,
    /// Check whether a running service is healthy.
    Status {
        /// Emit machine-readable JSON instead of formatted text.
        #[arg(long)]
        json: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Print the resolved configuration (secrets redacted).
    Config {
        /// Only validate; print nothing on success.
        #[arg(long)]
        check: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match bookline_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            bookline_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) | None => serve::run_serve(config).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Config { check }) => config_cmd::run_config(&config, check),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
