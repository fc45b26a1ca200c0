// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `bookline config` command implementation.
//!
//! Prints the resolved configuration after all merge layers, with secrets
//! redacted. With `--check`, validation has already happened during load,
//! so only a confirmation is printed.

use bookline_config::model::BooklineConfig;
use bookline_core::BooklineError;

/// Run the `bookline config` command.
pub fn run_config(config: &BooklineConfig, check: bool) -> Result<(), BooklineError> {
    if check {
        println!("configuration OK");
        return Ok(());
    }

    let rendered = toml::to_string_pretty(&redacted(config))
        .map_err(|e| BooklineError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Copy of the config safe to print.
fn redacted(config: &BooklineConfig) -> BooklineConfig {
    let mut config = config.clone();
    if config.server.bearer_token.is_some() {
        config.server.bearer_token = Some("[redacted]".to_string());
    }
    config
}
