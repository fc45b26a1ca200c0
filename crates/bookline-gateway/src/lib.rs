// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/JSON gateway for the Bookline inbox service.
//!
//! Serves the four triage operations over REST: the filtered inbox list,
//! the conversation detail projection, the booking link recovery action,
//! and the debug bundle export. Handlers depend on the [`InboxStore`] trait
//! rather than a concrete store, so they can be exercised against any
//! backend.
//!
//! [`InboxStore`]: bookline_core::InboxStore

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{build_router, start_server, GatewayState, PageLimits, ServerConfig};
