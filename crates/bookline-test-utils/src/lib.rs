// SPDX-FileCopyrightText: 2026 Bookline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Bookline integration testing.

pub mod harness;

pub use harness::InboxHarness;
