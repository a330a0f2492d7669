// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Gatekeeper Core
//!
//! Request-time decision filter: extracts fields from an inbound call,
//! asks a remote decision service about them (through a content-addressed
//! cache) and writes the answer back into the call.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Library root; re-exports the domain layer

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
