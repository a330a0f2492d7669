// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Path grammar, field access, token decoding, digests, the cache contract
//! and the decision vocabulary. Nothing here performs network I/O.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer

pub mod path;
pub mod document;
pub mod token;
pub mod request;
pub mod rules;
pub mod accessor;
pub mod digest;
pub mod cache;
pub mod decision;
pub mod filter_config;
