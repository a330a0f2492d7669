// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Request View
//!
//! The read/write surface the field accessor works against. The gateway
//! glue implements it for its own request type; the accessor never sees
//! connections, TLS or routing.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Port between the field accessor and the host request type

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),
}

/// A live, mutable inbound call.
pub trait RequestView: Send {
    fn method(&self) -> &str;

    /// URL path without the query string.
    fn path(&self) -> &str;

    /// Raw query string without the leading `?`, if any.
    fn query(&self) -> Option<&str>;

    fn set_query(&mut self, query: &str) -> Result<(), RequestError>;

    /// Every value stored for `name`, in insertion order.
    fn header_values(&self, name: &str) -> Vec<String>;

    /// The whole header table as `(name, value)` pairs. Multi-valued
    /// headers appear once per value.
    fn header_pairs(&self) -> Vec<(String, String)>;

    /// Set `name` to a single `value`, replacing anything stored before.
    fn set_header(&mut self, name: &str, value: &str) -> Result<(), RequestError>;

    fn body(&self) -> &[u8];

    /// Replace the body and keep any length metadata in step with it.
    fn replace_body(&mut self, body: Vec<u8>);
}
