// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Compact Token Decoding
//!
//! Splits an `Authorization` header value of the form
//! `<scheme> <header>.<payload>.<signature>` and decodes the header and
//! payload segments into JSON claim maps.
//!
//! ## Security
//!
//! This is **not** token verification. The signature segment is never
//! inspected and no expiry, issuer or audience checks are made. Claims read
//! here are only as trustworthy as whatever verified the token upstream.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::document;
use crate::domain::path::TokenSection;

/// Header the token is read from.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

// Segments are unpadded base64url; tolerate padding from sloppy issuers.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("No bearer token present")]
    Missing,

    #[error("Token malformed: {0}")]
    Malformed(String),
}

/// Decoded, unverified claims of one compact token.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    raw: String,
    header: Value,
    payload: Value,
}

impl TokenClaims {
    /// Decode the value of an `Authorization` header.
    ///
    /// # Errors
    ///
    /// [`TokenError::Malformed`] when the scheme prefix is missing, the token
    /// does not have exactly three segments, or the header/payload segment
    /// is not base64url-encoded JSON object text.
    pub fn decode(header_value: &str) -> Result<Self, TokenError> {
        let value = header_value.trim();
        let (scheme, token) = value
            .split_once(' ')
            .ok_or_else(|| TokenError::Malformed("missing authorization scheme".to_string()))?;
        if scheme.is_empty() {
            return Err(TokenError::Malformed("missing authorization scheme".to_string()));
        }

        let token = token.trim();
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(TokenError::Malformed(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        }

        Ok(Self {
            raw: token.to_string(),
            header: decode_segment(segments[0], "header")?,
            payload: decode_segment(segments[1], "payload")?,
        })
    }

    /// The compact token without its scheme prefix.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn header(&self) -> &Value {
        &self.header
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Look up a claim. An empty `fields` slice returns the whole claim map
    /// of that section; [`TokenSection::Raw`] yields the compact token.
    pub fn claim<S: AsRef<str>>(&self, section: TokenSection, fields: &[S]) -> Option<Value> {
        match section {
            TokenSection::Raw => Some(Value::String(self.raw.clone())),
            TokenSection::Header => document::lookup(&self.header, fields).cloned(),
            TokenSection::Payload => document::lookup(&self.payload, fields).cloned(),
        }
    }
}

fn decode_segment(segment: &str, name: &str) -> Result<Value, TokenError> {
    let bytes = SEGMENT_ENGINE
        .decode(segment)
        .map_err(|e| TokenError::Malformed(format!("{} segment is not base64url: {}", name, e)))?;
    let claims: Map<String, Value> = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("{} segment is not a JSON object: {}", name, e)))?;
    Ok(Value::Object(claims))
}
