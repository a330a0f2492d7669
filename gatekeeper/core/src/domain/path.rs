// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Path Expressions
//!
//! Dotted paths that address one field of an inbound call, e.g.
//! `header.Authorization`, `query.city`, `body.name.first` or
//! `jwt.payload.sub`.
//!
//! ## Grammar
//!
//! ```text
//! path     := root ( "." segment )*
//! root     := "header" | "query" | "body" | "jwt"      (case-insensitive)
//! jwt path := "jwt" "." ( "header" | "payload" ) ( "." segment )*
//!           | "jwt" "." "raw"
//! ```
//!
//! A trailing `raw` segment directly after a simple root (or `jwt.raw`)
//! addresses the whole source rather than a field called `raw`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Parse and represent field addresses; no I/O

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reserved segment meaning "the entire source".
pub const RAW_SEGMENT: &str = "raw";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Malformed path '{path}': {reason}")]
    Malformed { path: String, reason: String },

    #[error("Path '{0}' cannot be used as an injection target")]
    NotInjectable(String),
}

impl PathError {
    fn malformed(path: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Which part of a compact token a `jwt.*` path reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSection {
    Header,
    Payload,
    /// The compact token itself, without the scheme prefix.
    Raw,
}

/// Root of a path expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Header,
    Query,
    Body,
    Token(TokenSection),
}

impl Source {
    pub fn is_token(&self) -> bool {
        matches!(self, Source::Token(_))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Header => write!(f, "header"),
            Source::Query => write!(f, "query"),
            Source::Body => write!(f, "body"),
            Source::Token(TokenSection::Header) => write!(f, "jwt.header"),
            Source::Token(TokenSection::Payload) => write!(f, "jwt.payload"),
            Source::Token(TokenSection::Raw) => write!(f, "jwt.raw"),
        }
    }
}

/// A parsed, validated dotted path.
///
/// `fields` holds the segments that follow the root (and, for tokens, the
/// sub-root). They are kept verbatim; only the root and sub-root are
/// matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathExpression {
    raw: String,
    source: Source,
    fields: Vec<String>,
}

impl PathExpression {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::malformed(raw, "path is empty"));
        }

        let segments: Vec<&str> = raw.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(PathError::malformed(raw, "path contains an empty segment"));
        }

        let (source, rest) = match segments[0].to_ascii_lowercase().as_str() {
            "header" => (Source::Header, &segments[1..]),
            "query" => (Source::Query, &segments[1..]),
            "body" => (Source::Body, &segments[1..]),
            "jwt" => {
                let Some(sub_root) = segments.get(1) else {
                    return Err(PathError::malformed(raw, "missing token sub-root"));
                };
                let section = match sub_root.to_ascii_lowercase().as_str() {
                    "header" => TokenSection::Header,
                    "payload" => TokenSection::Payload,
                    RAW_SEGMENT => TokenSection::Raw,
                    other => {
                        return Err(PathError::malformed(
                            raw,
                            format!("unknown token sub-root '{}'", other),
                        ))
                    }
                };
                if section == TokenSection::Raw && segments.len() > 2 {
                    return Err(PathError::malformed(raw, "jwt.raw takes no further segments"));
                }
                (Source::Token(section), &segments[2..])
            }
            other => {
                return Err(PathError::malformed(raw, format!("unknown root '{}'", other)));
            }
        };

        Ok(Self {
            raw: raw.to_string(),
            source,
            fields: rest.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Parse a path that will be written to, rejecting roots and shapes
    /// that cannot be injected into.
    pub fn parse_target(raw: &str) -> Result<Self, PathError> {
        let path = Self::parse(raw)?;
        if path.source.is_token() || path.fields.is_empty() || path.is_raw() {
            return Err(PathError::NotInjectable(raw.to_string()));
        }
        Ok(path)
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field segments joined back with `.`, used for header and query
    /// names that themselves contain dots.
    pub fn field_name(&self) -> String {
        self.fields.join(".")
    }

    /// True when the path addresses the whole source.
    pub fn is_raw(&self) -> bool {
        match self.source {
            Source::Token(TokenSection::Raw) => true,
            Source::Token(_) => false,
            _ => self.fields.len() == 1 && self.fields[0] == RAW_SEGMENT,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for PathExpression {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
