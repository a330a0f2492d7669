// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! [`RequestView`] for a buffered `http::Request`.
//!
//! Header lookup goes through `http::HeaderMap`, so names match
//! case-insensitively and `header.raw` reports them lower-cased.

use axum::http::header::{HeaderName, HeaderValue, CONTENT_LENGTH};
use axum::http::uri::{PathAndQuery, Uri};
use axum::http::Request;
use bytes::Bytes;

use crate::domain::request::{RequestError, RequestView};

impl RequestView for Request<Bytes> {
    fn method(&self) -> &str {
        Request::method(self).as_str()
    }

    fn path(&self) -> &str {
        self.uri().path()
    }

    fn query(&self) -> Option<&str> {
        self.uri().query()
    }

    fn set_query(&mut self, query: &str) -> Result<(), RequestError> {
        let path_and_query = if query.is_empty() {
            self.uri().path().to_string()
        } else {
            format!("{}?{}", self.uri().path(), query)
        };

        let mut parts = self.uri().clone().into_parts();
        parts.path_and_query =
            Some(PathAndQuery::try_from(path_and_query).map_err(|e| RequestError::InvalidQuery(e.to_string()))?);
        *self.uri_mut() = Uri::from_parts(parts).map_err(|e| RequestError::InvalidQuery(e.to_string()))?;
        Ok(())
    }

    fn header_values(&self, name: &str) -> Vec<String> {
        self.headers()
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect()
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), RequestError> {
        let invalid = |reason: String| RequestError::InvalidHeader {
            name: name.to_string(),
            reason,
        };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        self.headers_mut().insert(header_name, header_value);
        Ok(())
    }

    fn body(&self) -> &[u8] {
        Request::body(self).as_ref()
    }

    fn replace_body(&mut self, body: Vec<u8>) {
        let length = HeaderValue::from(body.len());
        *self.body_mut() = Bytes::from(body);
        self.headers_mut().insert(CONTENT_LENGTH, length);
    }
}
