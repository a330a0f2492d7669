// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP Decision Service
//!
//! POST-JSON client for a remote policy engine or key-validation service.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Implement [`DecisionService`] over HTTP
//! - **Integration:** Decision client → HTTP POST → policy engine / key authority
//!
//! The URL is `<address><base_path>[/<route>]`. A 2xx JSON response is
//! returned as-is; anything else becomes [`DecisionError::Remote`] carrying
//! the response text. No retries are attempted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::domain::decision::{DecisionError, DecisionService};

pub struct HttpDecisionService {
    address: String,
    base_path: String,
    client: Client,
}

impl HttpDecisionService {
    /// Create a client; `timeout` bounds every round-trip.
    pub fn new(
        address: impl Into<String>,
        base_path: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DecisionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DecisionError::Remote(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            address: address.into(),
            base_path: base_path.into(),
            client,
        })
    }

    /// Full URL for `route`.
    pub fn endpoint(&self, route: Option<&str>) -> String {
        let base = format!("{}{}", self.address.trim_end_matches('/'), self.base_path);
        match route {
            Some(route) => format!("{}/{}", base.trim_end_matches('/'), route.trim_start_matches('/')),
            None => base,
        }
    }
}

#[async_trait]
impl DecisionService for HttpDecisionService {
    async fn query(&self, route: Option<&str>, input: &Value) -> Result<Value, DecisionError> {
        let url = self.endpoint(route);
        debug!(url = %url, "Querying decision service");

        let response = self
            .client
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(|e| DecisionError::Remote(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DecisionError::Remote(format!("Failed to read response from {}: {}", url, e)))?;

        if !status.is_success() {
            return Err(DecisionError::Remote(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| DecisionError::Remote(format!("Invalid JSON from {}: {}", url, e)))
    }
}
