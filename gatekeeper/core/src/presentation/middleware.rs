// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Decision Middleware
//!
//! Puts a decision filter in front of any axum router:
//!
//! ```ignore
//! let filter = DecisionFilter::from_manifest(&manifest)?;
//! let app = Router::new()
//!     .route("/orders", post(create_order))
//!     .layer(axum::middleware::from_fn_with_state(filter, decision_middleware));
//! ```
//!
//! | Outcome                   | Response                                   |
//! |---------------------------|--------------------------------------------|
//! | allowed                   | rewritten request continues downstream     |
//! | denied                    | `401 {"error": ...}`                       |
//! | error, key validation     | `401 {"error": <reason>}`                  |
//! | error, policy             | `500 {"error": <reason>}`                  |
//! | body over the size limit  | `413 {"error": ...}`                       |
//! | body unreadable           | `400 {"error": ...}`                       |
//!
//! A manifest without a decision mode yields a claims-only filter: claim
//! mappings run on every call and nothing is ever denied.
//!
//! # Architecture
//!
//! - **Layer:** Presentation Layer
//! - **Purpose:** Adapt axum requests to the decision client and render outcomes

use std::error::Error as StdError;
use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http_body_util::LengthLimitError;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::application::claim_mapper::ClaimMapper;
use crate::application::decision_client::DecisionClient;
use crate::application::filter_factory;
use crate::domain::decision::{DecisionError, DecisionMode, Outcome};
use crate::domain::filter_config::FilterConfigManifest;

/// Largest body buffered for inspection.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// One configured filter instance, cheap to clone into router state.
#[derive(Clone)]
pub struct DecisionFilter {
    client: Option<Arc<DecisionClient>>,
    claims: Arc<ClaimMapper>,
    body_limit: usize,
}

impl DecisionFilter {
    pub fn new(client: DecisionClient, claims: ClaimMapper) -> Self {
        Self {
            client: Some(Arc::new(client)),
            claims: Arc::new(claims),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// A filter that only copies token claims into the request.
    pub fn claims_only(claims: ClaimMapper) -> Self {
        Self {
            client: None,
            claims: Arc::new(claims),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Build the filter from a manifest. The HTTP decision service is only
    /// created when the manifest sets a decision mode.
    pub fn from_manifest(manifest: &FilterConfigManifest) -> anyhow::Result<Self> {
        let claims = filter_factory::create_claim_mapper(manifest)?;
        match filter_factory::create_optional_decision_client(manifest)? {
            Some(client) => Ok(Self::new(client, claims)),
            None => Ok(Self::claims_only(claims)),
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn client(&self) -> Option<&DecisionClient> {
        self.client.as_deref()
    }

    pub fn mode(&self) -> Option<&DecisionMode> {
        self.client().map(DecisionClient::mode)
    }

    /// Decide on a buffered request; on allow, also apply claim mappings.
    /// Without a decision client every request is allowed with a `null`
    /// result.
    pub async fn process(&self, request: &mut axum::http::Request<Bytes>) -> Result<Outcome, DecisionError> {
        let outcome = match self.client() {
            Some(client) => client.decide(request).await?,
            None => Outcome::Allowed(Value::Null),
        };
        if outcome.is_allowed() && !self.claims.is_empty() {
            let mapped = self.claims.apply(request);
            debug!(mapped, "Applied claim mappings");
        }
        Ok(outcome)
    }

    fn denial(&self) -> Response {
        let message = match self.mode() {
            Some(DecisionMode::KeyValidation { .. }) => "Invalid KEY API",
            _ => "Permission Denied",
        };
        reject(StatusCode::UNAUTHORIZED, message)
    }

    fn failure(&self, err: &DecisionError) -> Response {
        let status = match self.mode() {
            Some(DecisionMode::KeyValidation { .. }) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        reject(status, &err.to_string())
    }
}

/// `axum::middleware::from_fn_with_state` entry point.
pub async fn decision_middleware(State(filter): State<DecisionFilter>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, filter.body_limit).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            warn!(limit = filter.body_limit, "Request body over the size limit");
            return reject(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
        }
        Err(e) => {
            warn!(error = %e, "Failed to buffer request body");
            return reject(StatusCode::BAD_REQUEST, "Failed to read request body");
        }
    };

    let mut buffered = axum::http::Request::from_parts(parts, bytes);
    match filter.process(&mut buffered).await {
        Ok(Outcome::Allowed(_)) => {
            let (parts, bytes) = buffered.into_parts();
            next.run(Request::from_parts(parts, Body::from(bytes))).await
        }
        Ok(Outcome::Denied) => filter.denial(),
        Err(e) => {
            let mode = filter.mode().map_or("claims", DecisionMode::name);
            error!(mode, error = %e, "Decision failed");
            filter.failure(&e)
        }
    }
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut source = Some(err as &(dyn StdError + 'static));
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
