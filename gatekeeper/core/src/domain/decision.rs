// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Decision
//!
//! What the remote decision service is asked, how its answer is read, and
//! the outcome handed back to the gateway glue.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Decision modes, outcomes and the decision service port

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::accessor::AccessError;
use crate::domain::document;
use crate::domain::rules::FieldMap;

pub const DEFAULT_POLICY_BASE_PATH: &str = "/v1/data/";
pub const DEFAULT_KEY_BASE_PATH: &str = "/v1/auth/key";
pub const DEFAULT_DIRECTIVE: &str = "allow";
pub const DEFAULT_RESPONSE_PATH: &str = "result";
/// Header the validated key identity is written to unless configured otherwise.
pub const KEY_ID_HEADER: &str = "X-KeyID";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("Missing required input '{field}': {reason}")]
    MissingInput { field: String, reason: String },

    #[error("Decision service error: {0}")]
    Remote(String),

    #[error("Unexpected decision result at '{path}': expected {expected}, got {found}")]
    UnexpectedResult {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Access(AccessError),
}

impl From<AccessError> for DecisionError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::MissingRequired { field, reason } => DecisionError::MissingInput { field, reason },
            other => DecisionError::Access(other),
        }
    }
}

/// Remote authority answering decision queries.
#[async_trait]
pub trait DecisionService: Send + Sync {
    /// POST `input` to the service. `route` is appended to the configured
    /// base path when present.
    async fn query(&self, route: Option<&str>, input: &Value) -> Result<Value, DecisionError>;
}

/// How decisions are asked for and read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionMode {
    /// Allow/deny from a policy engine. The answer is a boolean `result`.
    Policy { package: String, directive: String },
    /// Identity lookup for an API key. The answer is the value at
    /// `response_path`; an empty answer denies.
    KeyValidation { response_path: String },
}

impl DecisionMode {
    pub fn policy(package: impl Into<String>) -> Self {
        DecisionMode::Policy {
            package: package.into(),
            directive: DEFAULT_DIRECTIVE.to_string(),
        }
    }

    pub fn key_validation() -> Self {
        DecisionMode::KeyValidation {
            response_path: DEFAULT_RESPONSE_PATH.to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DecisionMode::Policy { .. } => "policy",
            DecisionMode::KeyValidation { .. } => "key_validation",
        }
    }

    pub fn default_base_path(&self) -> &'static str {
        match self {
            DecisionMode::Policy { .. } => DEFAULT_POLICY_BASE_PATH,
            DecisionMode::KeyValidation { .. } => DEFAULT_KEY_BASE_PATH,
        }
    }

    /// Route below the base path: `opa.test` + `allow` → `opa/test/allow`.
    pub fn route(&self) -> Option<String> {
        match self {
            DecisionMode::Policy { package, directive } => {
                Some(format!("{}/{}", package.replace('.', "/"), directive))
            }
            DecisionMode::KeyValidation { .. } => None,
        }
    }

    /// Every extraction rule is required in key validation mode.
    pub fn requires_all_inputs(&self) -> bool {
        matches!(self, DecisionMode::KeyValidation { .. })
    }

    /// The document POSTed to the service.
    ///
    /// Policy mode wraps the fields in an `input` envelope together with the
    /// method and path segments; empty members are left out. Key validation
    /// sends the fields as they are.
    pub fn build_input(&self, method: &str, path: &str, fields: FieldMap) -> Value {
        match self {
            DecisionMode::KeyValidation { .. } => Value::Object(fields),
            DecisionMode::Policy { .. } => {
                let mut input = Map::new();
                if !method.is_empty() {
                    input.insert("method".to_string(), Value::String(method.to_string()));
                }
                let segments: Vec<Value> = path
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(|s| Value::String(s.to_string()))
                    .collect();
                if !segments.is_empty() {
                    input.insert("path".to_string(), Value::Array(segments));
                }
                if !fields.is_empty() {
                    input.insert("payload".to_string(), Value::Object(fields));
                }

                let mut envelope = Map::new();
                envelope.insert("input".to_string(), Value::Object(input));
                Value::Object(envelope)
            }
        }
    }

    /// Read the decision value out of a service response.
    ///
    /// # Errors
    ///
    /// [`DecisionError::UnexpectedResult`] when the value has the wrong kind.
    pub fn resolve(&self, response: &Value) -> Result<Value, DecisionError> {
        match self {
            DecisionMode::Policy { .. } => {
                match document::lookup_dotted(response, DEFAULT_RESPONSE_PATH) {
                    None | Some(Value::Null) => Ok(Value::Bool(false)),
                    Some(Value::Bool(allowed)) => Ok(Value::Bool(*allowed)),
                    Some(other) => Err(DecisionError::UnexpectedResult {
                        path: DEFAULT_RESPONSE_PATH.to_string(),
                        expected: "boolean",
                        found: kind_of(other),
                    }),
                }
            }
            DecisionMode::KeyValidation { response_path } => {
                match document::lookup_dotted(response, response_path) {
                    None | Some(Value::Null) => Ok(Value::Null),
                    Some(Value::String(id)) => Ok(Value::String(id.clone())),
                    Some(Value::Number(n)) => Ok(Value::String(n.to_string())),
                    Some(other) => Err(DecisionError::UnexpectedResult {
                        path: response_path.clone(),
                        expected: "string",
                        found: kind_of(other),
                    }),
                }
            }
        }
    }
}

/// A resolved decision, as cached.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// The value read by [`DecisionMode::resolve`].
    pub result: Value,
    /// The full service response, for field injections.
    pub response: Value,
}

impl Decision {
    /// `true`, or a non-empty identity string.
    pub fn permits(&self) -> bool {
        match &self.result {
            Value::Bool(allowed) => *allowed,
            Value::String(id) => !id.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Carries the decision value that was injected.
    Allowed(Value),
    Denied,
}

impl Outcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Outcome::Allowed(_))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
