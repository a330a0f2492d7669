// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Claim Mapper
//!
//! Copies bearer-token claims into the request (`header.X-User ←
//! jwt.payload.name`) without consulting any decision service. Failures are
//! logged and never block the call.

use tracing::{debug, warn};

use crate::domain::accessor::FieldAccessor;
use crate::domain::path::PathExpression;
use crate::domain::request::RequestView;

#[derive(Debug, Clone, Default)]
pub struct ClaimMapper {
    mappings: Vec<(PathExpression, PathExpression)>,
}

impl ClaimMapper {
    /// `mappings` pairs an injection target with a `jwt.*` source.
    pub fn new(mappings: Vec<(PathExpression, PathExpression)>) -> Self {
        Self { mappings }
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Apply every mapping; returns how many were written.
    pub fn apply<R: RequestView + ?Sized>(&self, request: &mut R) -> usize {
        let mut accessor = FieldAccessor::new(request);
        let mut applied = 0;

        for (target, claim) in &self.mappings {
            let value = match accessor.extract(claim) {
                Ok(value) => value,
                Err(e) if e.is_not_found() => {
                    debug!(claim = %claim, "Claim not present, skipping");
                    continue;
                }
                Err(e) => {
                    warn!(claim = %claim, error = %e, "Failed to read claim");
                    continue;
                }
            };

            match accessor.inject(target, &value) {
                Ok(()) => applied += 1,
                Err(e) => warn!(target_path = %target, error = %e, "Failed to inject claim"),
            }
        }

        applied
    }
}
