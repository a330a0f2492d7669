// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Decision Client
//!
//! Runs one decision for one inbound call:
//!
//! 1. extract the configured fields into a decision input
//! 2. digest the input into a [`CacheKey`]
//! 3. on a cache miss, ask the [`DecisionService`] and resolve its answer
//! 4. deny, or inject the answer into the call and allow
//!
//! Denials are cached exactly like allows, so a revoked permission stays
//! denied (and a granted one stays granted) until its entry expires or is
//! evicted.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Orchestrate accessor, digest, cache and remote service

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, info, warn};

use crate::domain::accessor::FieldAccessor;
use crate::domain::cache::DecisionCache;
use crate::domain::decision::{Decision, DecisionError, DecisionMode, DecisionService, Outcome};
use crate::domain::digest::CacheKey;
use crate::domain::request::RequestView;
use crate::domain::rules::{ExtractionRules, InjectionRules};

pub const DECISIONS_TOTAL: &str = "gatekeeper_decisions_total";
pub const CACHE_LOOKUPS_TOTAL: &str = "gatekeeper_decision_cache_lookups_total";

pub struct DecisionClient {
    mode: DecisionMode,
    extraction: ExtractionRules,
    injection: InjectionRules,
    cache: Arc<dyn DecisionCache<Decision>>,
    service: Arc<dyn DecisionService>,
}

impl DecisionClient {
    pub fn new(
        mode: DecisionMode,
        extraction: ExtractionRules,
        injection: InjectionRules,
        cache: Arc<dyn DecisionCache<Decision>>,
        service: Arc<dyn DecisionService>,
    ) -> Self {
        Self {
            mode,
            extraction,
            injection,
            cache,
            service,
        }
    }

    pub fn mode(&self) -> &DecisionMode {
        &self.mode
    }

    pub fn cache(&self) -> &Arc<dyn DecisionCache<Decision>> {
        &self.cache
    }

    /// Decide whether `request` may proceed, rewriting it on allow.
    ///
    /// # Errors
    ///
    /// - [`DecisionError::MissingInput`] when a required field is absent
    /// - [`DecisionError::Remote`] when the service call fails
    /// - [`DecisionError::UnexpectedResult`] when the answer has the wrong kind
    /// - [`DecisionError::Access`] when the answer cannot be written back
    pub async fn decide<R>(&self, request: &mut R) -> Result<Outcome, DecisionError>
    where
        R: RequestView + ?Sized,
    {
        let result = self.run(request).await;

        let label = match &result {
            Ok(Outcome::Allowed(_)) => "allowed",
            Ok(Outcome::Denied) => "denied",
            Err(_) => "error",
        };
        counter!(DECISIONS_TOTAL, "mode" => self.mode.name(), "outcome" => label).increment(1);

        result
    }

    async fn run<R>(&self, request: &mut R) -> Result<Outcome, DecisionError>
    where
        R: RequestView + ?Sized,
    {
        let mut accessor = FieldAccessor::new(request);

        let fields = accessor.build_extraction_set(&self.extraction)?;
        let input = {
            let view = accessor.request();
            self.mode.build_input(view.method(), view.path(), fields)
        };
        let key = CacheKey::digest(&input);

        let decision = match self.cache.get(&key) {
            Some(decision) => {
                counter!(CACHE_LOOKUPS_TOTAL, "result" => "hit").increment(1);
                debug!(key = %key, "Decision cache hit");
                decision
            }
            None => {
                counter!(CACHE_LOOKUPS_TOTAL, "result" => "miss").increment(1);
                debug!(key = %key, "Decision cache miss");

                let route = self.mode.route();
                let response = self.service.query(route.as_deref(), &input).await?;
                let result = self.mode.resolve(&response)?;
                let decision = Decision { result, response };
                self.cache.set(key, decision.clone());
                decision
            }
        };

        if !decision.permits() {
            info!(mode = self.mode.name(), "Request denied");
            return Ok(Outcome::Denied);
        }

        for rule in self.injection.iter() {
            match rule.source.resolve(&decision.result, &decision.response) {
                Some(value) => accessor.inject(&rule.target, &value)?,
                None => warn!(target_path = %rule.target, "No value to inject, skipping"),
            }
        }

        Ok(Outcome::Allowed(decision.result))
    }
}
