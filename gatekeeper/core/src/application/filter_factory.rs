// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Filter Factory - Application Layer
//!
//! Turns a validated [`FilterConfigManifest`] into the components of one
//! filter instance. Every instance gets its own cache.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Wire domain rules to infrastructure implementations

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::application::claim_mapper::ClaimMapper;
use crate::application::decision_client::DecisionClient;
use crate::domain::decision::{Decision, DecisionService};
use crate::domain::filter_config::FilterConfigManifest;
use crate::infrastructure::cache::build_cache;
use crate::infrastructure::http_decision_service::HttpDecisionService;

/// Creates the HTTP decision service for the manifest
pub fn create_decision_service(manifest: &FilterConfigManifest) -> anyhow::Result<Arc<dyn DecisionService>> {
    let service = manifest
        .spec
        .service
        .as_ref()
        .context("Manifest has no spec.service")?;
    let base_path = manifest.base_path().context("Manifest has no spec.mode")?;

    let client = HttpDecisionService::new(service.address.trim(), base_path, service.timeout)
        .context("Failed to create decision service client")?;
    Ok(Arc::new(client))
}

/// Creates a decision client around the given service
pub fn create_decision_client(
    manifest: &FilterConfigManifest,
    service: Arc<dyn DecisionService>,
) -> anyhow::Result<DecisionClient> {
    manifest.validate()?;

    let mode = manifest.decision_mode().context("Manifest has no spec.mode")?;
    let cache_mode = manifest.cache_mode();
    info!(
        filter = %manifest.metadata.name,
        mode = mode.name(),
        cache = %cache_mode,
        "Creating decision filter"
    );

    Ok(DecisionClient::new(
        mode,
        manifest.extraction_rules()?,
        manifest.injection_rules()?,
        build_cache::<Decision>(cache_mode),
        service,
    ))
}

/// Creates the decision client and its HTTP service, or `None` for a
/// claims-only manifest
pub fn create_optional_decision_client(manifest: &FilterConfigManifest) -> anyhow::Result<Option<DecisionClient>> {
    manifest.validate()?;

    if manifest.spec.mode.is_none() {
        info!(filter = %manifest.metadata.name, "Creating claims-only filter");
        return Ok(None);
    }

    let service = create_decision_service(manifest)?;
    create_decision_client(manifest, service).map(Some)
}

/// Creates the claim mapper; empty when the manifest maps no claims
pub fn create_claim_mapper(manifest: &FilterConfigManifest) -> anyhow::Result<ClaimMapper> {
    Ok(ClaimMapper::new(manifest.claim_mappings()?))
}
