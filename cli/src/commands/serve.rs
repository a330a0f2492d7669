// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Serve an echo endpoint behind the decision filter
//!
//! Every path answers with the request exactly as it reached the upstream,
//! so header, query and body rewrites can be inspected with plain curl.

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, Uri};
use axum::routing::{any, get};
use axum::{Json, Router};
use clap::Args;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tracing::{info, warn};

use gatekeeper_core::presentation::{decision_middleware, DecisionFilter};

use super::{load_manifest, manifest_path};

#[derive(Args)]
pub struct ServeArgs {
    /// Listen host
    #[arg(long, env = "GATEKEEPER_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Listen port
    #[arg(long, env = "GATEKEEPER_PORT", default_value = "8080")]
    port: u16,

    /// Largest request body buffered for inspection, in bytes
    #[arg(long)]
    body_limit: Option<usize>,

    /// Expose decision counters at /metrics
    #[arg(long)]
    metrics: bool,

    /// Manifest path (default: --config)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

pub async fn handle_command(args: ServeArgs, config_override: Option<PathBuf>) -> Result<()> {
    let path = manifest_path(args.file.clone(), config_override)?;
    let manifest = load_manifest(&path)?;

    let mut filter = DecisionFilter::from_manifest(&manifest)?;
    if let Some(limit) = args.body_limit {
        filter = filter.with_body_limit(limit);
    }

    let mut app = filtered_router(filter);
    if args.metrics {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        app = app.merge(metrics_router(handle));
    }

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(filter = %manifest.metadata.name, "Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

fn filtered_router(filter: DecisionFilter) -> Router {
    Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo))
        .layer(axum::middleware::from_fn_with_state(filter, decision_middleware))
}

fn metrics_router(handle: PrometheusHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let handle = handle.clone();
            async move { handle.render() }
        }),
    )
}

/// Reflect the request back to the caller.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let mut header_map = Map::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match header_map.get_mut(name.as_str()) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            _ => {
                header_map.insert(name.to_string(), json!([value]));
            }
        }
    }

    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };

    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "headers": header_map,
        "body": body,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
