// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! One-shot decision check
//!
//! Builds a request from the command line, runs it through the configured
//! filter against the live decision service, and prints the outcome together
//! with the request as the upstream would receive it.

use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue, Method, Request};
use bytes::Bytes;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use gatekeeper_core::domain::decision::Outcome;
use gatekeeper_core::presentation::DecisionFilter;

use super::{load_manifest, manifest_path};

#[derive(Args)]
pub struct CheckArgs {
    /// HTTP method of the simulated request
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Path and query of the simulated request
    #[arg(long, default_value = "/")]
    url: String,

    /// Request header, `Name: value`; repeatable
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Request body
    #[arg(short, long)]
    body: Option<String>,

    /// Manifest path (default: --config)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

pub async fn handle_command(args: CheckArgs, config_override: Option<PathBuf>) -> Result<()> {
    let path = manifest_path(args.file.clone(), config_override)?;
    let manifest = load_manifest(&path)?;
    let filter = DecisionFilter::from_manifest(&manifest)?;

    let mut request = build_request(&args)?;

    match filter.process(&mut request).await {
        Ok(Outcome::Allowed(result)) => {
            println!("{} {}", "✓ Allowed".green().bold(), result);
            println!();
            print_request(&request);
            Ok(())
        }
        Ok(Outcome::Denied) => {
            println!("{}", "✗ Denied".red().bold());
            std::process::exit(1);
        }
        Err(e) => Err(e).context("Decision failed"),
    }
}

fn build_request(args: &CheckArgs) -> Result<Request<Bytes>> {
    let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid method '{}'", args.method))?;

    let mut builder = Request::builder().method(method).uri(args.url.as_str());
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        builder = builder.header(name, value);
    }

    let body = args.body.clone().map(Bytes::from).unwrap_or_default();
    builder
        .body(body)
        .with_context(|| format!("Invalid request for url '{}'", args.url))
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Header '{}' must look like 'Name: value'", raw))?;

    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .with_context(|| format!("Invalid header name in '{}'", raw))?;
    let value = HeaderValue::from_str(value.trim())
        .with_context(|| format!("Invalid header value in '{}'", raw))?;
    Ok((name, value))
}

fn print_request(request: &Request<Bytes>) {
    println!("{}", "Forwarded request:".bold());
    println!("  {} {}", request.method(), request.uri());
    for (name, value) in request.headers() {
        println!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
    }
    if !request.body().is_empty() {
        println!();
        println!("  {}", String::from_utf8_lossy(request.body()));
    }
}
