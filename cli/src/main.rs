// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Gatekeeper CLI
//!
//! The `gatekeeper` binary drives a decision filter from a manifest.
//!
//! ## Commands
//!
//! - `gatekeeper config validate|show` - Manifest checks
//! - `gatekeeper check` - Run one request through the filter and print the result
//! - `gatekeeper serve` - Put the filter in front of an echo endpoint

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;

use commands::{CheckArgs, ConfigCommand, ServeArgs};

/// Gatekeeper - request-time decision filter
#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the filter manifest
    #[arg(
        short,
        long,
        global = true,
        env = "GATEKEEPER_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "GATEKEEPER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manifest management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Run a single request through the filter
    #[command(name = "check")]
    Check(CheckArgs),

    /// Serve an echo endpoint behind the filter
    #[command(name = "serve")]
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Config { command }) => commands::config::handle_command(command, cli.config).await,
        Some(Commands::Check(args)) => commands::check::handle_command(args, cli.config).await,
        Some(Commands::Serve(args)) => commands::serve::handle_command(args, cli.config).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
