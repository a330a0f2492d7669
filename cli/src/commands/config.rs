// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Manifest management commands
//!
//! Commands: validate, show

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use gatekeeper_core::domain::decision::DecisionMode;
use gatekeeper_core::domain::filter_config::FilterConfigManifest;
use gatekeeper_core::domain::rules::{FieldSource, InjectionSource};

use super::{load_manifest, manifest_path};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Validate a filter manifest
    Validate {
        /// Path to the manifest (default: --config)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Print the effective manifest after environment overrides
    Show {
        /// Path to the manifest (default: --config)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// List every extraction and injection rule
        #[arg(long)]
        rules: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Validate { file } => validate(manifest_path(file, config_override)?).await,
        ConfigCommand::Show { file, rules } => show(manifest_path(file, config_override)?, rules).await,
    }
}

async fn validate(path: PathBuf) -> Result<()> {
    println!("Validating {}...", path.display());

    let manifest = load_manifest(&path)?;

    println!("{}", "✓ Manifest is valid".green());
    println!();
    print_summary(&manifest)?;

    Ok(())
}

async fn show(path: PathBuf, with_rules: bool) -> Result<()> {
    let manifest = load_manifest(&path)?;

    println!("{}", "Effective manifest:".bold());
    println!();
    print!("{}", manifest.to_yaml_string()?);
    println!();

    print_summary(&manifest)?;

    if with_rules {
        println!();
        print_rules(&manifest)?;
    }

    Ok(())
}

fn print_summary(manifest: &FilterConfigManifest) -> Result<()> {
    println!("{}", format!("Filter: {}", manifest.metadata.name).bold());
    match manifest.decision_mode() {
        Some(DecisionMode::Policy { package, directive }) => {
            println!("  Mode: policy ({} → {})", package, directive);
        }
        Some(DecisionMode::KeyValidation { response_path }) => {
            println!("  Mode: key validation (identity at '{}')", response_path);
        }
        None => println!("  Mode: {}", "claims only".dimmed()),
    }
    if let (Some(service), Some(base_path)) = (&manifest.spec.service, manifest.base_path()) {
        println!("  Service: {}{}", service.address, base_path);
        println!("  Timeout: {:?}", service.timeout);
        println!("  Cache: {}", manifest.cache_mode());
    }
    println!("  Extraction rules: {}", manifest.extraction_rules()?.len());
    println!("  Injection rules: {}", manifest.injection_rules()?.len());
    println!("  Claim mappings: {}", manifest.claim_mappings()?.len());

    Ok(())
}

fn print_rules(manifest: &FilterConfigManifest) -> Result<()> {
    println!("{}", "Extract:".bold());
    for rule in manifest.extraction_rules()?.iter() {
        let source = match &rule.source {
            FieldSource::Constant(value) => format!("\"{}\" (constant)", value),
            FieldSource::Path(path) => path.to_string(),
        };
        let required = if rule.required { " (required)".yellow().to_string() } else { String::new() };
        println!("  {} ← {}{}", rule.field, source, required);
    }

    println!("{}", "Inject:".bold());
    for rule in manifest.injection_rules()?.iter() {
        let source = match &rule.source {
            InjectionSource::Decision => "decision".to_string(),
            InjectionSource::Field(name) => format!("response field '{}'", name),
            InjectionSource::Literal(value) => format!("\"{}\"", value),
        };
        println!("  {} ← {}", rule.target, source);
    }

    let claims = manifest.claim_mappings()?;
    if !claims.is_empty() {
        println!("{}", "Claims:".bold());
        for (target, claim) in claims {
            println!("  {} ← {}", target, claim);
        }
    }

    Ok(())
}
