// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Gatekeeper CLI

pub mod check;
pub mod config;
pub mod serve;

pub use self::check::CheckArgs;
pub use self::config::ConfigCommand;
pub use self::serve::ServeArgs;

use anyhow::{Context, Result};
use gatekeeper_core::domain::filter_config::FilterConfigManifest;
use std::path::{Path, PathBuf};

/// Resolve the manifest path from the command argument or the global `--config`.
pub(crate) fn manifest_path(arg: Option<PathBuf>, global: Option<PathBuf>) -> Result<PathBuf> {
    arg.or(global)
        .context("No manifest given. Pass --config <FILE> or set GATEKEEPER_CONFIG_PATH")
}

/// Load a manifest, apply environment overrides and validate it.
pub(crate) fn load_manifest(path: &Path) -> Result<FilterConfigManifest> {
    let mut manifest = FilterConfigManifest::from_yaml_file(path)?;
    manifest.apply_env_overrides();
    manifest
        .validate()
        .with_context(|| format!("Manifest {:?} is invalid", path))?;
    Ok(manifest)
}
