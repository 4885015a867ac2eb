//! Command handler modules for modr-cli.
//!
//! Shared utilities used by multiple commands live here.
//! Command-specific logic lives in the submodules.

pub mod evaluate;
pub mod settle;

use anyhow::{Context, Result};
use modr_config::{ContentTypeConfig, LoadedConfig};
use modr_types::ContentClass;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Built-in defaults when no paths are given, otherwise the layered merge.
pub fn load_config(paths: &[String]) -> Result<LoadedConfig> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = modr_config::load_layered_yaml(&path_refs)?;
    tracing::info!(config_hash = %loaded.config_hash, layers = paths.len(), "config loaded");
    Ok(loaded)
}

/// Read and parse a JSON input file.  A UTF-8 BOM is tolerated.
pub fn read_json_file<T: DeserializeOwned>(path: &str) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read input failed: {path}"))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    serde_json::from_slice(bytes).with_context(|| format!("input is not valid JSON: {path}"))
}

pub fn class_config(loaded: &LoadedConfig, class: ContentClass) -> Result<&ContentTypeConfig> {
    Ok(loaded.config.content_types.get(class)?)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize output failed")?;
    println!("{s}");
    Ok(())
}
