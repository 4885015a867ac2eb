//! modr-config
//!
//! Engine configuration: evaluator parameters plus the per-class pricing
//! table, loaded as layered YAML on top of built-in defaults.
//!
//! - Earlier documents are base, later documents override (deep merge).
//! - Unknown keys are refused (`deny_unknown_fields`), so a typo cannot
//!   silently fall back to a default.
//! - Every share group is validated before the config is handed out.
//! - The canonical JSON of the *typed* config is hashed, so the same values
//!   written in a different key order or number style hash identically.  The
//!   hash is what a caller compares to notice a hot-reload.
//!
//! The engine never reads configuration itself; callers pass the values in.

mod content;
mod params;

pub use content::{ContentTypeConfig, ContentTypeTable};
pub use params::{AutoResolvePolicy, ConfigParams};

use anyhow::{Context, Result};
use modr_types::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

/// Everything the engine is parameterized by.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub params: ConfigParams,
    pub content_types: ContentTypeTable,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.params.validate()?;
        self.content_types.validate()
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config: EngineConfig,
}

/// Load YAML files in merge order over the built-in defaults.
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged =
        serde_json::to_value(EngineConfig::default()).context("defaults->json failed")?;
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        // An empty document parses as null; treat it as "no overrides".
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let config: EngineConfig =
        serde_json::from_value(merged).context("config does not match engine schema")?;
    config.validate()?;

    let canonical_json = canonicalize(&config)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    tracing::debug!(
        layers = yaml_docs.len(),
        config_hash = %config_hash,
        "engine config loaded"
    );

    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config,
    })
}

/// Built-in defaults, hashed the same way as a loaded config.
pub fn defaults() -> Result<LoadedConfig> {
    load_layered_yaml_from_strings(&[])
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize(config: &EngineConfig) -> Result<String> {
    // Round-trip through Value: serde_json's default map is ordered by key,
    // and amounts serialize as exact decimal strings.
    let v = serde_json::to_value(config).context("canonical json serialize failed")?;
    serde_json::to_string(&v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
