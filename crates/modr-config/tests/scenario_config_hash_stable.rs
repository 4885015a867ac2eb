//! Config hash stability
//!
//! GREEN when:
//! - Loading the same layers twice yields the same hash.
//! - Reordering keys or writing a share as `0.2` vs `"0.20"` does not change
//!   the hash (the typed config is what gets hashed).
//! - A changed value changes the hash.
//! - Later layers override earlier ones.

use modr_config::{
    defaults, load_layered_yaml, load_layered_yaml_from_strings, AutoResolvePolicy,
};
use modr_types::{Atto, ContentClass};

const BASE_YAML: &str = r#"
params:
  min_voters: 22
  threshold_ratio: 2
content_types:
  initial_standard:
    platform_share: 0.2
    reward_pool_share: 0.8
"#;

const BASE_YAML_REORDERED: &str = r#"
content_types:
  initial_standard:
    reward_pool_share: "0.80"
    platform_share: "0.20"
params:
  threshold_ratio: 2
  min_voters: 22
"#;

const OVERLAY_YAML: &str = r#"
params:
  min_voters: 30
  auto_resolve_policy: {extend_by_hours: 24}
content_types:
  completion_paid:
    minority_factor: 0.5
"#;

#[test]
fn same_input_produces_identical_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn key_order_and_number_style_do_not_change_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
}

#[test]
fn restating_defaults_matches_builtin_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let d = defaults().unwrap();
    assert_eq!(a.config_hash, d.config_hash, "BASE_YAML only restates defaults");
}

#[test]
fn overlay_changes_hash_and_values() {
    let base = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let merged = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_ne!(base.config_hash, merged.config_hash);

    let cfg = &merged.config;
    assert_eq!(cfg.params.min_voters, 30);
    assert_eq!(cfg.params.threshold_ratio, 2, "untouched leaf keeps base value");
    assert_eq!(
        cfg.params.auto_resolve_policy,
        AutoResolvePolicy::ExtendByHours(24)
    );
    let paid = cfg.content_types.get(ContentClass::CompletionPaid).unwrap();
    assert_eq!(paid.minority_factor, "0.5".parse::<Atto>().unwrap());
    assert_eq!(paid.base_xp, 60, "other fields of the class keep defaults");
}

#[test]
fn files_load_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let overlay = dir.path().join("overlay.yaml");
    std::fs::write(&base, BASE_YAML).unwrap();
    std::fs::write(&overlay, OVERLAY_YAML).unwrap();

    let b = base.to_string_lossy().to_string();
    let o = overlay.to_string_lossy().to_string();
    let from_files = load_layered_yaml(&[b.as_str(), o.as_str()]).unwrap();
    let from_strings = load_layered_yaml_from_strings(&[BASE_YAML, OVERLAY_YAML]).unwrap();
    assert_eq!(from_files.config_hash, from_strings.config_hash);
}

#[test]
fn missing_file_reports_path() {
    let err = load_layered_yaml(&["/definitely/not/here.yaml"]).unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here.yaml"));
}
