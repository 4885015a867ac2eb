//! `modr config-hash` prints a stable hash and the canonical JSON.
//!
//! GREEN when:
//! - no paths hashes the built-in defaults, identical across runs;
//! - the repo's base layer (a restatement of the defaults) hashes the same;
//! - an overriding layer changes the hash and shows up in the JSON;
//! - a broken layer fails with the offending field named on stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn repo_config(rel: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join(rel)
        .to_string_lossy()
        .to_string()
}

fn hash_line(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .lines()
        .find_map(|l| l.strip_prefix("config_hash=").map(str::to_string))
        .expect("config_hash line")
}

#[test]
fn defaults_hash_is_stable() -> anyhow::Result<()> {
    let a = Command::cargo_bin("modr-cli")?.arg("config-hash").output()?;
    let b = Command::cargo_bin("modr-cli")?.arg("config-hash").output()?;
    assert!(a.status.success());
    let h = hash_line(&a.stdout);
    assert_eq!(h.len(), 64);
    assert_eq!(h, hash_line(&b.stdout));

    let base = Command::cargo_bin("modr-cli")?
        .args(["config-hash", &repo_config("engine.yaml")])
        .output()?;
    assert_eq!(hash_line(&base.stdout), h);
    Ok(())
}

#[test]
fn override_layer_changes_hash() -> anyhow::Result<()> {
    let defaults = Command::cargo_bin("modr-cli")?.arg("config-hash").output()?;
    let layered = Command::cargo_bin("modr-cli")?
        .args([
            "config-hash",
            &repo_config("engine.yaml"),
            &repo_config("overrides/strict_quorum.yaml"),
        ])
        .output()?;
    assert!(layered.status.success());
    assert_ne!(hash_line(&defaults.stdout), hash_line(&layered.stdout));

    let stdout = String::from_utf8_lossy(&layered.stdout);
    assert!(stdout.contains(r#""min_voters":40"#), "{stdout}");
    assert!(stdout.contains(r#""extend_by_hours":48"#), "{stdout}");
    Ok(())
}

#[test]
fn broken_layer_fails() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let bad = dir.path().join("bad.yaml");
    std::fs::write(
        &bad,
        "content_types:\n  initial_standard:\n    platform_share: \"0.5\"\n",
    )?;

    Command::cargo_bin("modr-cli")?
        .args(["config-hash", &bad.to_string_lossy()])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "initial_standard.reward_pool_share+platform_share",
        ));
    Ok(())
}
