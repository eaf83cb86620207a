//! Tests for the `vault` binary

use pretty_assertions::assert_eq;
use std::path::Path;
use std::process::{Command, Output};

fn vault(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vault"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn json(output: &Output) -> serde_json::Value {
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.display().to_string()
}

const SMALL_CATALOG: &str = r#"
version = "test"

[[categories]]
id = "0_Overview"
name = "Overview"

[[categories.artifacts]]
id = "pitch_deck"
name = "Pitch Deck"
allowed_formats = ["pdf"]
max_size_bytes = 1024
applicable_stages = ["Seed"]
priority = "critical"

[[categories.artifacts]]
id = "one_pager"
name = "One-Pager"
allowed_formats = ["pdf"]
max_size_bytes = 1024
applicable_stages = ["Seed", "Series A"]
priority = "high"
"#;

#[test]
fn catalog_json_is_stage_filtered() {
    let output = vault(&["catalog", "--stage", "Seed", "--json"]);
    let value = json(&output);
    assert_eq!(value["stage"], "Seed");
    let overview = value["categories"]["0_Overview"].as_array().unwrap();
    assert!(overview.iter().any(|a| a["id"] == "pitch_deck"));
}

#[test]
fn unknown_stage_lists_every_category() {
    let output = vault(&["catalog", "--stage", "Series Z", "--json"]);
    let value = json(&output);
    assert!(value["stage"].is_null());
    assert_eq!(value["categories"].as_object().unwrap().len(), 8);
}

#[test]
fn remaining_skips_uploaded_and_sorts_by_priority() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write(dir.path(), "catalog.toml", SMALL_CATALOG);
    let config = write(dir.path(), "vault.toml", &format!("catalog_path = {catalog:?}\ndefault_stage = \"Seed\"\n"));

    let all = json(&vault(&["--config", &config, "remaining", "--category", "0_Overview", "--json"]));
    let ids: Vec<&str> = all["remaining"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["pitch_deck", "one_pager"]);
    assert_eq!(all["complete"], false);

    let done = json(&vault(&[
        "--config",
        &config,
        "remaining",
        "--category",
        "0_Overview",
        "--uploaded",
        "pitch_deck,one_pager",
        "--json",
    ]));
    assert_eq!(done["remaining"].as_array().unwrap().len(), 0);
    assert_eq!(done["complete"], true);
}

#[test]
fn validate_accepts_and_rejects_files() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = write(dir.path(), "catalog.toml", SMALL_CATALOG);
    let config = write(dir.path(), "vault.toml", &format!("catalog_path = {catalog:?}\n"));
    let deck = write(dir.path(), "deck.pdf", "%PDF-1.7");
    let big = write(dir.path(), "big.pdf", &"x".repeat(2048));
    let binary = write(dir.path(), "setup.exe", "MZ");

    let ok = vault(&["--config", &config, "validate", "--category", "0_Overview", "--artifact", "pitch_deck", &deck]);
    assert!(ok.status.success());
    assert!(stdout(&ok).contains("matches pitch_deck"));

    let too_big = vault(&["--config", &config, "validate", "--category", "0_Overview", "--artifact", "pitch_deck", &big]);
    assert_eq!(too_big.status.code(), Some(1));
    assert!(stdout(&too_big).contains("invalid: File size exceeds"));

    let wrong_type = vault(&["--config", &config, "validate", "--category", "0_Overview", &binary]);
    assert_eq!(wrong_type.status.code(), Some(1));
    assert!(stdout(&wrong_type).contains("File type .exe is not allowed"));
}

#[test]
fn bad_input_fails() {
    assert!(!vault(&["remaining", "--category", "9_Nope"]).status.success());

    let dir = tempfile::tempdir().unwrap();
    let config = write(dir.path(), "vault.toml", "notice_buffer = 0\n");
    assert!(!vault(&["--config", &config, "catalog"]).status.success());
}
