use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("expensetrack")
        .env("EXPENSETRACK_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("expensetrack")
        .env("EXPENSETRACK_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("currency_symbol ="));
    assert!(contents.contains("# base_url ="));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    fs::write(&config_path, "# existing config").unwrap();

    cargo_bin_cmd!("expensetrack")
        .env("EXPENSETRACK_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_set_api_url_updates_file() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("expensetrack")
        .env("EXPENSETRACK_HOME", dir.path())
        .args(["config", "set-api-url", "http://localhost:8000/api/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:8000/api"));

    let contents = fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(contents.contains(r#"base_url = "http://localhost:8000/api""#));
}

#[test]
fn test_config_set_api_url_rejects_garbage() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("expensetrack")
        .env("EXPENSETRACK_HOME", dir.path())
        .args(["config", "set-api-url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid API base URL"));
}
