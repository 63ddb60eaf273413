// ABOUTME: Integration tests for the berth CLI commands.
// ABOUTME: Validates --help output, init behavior, and input validation.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn berth_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("berth"))
}

#[test]
fn help_shows_commands() {
    berth_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ps"))
        .stdout(predicate::str::contains("images"))
        .stdout(predicate::str::contains("compose"))
        .stdout(predicate::str::contains("--source"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("berth.yml");

    berth_cmd()
        .current_dir(temp_dir.path())
        .args(["--source", "wsl2", "--profile", "Debian", "init"])
        .assert()
        .success();

    assert!(config_path.exists(), "berth.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("source: bridged"));
    assert!(content.contains("profile: Debian"));

    let config = berth::config::Config::load(&config_path).unwrap();
    assert_eq!(config.bridge.profile, "Debian");
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("berth.yml");

    fs::write(&config_path, "source: local").unwrap();

    berth_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn unknown_source_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();

    berth_cmd()
        .current_dir(temp_dir.path())
        .env_remove("BERTH_SOURCE")
        .args(["--source", "mainframe", "ps"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown source"));
}

#[test]
fn invalid_config_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("berth.yml"), "enrichment_concurrency: 0\n").unwrap();

    berth_cmd()
        .current_dir(temp_dir.path())
        .arg("info")
        .assert()
        .failure()
        .stderr(predicate::str::contains("enrichment_concurrency"));
}
