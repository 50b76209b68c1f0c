//! CLI integration tests

use std::path::Path;
use std::process::Command;

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;

fn voice_memos_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_voice-memos"))
}

/// Binary with config, data and credentials isolated under `home`
fn isolated(home: &Path) -> AssertCommand {
    let mut cmd = AssertCommand::new(env!("CARGO_BIN_EXE_voice-memos"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("VOICE_MEMOS_API_KEY")
        .env_remove("VOICE_MEMOS_PROJECT_ID")
        .env_remove("VOICE_MEMOS_PASSWORD");
    cmd
}

#[test]
fn help_output() {
    let output = voice_memos_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Firestore"));
    assert!(stdout.contains("--quality"));
    assert!(stdout.contains("--store"));
    assert!(stdout.contains("login"));
    assert!(stdout.contains("register"));
    assert!(stdout.contains("config"));
}

#[test]
fn version_output() {
    let output = voice_memos_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("voice-memos"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_help() {
    let output = voice_memos_bin()
        .args(["config", "--help"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("init"));
    assert!(stdout.contains("set"));
    assert!(stdout.contains("get"));
    assert!(stdout.contains("list"));
    assert!(stdout.contains("path"));
}

#[test]
fn config_path_command() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("voice-memos"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn invalid_quality_is_usage_error() {
    let output = voice_memos_bin()
        .args(["--quality", "ultra"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid value"),
        "Expected error about invalid quality, got: {}",
        stderr
    );
}

#[test]
fn config_set_then_get() {
    let home = tempfile::tempdir().unwrap();

    isolated(home.path())
        .args(["config", "set", "quality", "LOW"])
        .assert()
        .success()
        .stderr(predicate::str::contains("quality = low"));

    isolated(home.path())
        .args(["config", "get", "quality"])
        .assert()
        .success()
        .stdout(predicate::str::diff("low\n"));
}

#[test]
fn config_unset_removes_value() {
    let home = tempfile::tempdir().unwrap();

    isolated(home.path())
        .args(["config", "set", "collection", "memos"])
        .assert()
        .success();

    isolated(home.path())
        .args(["config", "unset", "collection"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed collection"));

    isolated(home.path())
        .args(["config", "get", "collection"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn config_set_invalid_store_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["config", "set", "store", "s3"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid store"));
}

#[test]
fn config_get_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["config", "get", "duration"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn config_list_masks_api_key() {
    let home = tempfile::tempdir().unwrap();

    isolated(home.path())
        .args(["config", "set", "api_key", "AIzaSyExampleKey1234"])
        .assert()
        .success();

    isolated(home.path())
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AIza...1234"))
        .stdout(predicate::str::contains("AIzaSyExampleKey1234").not());
}

#[test]
fn config_init_twice_fails() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path()).args(["config", "init"]).assert().success();
    isolated(home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn whoami_when_signed_out() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .arg("whoami")
        .assert()
        .success()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn login_without_api_key() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["login", "--email", "ada@example.com", "--password", "secret1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("api_key"));
}

#[test]
fn login_rejects_malformed_email_before_any_request() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .env("VOICE_MEMOS_API_KEY", "test-key")
        .args(["login", "--email", "not-an-email", "--password", "secret1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid email"));
}

#[test]
fn register_rejects_short_password() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .env("VOICE_MEMOS_API_KEY", "test-key")
        .env("VOICE_MEMOS_PASSWORD", "123")
        .args(["register", "--email", "ada@example.com"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("at least 6"));
}

#[test]
fn session_needs_firestore_settings() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .arg("session")
        .write_stdin("q\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required setting"));
}

#[test]
fn memory_session_quits_cleanly() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["--store", "memory"])
        .write_stdin("l\nh\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recordings yet"))
        .stdout(predicate::str::contains("Start Recording"))
        .stderr(predicate::str::contains("Session ended"));
}

#[test]
fn memory_session_reports_bad_commands() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["session", "--store", "memory"])
        .write_stdin("dance\np 3\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown command"))
        .stderr(predicate::str::contains("no recording #3"));
}

#[test]
fn memory_session_redraws_only_on_change_or_list() {
    let home = tempfile::tempdir().unwrap();
    let output = isolated(home.path())
        .args(["session", "--store", "memory"])
        .write_stdin("p 1
h
l
q
")
        .output()
        .unwrap();

    assert!(output.status.success());
    // The opening view plus one for 'l'; the failed play and help leave it as is
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Start Recording").count(), 2);
}

// Recording needs a microphone; the record path is covered by the
// session use case tests with mock ports
