//! Integration tests for the `onlyconfig` binary.
//!
//! These run the CLI as a subprocess against an address nothing listens on,
//! so every test passes without a backend: the guard must stop protected
//! commands before any request is sent.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::process::Command;

/// Helper: locate the `onlyconfig` binary built by `cargo test`.
fn onlyconfig_bin() -> String {
    let path = env!("CARGO_BIN_EXE_onlyconfig");
    assert!(
        Path::new(path).exists(),
        "onlyconfig binary not found at {path}"
    );
    path.to_owned()
}

/// Helper: run onlyconfig with an isolated session directory and return
/// (`exit_code`, stdout, stderr).
fn run(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(onlyconfig_bin())
        .args(args)
        .env("ONLYCONFIG_ADDR", "http://127.0.0.1:19999")
        .env("ONLYCONFIG_HOME", home)
        .env_remove("ONLYCONFIG_PASSWORD")
        .env_remove("ONLYCONFIG_LOG")
        .output()
        .expect("failed to execute onlyconfig");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn write_session(home: &Path, body: &str) {
    fs::write(home.join("onlyconfig.user"), body).unwrap();
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(home.path(), &["--version"]);
    assert_eq!(code, 0, "onlyconfig --version should exit 0");
    assert!(stdout.contains("onlyconfig"), "version output: {stdout}");
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(home.path(), &["--help"]);
    assert_eq!(code, 0, "onlyconfig --help should exit 0");
    for command in ["login", "logout", "apps", "env-dc", "org", "ns", "config"] {
        assert!(stdout.contains(command), "help should list '{command}': {stdout}");
    }
}

#[test]
fn test_subcommand_help() {
    let home = tempfile::tempdir().unwrap();
    for sub in ["apps", "env-dc", "org", "ns", "config"] {
        let (code, stdout, _) = run(home.path(), &[sub, "--help"]);
        assert_eq!(code, 0, "{sub} --help should exit 0");
        assert!(!stdout.is_empty(), "{sub} --help should produce output");
    }
}

// ── Guard ────────────────────────────────────────────────────────────

#[test]
fn test_protected_command_without_session_fails() {
    let home = tempfile::tempdir().unwrap();
    for args in [
        &["apps", "list"][..],
        &["env-dc", "list"][..],
        &["org", "list"][..],
        &["config", "get", "1"][..],
    ] {
        let (code, _, stderr) = run(home.path(), args);
        assert_ne!(code, 0, "{args:?} should fail without a session");
        assert!(
            stderr.contains("not logged in"),
            "{args:?} should point at login: {stderr}"
        );
    }
}

#[test]
fn test_logged_out_record_is_not_a_session() {
    let home = tempfile::tempdir().unwrap();
    write_session(home.path(), r#"{"is_login":false,"token":"abc"}"#);
    let (code, _, stderr) = run(home.path(), &["apps", "list"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not logged in"), "{stderr}");
}

#[test]
fn test_malformed_record_is_not_a_session() {
    let home = tempfile::tempdir().unwrap();
    write_session(home.path(), "{not json");
    let (code, _, stderr) = run(home.path(), &["org", "list"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not logged in"), "{stderr}");
}

#[test]
fn test_open_protected_route_redirects_to_login() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(home.path(), &["open", "/env_and_dc"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("/login"), "should land on /login: {stdout}");
}

#[test]
fn test_open_unknown_route() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(home.path(), &["open", "/nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("not found"), "{stderr}");
}

// ── Session commands ─────────────────────────────────────────────────

#[test]
fn test_logout_clears_session_and_is_idempotent() {
    let home = tempfile::tempdir().unwrap();
    write_session(home.path(), r#"{"is_login":true,"token":"abc"}"#);

    let (code, stdout, _) = run(home.path(), &["logout"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Logged out"), "{stdout}");
    assert!(!home.path().join("onlyconfig.user").exists());

    let (code, _, _) = run(home.path(), &["logout"]);
    assert_eq!(code, 0, "second logout should also succeed");
}

#[test]
fn test_status_reports_session() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run(home.path(), &["status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("http://127.0.0.1:19999"), "{stdout}");

    write_session(home.path(), r#"{"is_login":true,"token":"abc"}"#);
    let (code, stdout, _) = run(home.path(), &["status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("yes"), "{stdout}");
}

#[test]
fn test_register_mismatch_sends_nothing() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(
        home.path(),
        &[
            "register",
            "alice",
            "--password",
            "one",
            "--confirm-password",
            "two",
        ],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("password mismatch"), "{stderr}");
}

#[test]
fn test_login_unreachable_backend_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(home.path(), &["login", "alice", "--password", "pw"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("login error"), "{stderr}");
    assert!(!home.path().join("onlyconfig.user").exists());
}
