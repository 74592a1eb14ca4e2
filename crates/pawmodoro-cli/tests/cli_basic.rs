//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pawmodoro"))
        .args(args)
        .env("PAWMODORO_HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

#[test]
fn test_config_set_persists() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(home.path(), &["config", "get", "timer.default_cycles"]).trim(), "4");

    run_ok(home.path(), &["config", "set", "timer.default_cycles", "6"]);
    assert_eq!(run_ok(home.path(), &["config", "get", "timer.default_cycles"]).trim(), "6");

    let list: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["config", "list"])).unwrap();
    assert_eq!(list["timer"]["default_cycles"], 6);

    run_ok(home.path(), &["config", "reset"]);
    assert_eq!(run_ok(home.path(), &["config", "get", "timer.default_cycles"]).trim(), "4");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));

    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.default_cycles", "many"]);
    assert_eq!(code, 1);
}

#[test]
fn test_collection_starts_with_starter() {
    let home = tempfile::tempdir().unwrap();
    let list: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["collection", "list"])).unwrap();
    let entries = list.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], "focus-buddy");
    assert_eq!(entries[0]["isCompanion"], true);

    let catalog: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["collection", "catalog"])).unwrap();
    assert_eq!(catalog.as_array().unwrap().len(), 7);
}

#[test]
fn test_companion_requires_unlock() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["collection", "companion", "doraemon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not unlocked"));

    run_ok(home.path(), &["collection", "companion", "focus-buddy"]);
}

#[test]
fn test_timer_preview_uses_config() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["config", "set", "timer.default_work_minutes", "50"]);
    let snapshot: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["timer", "preview"])).unwrap();
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert_eq!(snapshot["phase"], "idle");
    assert_eq!(snapshot["remaining"], "50:00");
    assert_eq!(snapshot["break_minutes"], 5);
}

#[test]
fn test_timer_run_records_session() {
    let home = tempfile::tempdir().unwrap();
    run_ok(home.path(), &["config", "set", "timer.short_break_length", "0"]);

    let stdout = run_ok(
        home.path(),
        &["timer", "run", "--cycles", "2", "--work", "0", "--tick-ms", "1"],
    );
    let first: serde_json::Value =
        serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(first["type"], "TimerStarted");
    assert_eq!(first["total_cycles"], 2);
    assert!(stdout.contains("\"type\":\"RunCompleted\""));
    assert!(stdout.contains("\"focus_minutes\": 0"));

    let sessions: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["stats", "export"])).unwrap();
    let sessions = sessions.as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["cycles"], 2);
}

#[test]
fn test_stats_summary_and_reset() {
    let home = tempfile::tempdir().unwrap();
    let summary: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["stats", "summary", "--days", "3"])).unwrap();
    assert_eq!(summary["days"].as_array().unwrap().len(), 3);
    assert_eq!(summary["total_hours"], 0.0);
    // This invocation itself counts as an app open.
    assert_eq!(summary["active_days_this_month"], 1);

    run_ok(home.path(), &["stats", "reset"]);
    let sessions: serde_json::Value =
        serde_json::from_str(&run_ok(home.path(), &["stats", "export"])).unwrap();
    assert!(sessions.as_array().unwrap().is_empty());
}
