//! Integration tests for CLI functionality

use assert_cmd::Command;
use predicates::prelude::*;

/// Get path to compiled binary
fn tfc_backup_bin() -> &'static std::path::Path {
    assert_cmd::cargo::cargo_bin!("tfc-backup")
}

/// Command with a clean credential and alerting environment
fn isolated(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(tfc_backup_bin());
    cmd.env("HOME", home)
        .env_remove("TFE_TOKEN")
        .env_remove("TFC_TOKEN")
        .env_remove("HCP_TOKEN")
        .env_remove("TFE_ORG")
        .env_remove("SENTRY_DSN");
    cmd
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Export HCP Terraform workspaces and variable sets",
        ))
        .stdout(predicate::str::contains("--workspace"))
        .stdout(predicate::str::contains("--all"));
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tfc-backup"));
}

#[test]
fn test_missing_target_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["--org", "acme"])
        .assert()
        .code(2);
}

#[test]
fn test_workspace_and_all_are_exclusive() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path())
        .args(["--org", "acme", "--all", "--workspace", "alpha"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_missing_org_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    isolated(home.path()).arg("--all").assert().code(2);
}

#[test]
fn test_missing_token_fails() {
    let home = tempfile::tempdir().unwrap();
    let dest = home.path().join("staging");
    isolated(home.path())
        .args(["--org", "acme", "--all", "--quiet", "--dest"])
        .arg(&dest)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No API token found"));
    assert!(!dest.exists());
}

#[test]
fn test_listing_failure_aborts_before_export() {
    let home = tempfile::tempdir().unwrap();
    let dest = home.path().join("staging");
    isolated(home.path())
        .args([
            "--org",
            "acme",
            "--all",
            "--quiet",
            "--token",
            "t",
            "--host",
            "127.0.0.1:9",
            "--listing-tool",
            "false",
            "--dest",
        ])
        .arg(&dest)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Workspace listing failed").count(1));
    assert!(!dest.exists());
}

/// Install an executable `sentry-cli` that appends its arguments to `log`
#[cfg(unix)]
fn fake_sentry_cli(bin_dir: &std::path::Path, log: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;

    let script = bin_dir.join("sentry-cli");
    std::fs::write(
        &script,
        format!("#!/bin/sh\necho \"$@\" >> '{}'\n", log.display()),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(unix)]
fn path_with(dir: &std::path::Path) -> String {
    format!(
        "{}:{}",
        dir.display(),
        std::env::var("PATH").unwrap_or_default()
    )
}

#[cfg(unix)]
#[test]
fn test_usage_error_is_alerted() {
    let home = tempfile::tempdir().unwrap();
    let log = home.path().join("alerts.log");
    fake_sentry_cli(home.path(), &log);

    isolated(home.path())
        .env("SENTRY_DSN", "https://key@sentry.example.com/1")
        .env("PATH", path_with(home.path()))
        .args(["--org", "acme"])
        .assert()
        .code(2);

    let logged = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = logged.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("send-event -m Invalid arguments:"));
}

#[cfg(unix)]
#[test]
fn test_help_is_not_alerted() {
    let home = tempfile::tempdir().unwrap();
    let log = home.path().join("alerts.log");
    fake_sentry_cli(home.path(), &log);

    isolated(home.path())
        .env("SENTRY_DSN", "https://key@sentry.example.com/1")
        .env("PATH", path_with(home.path()))
        .arg("--help")
        .assert()
        .success();

    assert!(!log.exists());
}

#[cfg(unix)]
#[test]
fn test_missing_token_is_alerted_once() {
    let home = tempfile::tempdir().unwrap();
    let log = home.path().join("alerts.log");
    fake_sentry_cli(home.path(), &log);

    isolated(home.path())
        .env("SENTRY_DSN", "https://key@sentry.example.com/1")
        .env("PATH", path_with(home.path()))
        .args(["--org", "acme", "--all", "--quiet"])
        .assert()
        .code(1);

    let logged = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<&str> = logged.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("send-event -m No API token found"));
}

#[cfg(unix)]
#[test]
fn test_second_interrupt_exits_immediately() {
    use std::time::{Duration, Instant};

    let home = tempfile::tempdir().unwrap();
    // `sh workspaces ...` reads this file as its script, so the listing
    // blocks long after the interrupts arrive
    std::fs::write(home.path().join("workspaces"), ": > ready\nexec sleep 20\n").unwrap();
    let ready = home.path().join("ready");

    let mut child = std::process::Command::new(tfc_backup_bin())
        .current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("SENTRY_DSN")
        .args([
            "--org",
            "acme",
            "--all",
            "--quiet",
            "--token",
            "t",
            "--host",
            "127.0.0.1:9",
            "--listing-tool",
            "sh",
            "--dest",
        ])
        .arg(home.path().join("staging"))
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while !ready.exists() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(ready.exists(), "listing tool never started");

    let interrupt = || {
        std::process::Command::new("kill")
            .args(["-INT", &child.id().to_string()])
            .status()
            .unwrap()
    };
    assert!(interrupt().success());
    std::thread::sleep(Duration::from_millis(500));
    assert!(interrupt().success());

    let started = Instant::now();
    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(130));
    assert!(started.elapsed() < Duration::from_secs(10));
}
